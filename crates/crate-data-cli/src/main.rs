use anyhow::Result;
use clap::Parser;
use tracing::info;

use crate_data_cli::{backends, cli::Cli, logging};
use crate_data_config::ConfigLoader;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    logging::init(cli.level_filter(), &config.logging)?;
    info!(version = env!("CARGO_PKG_VERSION"), "Starting crate-data");

    let backends = backends::build(&config)?;
    crate_data_web::start_server(&config.server, &backends).await?;
    Ok(())
}
