//! Configuration components

mod backends;
mod logging;
mod server;

pub use backends::{default_max_connections, ClientServerConfig, SqliteBackendConfig};
pub use logging::{LogFormat, LoggingConfig};
pub use server::ServerConfig;
