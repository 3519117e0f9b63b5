//! Subscriber setup

use crate_data_config::{LogFormat, LoggingConfig};
use tracing_subscriber::filter::{LevelFilter, ParseError};
use tracing_subscriber::EnvFilter;

/// Filter from the command line level, else the configured directive, else `RUST_LOG`
pub fn env_filter(
    cli_level: Option<LevelFilter>,
    configured: Option<&str>,
) -> Result<EnvFilter, ParseError> {
    if let Some(level) = cli_level {
        return Ok(EnvFilter::new(level.to_string()));
    }
    if let Some(directive) = configured.filter(|d| !d.trim().is_empty()) {
        return EnvFilter::try_new(directive);
    }
    Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
}

pub fn init(cli_level: Option<LevelFilter>, config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = env_filter(cli_level, config.level.as_deref())?;
    match config.format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_cli_level_wins() {
        std::env::set_var("RUST_LOG", "error");
        let filter = env_filter(Some(LevelFilter::TRACE), Some("warn")).unwrap();
        std::env::remove_var("RUST_LOG");
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    #[serial]
    fn test_configured_directive_beats_rust_log() {
        std::env::set_var("RUST_LOG", "error");
        let filter = env_filter(None, Some("crate_data_web=debug,warn")).unwrap();
        std::env::remove_var("RUST_LOG");
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    #[serial]
    fn test_rust_log_applies_with_default_config() {
        std::env::set_var("RUST_LOG", "warn");
        let config = LoggingConfig::default();
        let filter = env_filter(None, config.level.as_deref()).unwrap();
        std::env::remove_var("RUST_LOG");
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    #[serial]
    fn test_info_without_any_level() {
        std::env::remove_var("RUST_LOG");
        let filter = env_filter(None, None).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_bad_directive_is_an_error() {
        assert!(env_filter(None, Some("crate_data_web=loudest")).is_err());
    }
}
