//! Config file loading and process environment overrides

use crate_data_config::{AppConfig, ConfigError, ConfigLoader, LogFormat};
use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;

const ENV_KEYS: &[&str] = &[
    "PORT",
    "POSTGRES_ENABLED",
    "POSTGRES_HOST",
    "POSTGRES_USER",
    "POSTGRES_DATABASE",
    "MYSQL_ENABLED",
    "SQLITE_ENABLED",
    "SQLITE_DATABASE",
];

fn clear_env() {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn test_load_file_then_validate() {
    clear_env();
    let file = config_file(
        r#"
        [server]
        port = 7000
        api_version = "2025-01-01"

        [logging]
        level = "debug"
        format = "json"

        [sqlite]
        enabled = true
        database = "/tmp/records.db"
        "#,
    );

    let config = ConfigLoader::load(Some(file.path())).unwrap();
    assert_eq!(config.server.port, 7000);
    assert_eq!(config.server.api_version, "2025-01-01");
    assert_eq!(config.logging.level.as_deref(), Some("debug"));
    assert_eq!(config.logging.format, LogFormat::Json);
    assert!(config.sqlite.enabled);
    assert_eq!(config.sqlite.database, "/tmp/records.db");
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    clear_env();
    let file = config_file("[sqlite]\nenabled = true\n");
    std::env::set_var("PORT", "9999");
    std::env::set_var("POSTGRES_ENABLED", "true");
    std::env::set_var("POSTGRES_HOST", "localhost");
    std::env::set_var("POSTGRES_USER", "postgres");
    std::env::set_var("POSTGRES_DATABASE", "records");

    let config = ConfigLoader::load(Some(file.path()));
    clear_env();

    let config = config.unwrap();
    assert_eq!(config.server.port, 9999);
    assert!(config.postgres.enabled);
    assert_eq!(config.postgres.database, "records");
    assert!(config.sqlite.enabled);
}

#[test]
#[serial]
fn test_enabled_backend_without_host_fails_validation() {
    clear_env();
    std::env::set_var("MYSQL_ENABLED", "1");
    let file = config_file("");

    let result = ConfigLoader::load(Some(file.path()));
    clear_env();

    assert!(matches!(
        result,
        Err(ConfigError::Incomplete { backend: "mysql", .. })
    ));
}

#[test]
#[serial]
fn test_missing_file_is_an_io_error() {
    clear_env();
    let result = ConfigLoader::load(Some(std::path::Path::new("/nonexistent/crate-data.toml")));
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[test]
fn test_malformed_toml_is_a_parse_error() {
    assert!(matches!(
        ConfigLoader::load_from_str("[server\nport = 1"),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_serialized_defaults_load_back() {
    let text = toml::to_string(&AppConfig::default()).unwrap();
    assert_eq!(ConfigLoader::load_from_str(&text).unwrap(), AppConfig::default());
}
