//! Configuration errors

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// Environment variable present but unparseable
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    /// Enabled backend is missing required connection fields
    #[error("Backend '{backend}' is enabled but missing: {fields}")]
    Incomplete { backend: &'static str, fields: String },

    #[error("No database backend is enabled")]
    NoBackendEnabled,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
