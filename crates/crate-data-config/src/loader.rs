//! Configuration loading
//!
//! Precedence, lowest first: built-in defaults, the TOML file, environment
//! variables.

use crate::config::AppConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "crate-data.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load, apply environment overrides and validate
    pub fn load(path: Option<&Path>) -> ConfigResult<AppConfig> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::load_from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                debug!("No config file, using defaults");
                AppConfig::default()
            }
        };

        Self::apply_env_overrides(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> ConfigResult<AppConfig> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::load_from_str(&content)?;
        info!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    pub fn load_from_str(content: &str) -> ConfigResult<AppConfig> {
        Ok(toml::from_str(content)?)
    }

    /// Override `config` from the process environment
    pub fn apply_env_overrides(config: &mut AppConfig) -> ConfigResult<()> {
        Self::apply_overrides_from(config, |key| std::env::var(key).ok())
    }

    /// Override `config` from any key lookup using the deployment variable names
    pub fn apply_overrides_from<F>(config: &mut AppConfig, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = parse(&lookup, "PORT")? {
            config.server.port = port;
        }

        for (prefix, section) in [("POSTGRES", &mut config.postgres), ("MYSQL", &mut config.mysql)] {
            let key = |name: &str| format!("{prefix}_{name}");
            if let Some(enabled) = lookup(&key("ENABLED")) {
                section.enabled = is_enabled(&enabled);
            }
            if let Some(user) = lookup(&key("USER")) {
                section.user = user;
            }
            if let Some(password) = lookup(&key("PASSWORD")) {
                section.password = password;
            }
            if let Some(host) = lookup(&key("HOST")) {
                section.host = host;
            }
            if let Some(port) = parse(&lookup, &key("PORT"))? {
                section.port = Some(port);
            }
            if let Some(database) = lookup(&key("DATABASE")) {
                section.database = database;
            }
        }

        if let Some(enabled) = lookup("SQLITE_ENABLED") {
            config.sqlite.enabled = is_enabled(&enabled);
        }
        if let Some(database) = lookup("SQLITE_DATABASE") {
            config.sqlite.database = database;
        }

        Ok(())
    }
}

/// Enabled flags accept exactly `true` or `1`
fn is_enabled(value: &str) -> bool {
    matches!(value.trim(), "true" | "1")
}

fn parse<T, F>(lookup: &F, key: &str) -> ConfigResult<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value,
            }),
    }
}
