//! Root configuration

use crate::components::{ClientServerConfig, LoggingConfig, ServerConfig, SqliteBackendConfig};
use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub postgres: ClientServerConfig,
    pub mysql: ClientServerConfig,
    pub sqlite: SqliteBackendConfig,
}

impl AppConfig {
    /// Check that every enabled backend can be connected to
    pub fn validate(&self) -> ConfigResult<()> {
        for (backend, section) in [("postgres", &self.postgres), ("mysql", &self.mysql)] {
            if !section.enabled {
                continue;
            }
            let missing = section.missing_fields();
            if !missing.is_empty() {
                return Err(ConfigError::Incomplete {
                    backend,
                    fields: missing.join(", "),
                });
            }
        }

        if self.sqlite.enabled && self.sqlite.database.trim().is_empty() {
            return Err(ConfigError::Incomplete {
                backend: "sqlite",
                fields: "database".to_string(),
            });
        }

        if !(self.postgres.enabled || self.mysql.enabled || self.sqlite.enabled) {
            return Err(ConfigError::NoBackendEnabled);
        }
        Ok(())
    }
}
