//! Database backend configuration
//!
//! Client/server backends share one connection shape; the embedded backend
//! only needs a file path and its tuning knobs.

use serde::{Deserialize, Serialize};

/// Pool size used when none is configured
pub fn default_max_connections() -> u32 {
    (num_cpus::get() * 2 + 1) as u32
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientServerConfig {
    pub enabled: bool,
    pub host: String,

    /// Falls back to the backend's well-known port
    pub port: Option<u16>,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
    pub connection_lifetime_secs: u64,
}

impl Default for ClientServerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: String::new(),
            port: None,
            user: String::new(),
            password: String::new(),
            database: String::new(),
            max_connections: default_max_connections(),
            connection_lifetime_secs: 30,
        }
    }
}

impl ClientServerConfig {
    pub const POSTGRES_PORT: u16 = 5432;
    pub const MYSQL_PORT: u16 = 3306;

    pub fn port_or(&self, default: u16) -> u16 {
        self.port.unwrap_or(default)
    }

    /// Names of required connection fields that are empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("host", &self.host),
            ("user", &self.user),
            ("database", &self.database),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteBackendConfig {
    pub enabled: bool,
    pub database: String,
    pub wal_mode: bool,
    pub foreign_keys: bool,
    pub busy_timeout_ms: u32,
}

impl Default for SqliteBackendConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            database: "./sqlite.db".to_string(),
            wal_mode: true,
            foreign_keys: true,
            busy_timeout_ms: 5000,
        }
    }
}
