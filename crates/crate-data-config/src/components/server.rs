//! HTTP server configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Path prefix every dialect router is mounted under
    pub api_prefix: String,

    /// Value of the `X-API-Version` response header
    pub api_version: String,

    pub max_request_size_mb: usize,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn max_request_bytes(&self) -> usize {
        self.max_request_size_mb * 1024 * 1024
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8421,
            api_prefix: "/crate-api-data".to_string(),
            api_version: "2024-01-06".to_string(),
            max_request_size_mb: 10,
        }
    }
}
