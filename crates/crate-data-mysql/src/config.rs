//! MySQL connection settings and pool construction

use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct MySqlConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,

    /// Upper bound on open connections
    pub max_connections: u32,

    /// Connections older than this are closed instead of reused
    pub connection_lifetime_secs: u64,

    /// How long a statement waits for a free connection
    pub acquire_timeout_secs: u64,
}

impl Default for MySqlConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            database: "mysql".to_string(),
            max_connections: (num_cpus::get() * 2 + 1) as u32,
            connection_lifetime_secs: 30,
            acquire_timeout_secs: 10,
        }
    }
}

impl MySqlConfig {
    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }

    /// Build a lazily connecting pool; no connection is opened here
    pub fn create_pool(&self) -> MySqlPool {
        let pool = MySqlPoolOptions::new()
            .max_connections(self.max_connections)
            .max_lifetime(Duration::from_secs(self.connection_lifetime_secs))
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
            .connect_lazy_with(self.connect_options());

        info!(
            host = %self.host,
            port = self.port,
            database = %self.database,
            max_connections = self.max_connections,
            "MySQL pool created"
        );
        pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_scale_with_cpus() {
        let config = MySqlConfig::default();
        assert_eq!(config.max_connections as usize, num_cpus::get() * 2 + 1);
        assert_eq!(config.connection_lifetime_secs, 30);
        assert_eq!(config.port, 3306);
    }

    #[tokio::test]
    async fn test_pool_creation_does_not_connect() {
        let config = MySqlConfig {
            host: "127.0.0.1".into(),
            port: 1,
            ..Default::default()
        };
        let pool = config.create_pool();
        assert_eq!(pool.size(), 0);
        assert_eq!(pool.options().get_max_connections(), config.max_connections);
    }
}
