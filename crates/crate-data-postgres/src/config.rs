//! PostgreSQL connection settings and pool construction

use crate::error::{PostgresError, PostgresResult};
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use std::time::Duration;
use tokio_postgres::NoTls;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,

    /// Upper bound on open connections
    pub max_connections: usize,

    /// Connections older than this are closed instead of reused
    pub connection_lifetime_secs: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            database: "postgres".to_string(),
            max_connections: num_cpus::get() * 2 + 1,
            connection_lifetime_secs: 30,
        }
    }
}

impl PostgresConfig {
    pub fn connection_lifetime(&self) -> Duration {
        Duration::from_secs(self.connection_lifetime_secs)
    }

    /// Build a lazily connecting pool; no connection is opened here
    pub fn create_pool(&self) -> PostgresResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());
        cfg.dbname = Some(self.database.clone());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        cfg.pool = Some(PoolConfig::new(self.max_connections));

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| PostgresError::Pool(format!("Failed to create pool: {}", e)))?;

        info!(
            host = %self.host,
            port = self.port,
            database = %self.database,
            max_connections = self.max_connections,
            "PostgreSQL pool created"
        );
        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_scale_with_cpus() {
        let config = PostgresConfig::default();
        assert_eq!(config.max_connections, num_cpus::get() * 2 + 1);
        assert_eq!(config.connection_lifetime(), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_pool_creation_does_not_connect() {
        let config = PostgresConfig {
            host: "127.0.0.1".into(),
            port: 1,
            max_connections: 3,
            ..Default::default()
        };
        let pool = config.create_pool().unwrap();
        assert_eq!(pool.status().max_size, 3);
    }
}
