//! One record service per enabled backend

use crate_data_config::{AppConfig, ClientServerConfig, SqliteBackendConfig};
use crate_data_core::{DialectKind, RecordService, SqlExecutor, SqlRepository};
use crate_data_mysql::{MySqlConfig, MySqlExecutor};
use crate_data_postgres::{PostgresConfig, PostgresExecutor};
use crate_data_sqlite::{SqliteConfig, SqliteExecutor, SqlitePool};
use crate_data_web::Backends;
use std::sync::Arc;
use tracing::info;

pub fn postgres_config(section: &ClientServerConfig) -> PostgresConfig {
    PostgresConfig {
        host: section.host.clone(),
        port: section.port_or(ClientServerConfig::POSTGRES_PORT),
        user: section.user.clone(),
        password: section.password.clone(),
        database: section.database.clone(),
        max_connections: section.max_connections as usize,
        connection_lifetime_secs: section.connection_lifetime_secs,
    }
}

pub fn mysql_config(section: &ClientServerConfig) -> MySqlConfig {
    MySqlConfig {
        host: section.host.clone(),
        port: section.port_or(ClientServerConfig::MYSQL_PORT),
        user: section.user.clone(),
        password: section.password.clone(),
        database: section.database.clone(),
        max_connections: section.max_connections,
        connection_lifetime_secs: section.connection_lifetime_secs,
        ..MySqlConfig::default()
    }
}

pub fn sqlite_config(section: &SqliteBackendConfig) -> SqliteConfig {
    SqliteConfig {
        wal_mode: section.wal_mode,
        foreign_keys: section.foreign_keys,
        busy_timeout_ms: section.busy_timeout_ms,
        ..SqliteConfig::new(&section.database)
    }
}

fn service<E: SqlExecutor + 'static>(executor: E) -> Arc<RecordService> {
    Arc::new(RecordService::new(Arc::new(SqlRepository::new(executor))))
}

/// Pools are created here; client/server connections open on first use
pub fn build(config: &AppConfig) -> anyhow::Result<Backends> {
    let mut backends = Backends::new();

    if config.postgres.enabled {
        let executor = PostgresExecutor::from_config(&postgres_config(&config.postgres))?;
        backends = backends.with(DialectKind::Postgres, service(executor));
    }
    if config.mysql.enabled {
        let executor = MySqlExecutor::from_config(&mysql_config(&config.mysql));
        backends = backends.with(DialectKind::MySql, service(executor));
    }
    if config.sqlite.enabled {
        let pool = SqlitePool::new(sqlite_config(&config.sqlite))?;
        backends = backends.with(DialectKind::Sqlite, service(SqliteExecutor::new(pool)));
    }

    for kind in backends.kinds() {
        info!(backend = %kind, "Backend enabled");
    }
    Ok(backends)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn section() -> ClientServerConfig {
        ClientServerConfig {
            enabled: true,
            host: "db".into(),
            user: "app".into(),
            password: "secret".into(),
            database: "records".into(),
            max_connections: 7,
            ..ClientServerConfig::default()
        }
    }

    #[test]
    fn test_client_server_ports_default_per_backend() {
        assert_eq!(postgres_config(&section()).port, 5432);
        assert_eq!(mysql_config(&section()).port, 3306);

        let explicit = ClientServerConfig {
            port: Some(6000),
            ..section()
        };
        assert_eq!(postgres_config(&explicit).port, 6000);
        assert_eq!(mysql_config(&explicit).port, 6000);
    }

    #[test]
    fn test_pool_settings_carry_over() {
        let pg = postgres_config(&section());
        assert_eq!(pg.max_connections, 7);
        assert_eq!(pg.connection_lifetime_secs, 30);
        assert_eq!(pg.database, "records");

        let my = mysql_config(&section());
        assert_eq!(my.max_connections, 7);
        assert_eq!(my.user, "app");
    }

    #[test]
    fn test_sqlite_only_backends() {
        let dir = TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.sqlite.enabled = true;
        config.sqlite.database = dir.path().join("app.db").display().to_string();
        config.sqlite.wal_mode = false;

        let backends = build(&config).unwrap();
        assert_eq!(backends.kinds().collect::<Vec<_>>(), vec![DialectKind::Sqlite]);
        assert!(dir.path().join("app.db").exists());
    }
}
