//! PostgreSQL client implementation
//!
//! This module owns the connection pool and the schema migration.

use crate::config::schema::PostgreSQLConfig;
use crate::domain::{PharmacyError, Result};
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio_postgres::config::SslMode;
use tokio_postgres::NoTls;

const INITIAL_SCHEMA: &str = include_str!("../../../migrations/001_initial_schema.sql");

/// PostgreSQL client for the pharmacy store
///
/// Connections are checked out of the pool per operation and returned when
/// the operation's transaction ends.
pub struct PostgreSQLClient {
    /// Connection pool
    pool: Pool,

    /// Configuration
    config: PostgreSQLConfig,
}

impl PostgreSQLClient {
    /// Create a new PostgreSQL client
    ///
    /// No connection is opened until the first checkout.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error for an unparseable connection string and
    /// a `Database` error if the TLS connector or the pool cannot be built.
    pub fn new(config: PostgreSQLConfig) -> Result<Self> {
        let mut pg_config: tokio_postgres::Config = config
            .connection_string
            .expose_secret()
            .parse()
            .map_err(|e| {
                PharmacyError::Configuration(format!("Invalid PostgreSQL connection string: {e}"))
            })?;

        pg_config
            .connect_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .options(&format!(
                "-c statement_timeout={}",
                config.statement_timeout_seconds * 1000
            ));

        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };
        let manager = match config.ssl_mode.as_str() {
            "disable" => {
                pg_config.ssl_mode(SslMode::Disable);
                Manager::from_config(pg_config, NoTls, manager_config)
            }
            mode => {
                pg_config.ssl_mode(if mode == "require" {
                    SslMode::Require
                } else {
                    SslMode::Prefer
                });
                let connector = TlsConnector::builder().build().map_err(|e| {
                    PharmacyError::Database(format!("Failed to build TLS connector: {e}"))
                })?;
                Manager::from_config(pg_config, MakeTlsConnector::new(connector), manager_config)
            }
        };

        let timeout = Some(Duration::from_secs(config.connection_timeout_seconds));
        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .runtime(deadpool_postgres::Runtime::Tokio1)
            .wait_timeout(timeout)
            .create_timeout(timeout)
            .recycle_timeout(timeout)
            .build()
            .map_err(|e| {
                PharmacyError::Database(format!("Failed to create connection pool: {e}"))
            })?;

        Ok(Self { pool, config })
    }

    /// Check out a pooled connection
    pub async fn connection(&self) -> Result<Object> {
        Ok(self.pool.get().await?)
    }

    /// Round-trip a trivial query
    pub async fn ping(&self) -> Result<()> {
        let client = self.connection().await?;
        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| PharmacyError::Database(format!("Connection test failed: {e}")))?;
        Ok(())
    }

    /// Apply the schema; every statement is idempotent
    ///
    /// # Errors
    ///
    /// Returns a `Database` error if any statement fails.
    pub async fn run_migrations(&self) -> Result<()> {
        let client = self.connection().await?;
        client
            .batch_execute(INITIAL_SCHEMA)
            .await
            .map_err(|e| PharmacyError::Database(format!("Failed to execute migration: {e}")))?;

        tracing::info!(
            target = %self.connection_string_safe(),
            "PostgreSQL schema initialized"
        );
        Ok(())
    }

    /// Connection string with credentials redacted
    pub fn connection_string_safe(&self) -> String {
        redact_connection_string(self.config.connection_string.expose_secret().as_ref())
    }

    /// Get the pool statistics
    pub fn pool_status(&self) -> deadpool_postgres::Status {
        self.pool.status()
    }
}

fn redact_connection_string(raw: &str) -> String {
    match raw.rsplit_once('@') {
        Some((_, host)) => format!("postgresql://***@{host}"),
        None => "postgresql://***".to_string(),
    }
}
