//! Storage backend factory
//!
//! This module builds the store selected by `database_target`.

use crate::adapters::database::traits::PharmacyStore;
use crate::adapters::memory::MemoryStore;
use crate::adapters::postgresql::{PostgreSQLAdapter, PostgreSQLClient};
use crate::config::schema::{DatabaseTarget, PharmacyConfig};
use crate::domain::{PharmacyError, Result};
use std::sync::Arc;

/// Create the storage backend named by the configuration
///
/// # Errors
///
/// Returns a `Configuration` error when the `postgresql` target has no
/// `[postgresql]` section, or any error raised while building the pool.
pub fn create_store(config: &PharmacyConfig) -> Result<Arc<dyn PharmacyStore>> {
    match config.database_target {
        DatabaseTarget::PostgreSQL => {
            let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                PharmacyError::Configuration(
                    "database_target is postgresql but [postgresql] is missing".to_string(),
                )
            })?;

            let client = PostgreSQLClient::new(pg_config.clone())?;
            tracing::info!(
                target = %client.connection_string_safe(),
                max_connections = pg_config.max_connections,
                "Creating PostgreSQL store"
            );
            Ok(Arc::new(PostgreSQLAdapter::new(client)))
        }
        DatabaseTarget::Memory => {
            tracing::warn!("Using in-memory store; records are lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
