//! Migrate command implementation

use super::{EXIT_CONFIG, EXIT_FATAL};
use crate::adapters::postgresql::PostgreSQLClient;
use crate::config::load_config;
use crate::config::schema::DatabaseTarget;
use clap::Args;

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {}

impl MigrateArgs {
    /// Execute the migrate command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                println!("Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        if config.database_target != DatabaseTarget::PostgreSQL {
            println!(
                "database_target is '{}'; migrations only apply to postgresql",
                config.database_target.as_str()
            );
            return Ok(EXIT_CONFIG);
        }
        let Some(pg_config) = config.postgresql else {
            println!("[postgresql] section is missing");
            return Ok(EXIT_CONFIG);
        };

        let client = match PostgreSQLClient::new(pg_config) {
            Ok(client) => client,
            Err(e) => {
                println!("Invalid PostgreSQL settings: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        println!("Applying schema to {}", client.connection_string_safe());
        if let Err(e) = client.ping().await {
            tracing::error!(error = %e, "PostgreSQL is unreachable");
            println!("Cannot reach PostgreSQL: {e}");
            return Ok(EXIT_FATAL);
        }
        match client.run_migrations().await {
            Ok(()) => {
                println!("Schema is up to date");
                Ok(0)
            }
            Err(e) => {
                tracing::error!(error = %e, "Migration failed");
                println!("Migration failed: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_memory_target_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "database_target = \"memory\"\n[auth]\njwt_secret = \"0123456789abcdef0123456789abcdef\"\n"
        )
        .unwrap();

        let code = MigrateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }
}
