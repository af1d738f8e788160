//! Serve command implementation
//!
//! Loads the configuration, starts file-aware logging, builds the store and
//! runs the HTTP API until a shutdown signal arrives.

use super::{EXIT_CONFIG, EXIT_FATAL};
use crate::adapters::database::create_store;
use crate::auth::TokenIssuer;
use crate::config::load_config;
use crate::logging::init_logging;
use crate::server::{self, AppState};
use clap::Args;
use tokio::sync::watch;

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Override `server.host`
    #[arg(long)]
    pub host: Option<String>,

    /// Override `server.port`
    #[arg(long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(
        &self,
        config_path: &str,
        log_level: Option<&str>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let mut config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load configuration from {config_path}: {e}");
                return Ok(EXIT_CONFIG);
            }
        };
        if let Some(ref host) = self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }

        let level = log_level.unwrap_or(&config.application.log_level);
        let _guard = match init_logging(level, &config.logging) {
            Ok(guard) => guard,
            Err(e) => {
                eprintln!("Failed to initialize logging: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        tracing::info!(
            version = env!("CARGO_PKG_VERSION"),
            config_path = %config_path,
            database_target = config.database_target.as_str(),
            "Starting pharmacy service"
        );

        let store = match create_store(&config) {
            Ok(store) => store,
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize storage backend");
                return Ok(EXIT_FATAL);
            }
        };

        let state = AppState::new(store, TokenIssuer::from_config(&config.auth));
        server::serve(state, &config.server, shutdown_signal).await?;
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_missing_config_is_config_error() {
        let args = ServeArgs {
            host: None,
            port: None,
        };
        let (_tx, rx) = watch::channel(false);
        let code = args
            .execute("/nonexistent/pharmacy.toml", None, rx)
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }

    #[tokio::test]
    async fn test_invalid_config_is_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "database_target = \"memory\"\n[auth]\njwt_secret = \"short\"").unwrap();
        let args = ServeArgs {
            host: None,
            port: None,
        };
        let (_tx, rx) = watch::channel(false);
        let code = args
            .execute(file.path().to_str().unwrap(), None, rx)
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }
}
