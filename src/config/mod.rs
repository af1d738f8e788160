//! Configuration management for the pharmacy service.
//!
//! The service reads a TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `PHARMACY_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pharmacy::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("pharmacy.toml")?;
//! println!("Listening on {}", config.server.bind_address());
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! database_target = "postgresql"
//!
//! [application]
//! log_level = "info"
//!
//! [server]
//! host = "0.0.0.0"
//! port = 8000
//!
//! [auth]
//! jwt_secret = "${PHARMACY_JWT_SECRET}"
//! access_token_expire_minutes = 30
//!
//! [postgresql]
//! connection_string = "${PHARMACY_DATABASE_URL}"
//! max_connections = 10
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, AuthConfig, DatabaseTarget, LoggingConfig, PharmacyConfig,
    PostgreSQLConfig, ServerConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
