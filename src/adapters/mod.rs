//! Storage backends for the pharmacy backend.
//!
//! - [`database`] - The [`PharmacyStore`](database::PharmacyStore) trait and the backend factory
//! - [`postgresql`] - PostgreSQL implementation with pooled connections
//! - [`memory`] - In-process implementation for tests and local demos
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate storage from the
//! prescription engine. The engine only sees an `Arc<dyn PharmacyStore>`
//! chosen once at startup:
//!
//! ```rust,no_run
//! use pharmacy::adapters::database::create_store;
//! use pharmacy::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("pharmacy.toml")?;
//! let store = create_store(&config)?;
//! store.ping().await?;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod memory;
pub mod postgresql;
