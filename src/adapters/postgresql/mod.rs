//! PostgreSQL storage backend
//!
//! Pooled connections via `deadpool-postgres`, optional TLS through
//! `postgres-native-tls`, and the schema in `migrations/`.

pub mod adapter;
pub mod client;
pub mod models;

pub use adapter::PostgreSQLAdapter;
pub use client::PostgreSQLClient;
