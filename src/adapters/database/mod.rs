//! Database abstraction layer
//!
//! This module provides a trait-based abstraction for storage operations,
//! allowing the backend to run on PostgreSQL or entirely in memory.

pub mod factory;
pub mod traits;

pub use factory::create_store;
pub use traits::PharmacyStore;
