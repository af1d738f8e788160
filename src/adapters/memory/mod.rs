//! In-memory storage backend
//!
//! Holds every record in process memory behind a single lock. Nothing is
//! persisted across restarts.

pub mod store;

pub use store::MemoryStore;
