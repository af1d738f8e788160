//! Core business logic for the pharmacy backend.
//!
//! # Modules
//!
//! - [`prescription`] - Prescription lifecycle, authorization policy and stock deduction
//! - [`registry`] - Account registration and the medication catalog
//!
//! # Prescription Workflow
//!
//! 1. **Issue**: a doctor creates a pending prescription under their own license
//! 2. **Revise** (optional): the author patches the patient or replaces the lines
//! 3. **Fulfill**: a pharmacist dispenses it, deducting one unit of stock per line
//!
//! A fulfilled prescription is frozen; further edits, deletion or a second
//! fulfillment fail with a conflict.
//!
//! # Example
//!
//! ```rust,no_run
//! use pharmacy::adapters::memory::MemoryStore;
//! use pharmacy::core::prescription::PrescriptionEngine;
//! use pharmacy::domain::{Account, Doctor};
//! use std::sync::Arc;
//!
//! # async fn example(doctor: Doctor) -> pharmacy::domain::Result<()> {
//! let engine = PrescriptionEngine::new(Arc::new(MemoryStore::new()));
//!
//! for prescription in engine.list_for_doctor(&doctor).await? {
//!     println!("{} {}", prescription.id, prescription.status);
//! }
//! # let _ = doctor.principal();
//! # Ok(())
//! # }
//! ```

pub mod prescription;
pub mod registry;

pub use prescription::PrescriptionEngine;
pub use registry::Registry;
