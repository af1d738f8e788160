//! Prescription lifecycle: issuing, scoped reads, edits and fulfillment

pub mod clock;
pub mod engine;
pub mod lifecycle;
pub mod policy;

pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::PrescriptionEngine;
