//! Domain models and types for the pharmacy backend.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Natural-key identifiers** ([`Ssn`], [`LicenseNumber`], [`MedicationName`])
//! - **Account records** ([`Patient`], [`Doctor`], [`Pharmacist`])
//! - **Catalog and prescription models** ([`Medication`], [`Prescription`])
//! - **Acting principals** ([`Principal`], [`Resolution`])
//! - **Error types** ([`PharmacyError`]) and the [`Result`] alias
//!
//! # Type Safety
//!
//! Natural keys are newtypes so an SSN can never be passed where a license
//! number is expected:
//!
//! ```rust
//! use pharmacy::domain::{LicenseNumber, Ssn};
//!
//! # fn example() -> Result<(), String> {
//! let ssn = Ssn::new("111-11-1111")?;
//! let license = LicenseNumber::new("D1")?;
//!
//! // This won't compile
//! // let wrong: Ssn = license;
//! # let _ = (ssn, license);
//! # Ok(())
//! # }
//! ```

pub mod accounts;
pub mod errors;
pub mod ids;
pub mod medication;
pub mod prescription;
pub mod principal;
pub mod result;

// Re-export commonly used types for convenience
pub use accounts::{
    Account, Doctor, DoctorUpdate, NewDoctor, NewPatient, NewPharmacist, Patient, PatientUpdate,
    Pharmacist, PharmacistUpdate,
};
pub use errors::PharmacyError;
pub use ids::{LicenseNumber, MedicationName, Ssn};
pub use medication::{Medication, MedicationUpdate, NewMedication};
pub use prescription::{
    NewPrescription, NewPrescriptionLine, Pagination, Prescription, PrescriptionDraft,
    PrescriptionFilter, PrescriptionLine, PrescriptionPage, PrescriptionPatch, PrescriptionStatus,
    PrescriptionSummary,
};
pub use principal::{Identity, Principal, Resolution, Role};
pub use result::Result;
