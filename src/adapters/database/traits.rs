//! Storage abstraction traits
//!
//! This module defines the trait that storage backends must implement
//! to hold pharmacy records.

use crate::domain::{
    Doctor, DoctorUpdate, LicenseNumber, Medication, MedicationName, MedicationUpdate, NewDoctor,
    NewMedication, NewPatient, NewPharmacist, Pagination, Patient, PatientUpdate, Pharmacist,
    PharmacistUpdate, Prescription, PrescriptionDraft, PrescriptionFilter, PrescriptionPage,
    PrescriptionPatch, Result, Ssn,
};
use async_trait::async_trait;

/// Storage backend for accounts, the medication catalog and prescriptions
///
/// Lookups return `Ok(None)` for absent records; only backend failures are errors.
/// The prescription mutators (`update_prescription`, `fulfill_prescription`,
/// `delete_prescription`) are atomic: each re-checks the prescription status while
/// holding a lock on it and either applies every change or none.
#[async_trait]
pub trait PharmacyStore: Send + Sync {
    /// Name of the backend, for logging
    fn backend_name(&self) -> &str;

    /// Test that the backend is reachable
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot serve queries.
    async fn ping(&self) -> Result<()>;

    /// Insert a patient
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` if the SSN or email is taken.
    async fn insert_patient(&self, patient: &NewPatient, hashed_password: &str)
        -> Result<Patient>;

    async fn find_patient_by_ssn(&self, ssn: &Ssn) -> Result<Option<Patient>>;

    async fn find_patient_by_email(&self, email: &str) -> Result<Option<Patient>>;

    /// All patients ordered by id
    async fn list_patients(&self) -> Result<Vec<Patient>>;

    /// Apply profile changes and stamp `updated_at`
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no patient has this SSN.
    async fn update_patient(&self, ssn: &Ssn, update: &PatientUpdate) -> Result<Patient>;

    /// Delete a patient
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent and `Conflict` if any prescription references it.
    async fn delete_patient(&self, ssn: &Ssn) -> Result<()>;

    /// Insert a doctor
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` if the license number or email is taken.
    async fn insert_doctor(&self, doctor: &NewDoctor, hashed_password: &str) -> Result<Doctor>;

    async fn find_doctor_by_license(&self, license: &LicenseNumber) -> Result<Option<Doctor>>;

    async fn find_doctor_by_email(&self, email: &str) -> Result<Option<Doctor>>;

    /// All doctors ordered by id
    async fn list_doctors(&self) -> Result<Vec<Doctor>>;

    async fn update_doctor(&self, license: &LicenseNumber, update: &DoctorUpdate)
        -> Result<Doctor>;

    /// Delete a doctor
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent and `Conflict` if any prescription references it.
    async fn delete_doctor(&self, license: &LicenseNumber) -> Result<()>;

    /// Insert a pharmacist
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` if the license number or email is taken.
    async fn insert_pharmacist(
        &self,
        pharmacist: &NewPharmacist,
        hashed_password: &str,
    ) -> Result<Pharmacist>;

    async fn find_pharmacist_by_license(
        &self,
        license: &LicenseNumber,
    ) -> Result<Option<Pharmacist>>;

    async fn find_pharmacist_by_email(&self, email: &str) -> Result<Option<Pharmacist>>;

    /// All pharmacists ordered by id
    async fn list_pharmacists(&self) -> Result<Vec<Pharmacist>>;

    async fn update_pharmacist(
        &self,
        license: &LicenseNumber,
        update: &PharmacistUpdate,
    ) -> Result<Pharmacist>;

    /// Delete a pharmacist
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent. Prescriptions never reference pharmacists,
    /// so there is no restriction.
    async fn delete_pharmacist(&self, license: &LicenseNumber) -> Result<()>;

    /// Insert a catalog medication
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` if the name is taken.
    async fn insert_medication(&self, medication: &NewMedication) -> Result<Medication>;

    async fn find_medication_by_name(&self, name: &MedicationName) -> Result<Option<Medication>>;

    /// All medications ordered by name
    async fn list_medications(&self) -> Result<Vec<Medication>>;

    /// Replace the descriptive fields of a medication, leaving stock untouched
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent.
    async fn update_medication(
        &self,
        name: &MedicationName,
        update: &MedicationUpdate,
    ) -> Result<Medication>;

    /// Delete a medication
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent and `Conflict` if any prescription line references it.
    async fn delete_medication(&self, name: &MedicationName) -> Result<()>;

    /// Persist a pending prescription and its lines in one transaction
    ///
    /// # Errors
    ///
    /// Returns `NotFound` naming the first patient, doctor or medication that does
    /// not resolve.
    async fn insert_prescription(&self, draft: &PrescriptionDraft) -> Result<Prescription>;

    async fn find_prescription(&self, id: i64) -> Result<Option<Prescription>>;

    /// Prescriptions written by `license`, newest first
    async fn list_prescriptions_for_doctor(
        &self,
        license: &LicenseNumber,
    ) -> Result<Vec<Prescription>>;

    /// Prescriptions issued to `ssn`, newest first
    async fn list_prescriptions_for_patient(&self, ssn: &Ssn) -> Result<Vec<Prescription>>;

    /// Filtered, paginated listing enriched with patient and doctor names
    async fn search_prescriptions(
        &self,
        filter: &PrescriptionFilter,
        page: Pagination,
    ) -> Result<PrescriptionPage>;

    /// Apply a patch to a pending prescription
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the prescription or a newly referenced record is absent,
    /// and `Conflict` if the prescription is fulfilled when the lock is taken.
    async fn update_prescription(&self, id: i64, patch: &PrescriptionPatch)
        -> Result<Prescription>;

    /// Fulfill a pending prescription, deducting one unit of stock per line
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent, `Conflict` if not pending and `OutOfStock`
    /// naming the first medication that cannot cover its lines. No stock changes
    /// on any error.
    async fn fulfill_prescription(&self, id: i64) -> Result<Prescription>;

    /// Delete a pending prescription and its lines
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent and `Conflict` if fulfilled.
    async fn delete_prescription(&self, id: i64) -> Result<()>;
}
