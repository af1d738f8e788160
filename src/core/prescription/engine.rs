//! Prescription engine
//!
//! Orchestrates every prescription operation: authorization against the acting
//! principal first, then the atomic storage call. Storage re-checks the
//! prescription status under its own lock, so a check made here can never be
//! invalidated by a concurrent request between the check and the write.

use crate::adapters::database::traits::PharmacyStore;
use crate::core::prescription::clock::{Clock, SystemClock};
use crate::core::prescription::policy;
use crate::domain::{
    Doctor, NewPrescription, Pagination, Patient, Pharmacist, PharmacyError, Prescription,
    PrescriptionDraft, PrescriptionFilter, PrescriptionPage, PrescriptionPatch,
    PrescriptionStatus, Principal, Result,
};
use std::sync::Arc;

/// Entry point for prescription operations
#[derive(Clone)]
pub struct PrescriptionEngine {
    store: Arc<dyn PharmacyStore>,
    clock: Arc<dyn Clock>,
}

impl PrescriptionEngine {
    /// Create an engine that stamps prescriptions with the host's date
    pub fn new(store: Arc<dyn PharmacyStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Create an engine that takes issue dates from `clock`
    pub fn with_clock(store: Arc<dyn PharmacyStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Issue a pending prescription dated today
    ///
    /// # Errors
    ///
    /// `Forbidden` when the request names another doctor's license (checked
    /// before any lookup), `Validation` for blank line fields, and `NotFound`
    /// naming the first patient, doctor or medication that does not exist.
    pub async fn create(&self, doctor: &Doctor, request: NewPrescription) -> Result<Prescription> {
        policy::authorize_prescriber(doctor, &request.doctor_license)?;
        for line in &request.medications {
            line.validate()?;
        }

        let draft = PrescriptionDraft {
            patient_ssn: request.patient_ssn,
            doctor_license: request.doctor_license,
            date_issued: self.clock.today(),
            medications: request.medications,
        };
        let prescription = self.store.insert_prescription(&draft).await?;

        tracing::info!(
            prescription_id = prescription.id,
            doctor_license = %prescription.doctor_license,
            lines = prescription.medications.len(),
            "Prescription issued"
        );
        Ok(prescription)
    }

    /// Read one prescription, scoped to the principal
    pub async fn read(&self, principal: &Principal, id: i64) -> Result<Prescription> {
        let prescription = self.load(id).await?;
        policy::authorize_read(principal, &prescription)?;
        Ok(prescription)
    }

    /// Every prescription the doctor wrote, newest first
    pub async fn list_for_doctor(&self, doctor: &Doctor) -> Result<Vec<Prescription>> {
        self.store
            .list_prescriptions_for_doctor(&doctor.license_number)
            .await
    }

    /// Every prescription issued to the patient, newest first
    pub async fn list_for_patient(&self, patient: &Patient) -> Result<Vec<Prescription>> {
        self.store.list_prescriptions_for_patient(&patient.ssn).await
    }

    /// Filtered, paginated listing of all prescriptions for pharmacists
    pub async fn list_all(
        &self,
        pharmacist: &Pharmacist,
        filter: &PrescriptionFilter,
        page: Pagination,
    ) -> Result<PrescriptionPage> {
        filter.validate()?;
        tracing::debug!(
            pharmacist_license = %pharmacist.license_number,
            skip = page.skip,
            limit = page.limit,
            "Listing prescriptions"
        );
        self.store.search_prescriptions(filter, page).await
    }

    /// Apply a patch to a pending prescription the doctor wrote
    ///
    /// # Errors
    ///
    /// `NotFound`, then `Forbidden` for anyone but the author, then `Conflict`
    /// once fulfilled. The patch is applied completely or not at all.
    pub async fn update(
        &self,
        doctor: &Doctor,
        id: i64,
        patch: &PrescriptionPatch,
    ) -> Result<Prescription> {
        let current = self.load(id).await?;
        policy::authorize_author(doctor, &current)?;
        current.ensure_mutable()?;

        if let Some(lines) = &patch.medications {
            for line in lines {
                line.validate()?;
            }
        }
        if patch.is_empty() {
            return Ok(current);
        }

        let updated = self.store.update_prescription(id, patch).await?;
        tracing::info!(prescription_id = id, "Prescription updated");
        Ok(updated)
    }

    /// Dispense a pending prescription, taking one unit of stock per line
    ///
    /// # Errors
    ///
    /// `NotFound` if absent, `Conflict` if already fulfilled and `OutOfStock`
    /// naming the first medication without stock. Stock is untouched on error.
    pub async fn fulfill(&self, pharmacist: &Pharmacist, id: i64) -> Result<Prescription> {
        let prescription = self.store.fulfill_prescription(id).await.map_err(|e| {
            if let PharmacyError::OutOfStock { medication } = &e {
                tracing::warn!(
                    prescription_id = id,
                    medication = %medication,
                    "Fulfillment blocked"
                );
            }
            e
        })?;

        crate::log_prescription_transition!(
            id,
            PrescriptionStatus::Pending,
            PrescriptionStatus::Fulfilled
        );
        tracing::info!(
            prescription_id = id,
            pharmacist_license = %pharmacist.license_number,
            "Prescription fulfilled"
        );
        Ok(prescription)
    }

    /// Remove a pending prescription the doctor wrote
    pub async fn delete(&self, doctor: &Doctor, id: i64) -> Result<()> {
        let current = self.load(id).await?;
        policy::authorize_author(doctor, &current)?;
        current.ensure_mutable()?;

        self.store.delete_prescription(id).await?;
        tracing::info!(prescription_id = id, "Prescription deleted");
        Ok(())
    }

    async fn load(&self, id: i64) -> Result<Prescription> {
        self.store
            .find_prescription(id)
            .await?
            .ok_or_else(|| PharmacyError::not_found("Prescription"))
    }
}
