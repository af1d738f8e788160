//! In-memory storage backend
//!
//! Every operation takes one async mutex over the whole state, so each store
//! call is atomic and concurrent calls serialize. Used by tests and by the
//! `memory` database target for local demos.

use crate::adapters::database::traits::PharmacyStore;
use crate::core::prescription::lifecycle::{plan_fulfillment, sort_newest_first, StockPlan};
use crate::domain::{
    Doctor, DoctorUpdate, LicenseNumber, Medication, MedicationName, MedicationUpdate, NewDoctor,
    NewMedication, NewPatient, NewPharmacist, NewPrescriptionLine, Pagination, Patient,
    PatientUpdate, Pharmacist, PharmacistUpdate, PharmacyError, Prescription, PrescriptionDraft,
    PrescriptionFilter, PrescriptionLine, PrescriptionPage, PrescriptionPatch, PrescriptionStatus,
    PrescriptionSummary, Result, Ssn,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Sequences {
    patient: i64,
    doctor: i64,
    pharmacist: i64,
    medication: i64,
    prescription: i64,
    line: i64,
}

fn next(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

#[derive(Debug, Default)]
struct MemoryState {
    patients: BTreeMap<Ssn, Patient>,
    doctors: BTreeMap<LicenseNumber, Doctor>,
    pharmacists: BTreeMap<LicenseNumber, Pharmacist>,
    medications: BTreeMap<MedicationName, Medication>,
    prescriptions: BTreeMap<i64, Prescription>,
    sequences: Sequences,
}

impl MemoryState {
    fn require_patient(&self, ssn: &Ssn) -> Result<()> {
        if self.patients.contains_key(ssn) {
            Ok(())
        } else {
            Err(PharmacyError::not_found("Patient"))
        }
    }

    fn build_lines(&mut self, lines: &[NewPrescriptionLine]) -> Result<Vec<PrescriptionLine>> {
        for line in lines {
            if !self.medications.contains_key(&line.medication_name) {
                return Err(PharmacyError::not_found(format!(
                    "Medication {}",
                    line.medication_name
                )));
            }
        }

        Ok(lines
            .iter()
            .map(|line| PrescriptionLine {
                id: next(&mut self.sequences.line),
                medication_name: line.medication_name.clone(),
                dosage: line.dosage.clone(),
                frequency: line.frequency.clone(),
                duration: line.duration.clone(),
            })
            .collect())
    }

    fn prescriptions_where(&self, keep: impl Fn(&Prescription) -> bool) -> Vec<Prescription> {
        let mut found: Vec<Prescription> = self
            .prescriptions
            .values()
            .filter(|rx| keep(rx))
            .cloned()
            .collect();
        sort_newest_first(&mut found);
        found
    }

    fn summarize(&self, prescription: Prescription) -> PrescriptionSummary {
        let patient_name = self
            .patients
            .get(&prescription.patient_ssn)
            .map(|p| p.name.clone());
        let doctor_name = self
            .doctors
            .get(&prescription.doctor_license)
            .map(|d| d.name.clone());
        PrescriptionSummary {
            prescription,
            patient_name,
            doctor_name,
        }
    }

    fn email_taken<'a, I>(mut emails: I, email: &str) -> bool
    where
        I: Iterator<Item = &'a String>,
    {
        emails.any(|existing| existing == email)
    }
}

/// Storage backend holding every record in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the stock level of a medication
    ///
    /// Only fulfillment changes stock through the store trait; this exists for
    /// seeding demo data and tests.
    pub async fn set_stock(&self, name: &MedicationName, stock_quantity: i32) -> Result<()> {
        let mut state = self.state.lock().await;
        let medication = state
            .medications
            .get_mut(name)
            .ok_or_else(|| PharmacyError::not_found("Medication"))?;
        medication.stock_quantity = stock_quantity;
        Ok(())
    }

    /// Flip the active flag of a patient, doctor or pharmacist by email
    pub async fn set_active(&self, email: &str, is_active: bool) -> Result<()> {
        let mut state = self.state.lock().await;
        let mut touched = false;
        for patient in state.patients.values_mut().filter(|p| p.email == email) {
            patient.is_active = is_active;
            touched = true;
        }
        for doctor in state.doctors.values_mut().filter(|d| d.email == email) {
            doctor.is_active = is_active;
            touched = true;
        }
        for pharmacist in state.pharmacists.values_mut().filter(|p| p.email == email) {
            pharmacist.is_active = is_active;
            touched = true;
        }
        if touched {
            Ok(())
        } else {
            Err(PharmacyError::not_found("Account"))
        }
    }
}

#[async_trait]
impl PharmacyStore for MemoryStore {
    fn backend_name(&self) -> &str {
        "memory"
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn insert_patient(
        &self,
        patient: &NewPatient,
        hashed_password: &str,
    ) -> Result<Patient> {
        let mut state = self.state.lock().await;
        if state.patients.contains_key(&patient.ssn) {
            return Err(PharmacyError::AlreadyExists(
                "SSN already registered".to_string(),
            ));
        }
        if MemoryState::email_taken(state.patients.values().map(|p| &p.email), &patient.email) {
            return Err(PharmacyError::AlreadyExists(
                "Email already registered".to_string(),
            ));
        }

        let record = Patient {
            id: next(&mut state.sequences.patient),
            ssn: patient.ssn.clone(),
            name: patient.name.clone(),
            date_of_birth: patient.date_of_birth,
            contact_info: patient.contact_info.clone(),
            allergies: patient.allergies.clone(),
            email: patient.email.clone(),
            hashed_password: hashed_password.to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
        };
        state.patients.insert(record.ssn.clone(), record.clone());
        Ok(record)
    }

    async fn find_patient_by_ssn(&self, ssn: &Ssn) -> Result<Option<Patient>> {
        Ok(self.state.lock().await.patients.get(ssn).cloned())
    }

    async fn find_patient_by_email(&self, email: &str) -> Result<Option<Patient>> {
        let state = self.state.lock().await;
        Ok(state.patients.values().find(|p| p.email == email).cloned())
    }

    async fn list_patients(&self) -> Result<Vec<Patient>> {
        let state = self.state.lock().await;
        let mut patients: Vec<Patient> = state.patients.values().cloned().collect();
        patients.sort_by_key(|p| p.id);
        Ok(patients)
    }

    async fn update_patient(&self, ssn: &Ssn, update: &PatientUpdate) -> Result<Patient> {
        let mut state = self.state.lock().await;
        let patient = state
            .patients
            .get_mut(ssn)
            .ok_or_else(|| PharmacyError::not_found("Patient"))?;
        if let Some(name) = &update.name {
            patient.name = name.clone();
        }
        if let Some(date_of_birth) = update.date_of_birth {
            patient.date_of_birth = Some(date_of_birth);
        }
        if let Some(contact_info) = &update.contact_info {
            patient.contact_info = Some(contact_info.clone());
        }
        if let Some(allergies) = &update.allergies {
            patient.allergies = Some(allergies.clone());
        }
        patient.updated_at = Some(Utc::now());
        Ok(patient.clone())
    }

    async fn delete_patient(&self, ssn: &Ssn) -> Result<()> {
        let mut state = self.state.lock().await;
        state.require_patient(ssn)?;
        if state.prescriptions.values().any(|rx| &rx.patient_ssn == ssn) {
            return Err(PharmacyError::Conflict(format!(
                "Patient {ssn} is referenced by existing prescriptions"
            )));
        }
        state.patients.remove(ssn);
        Ok(())
    }

    async fn insert_doctor(&self, doctor: &NewDoctor, hashed_password: &str) -> Result<Doctor> {
        let mut state = self.state.lock().await;
        if state.doctors.contains_key(&doctor.license_number) {
            return Err(PharmacyError::AlreadyExists(
                "License number already registered".to_string(),
            ));
        }
        if MemoryState::email_taken(state.doctors.values().map(|d| &d.email), &doctor.email) {
            return Err(PharmacyError::AlreadyExists(
                "Email already registered".to_string(),
            ));
        }

        let record = Doctor {
            id: next(&mut state.sequences.doctor),
            license_number: doctor.license_number.clone(),
            name: doctor.name.clone(),
            specialization: doctor.specialization.clone(),
            contact_info: doctor.contact_info.clone(),
            email: doctor.email.clone(),
            hashed_password: hashed_password.to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
        };
        state
            .doctors
            .insert(record.license_number.clone(), record.clone());
        Ok(record)
    }

    async fn find_doctor_by_license(&self, license: &LicenseNumber) -> Result<Option<Doctor>> {
        Ok(self.state.lock().await.doctors.get(license).cloned())
    }

    async fn find_doctor_by_email(&self, email: &str) -> Result<Option<Doctor>> {
        let state = self.state.lock().await;
        Ok(state.doctors.values().find(|d| d.email == email).cloned())
    }

    async fn list_doctors(&self) -> Result<Vec<Doctor>> {
        let state = self.state.lock().await;
        let mut doctors: Vec<Doctor> = state.doctors.values().cloned().collect();
        doctors.sort_by_key(|d| d.id);
        Ok(doctors)
    }

    async fn update_doctor(
        &self,
        license: &LicenseNumber,
        update: &DoctorUpdate,
    ) -> Result<Doctor> {
        let mut state = self.state.lock().await;
        let doctor = state
            .doctors
            .get_mut(license)
            .ok_or_else(|| PharmacyError::not_found("Doctor"))?;
        if let Some(name) = &update.name {
            doctor.name = name.clone();
        }
        if let Some(specialization) = &update.specialization {
            doctor.specialization = Some(specialization.clone());
        }
        if let Some(contact_info) = &update.contact_info {
            doctor.contact_info = Some(contact_info.clone());
        }
        doctor.updated_at = Some(Utc::now());
        Ok(doctor.clone())
    }

    async fn delete_doctor(&self, license: &LicenseNumber) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.doctors.contains_key(license) {
            return Err(PharmacyError::not_found("Doctor"));
        }
        if state
            .prescriptions
            .values()
            .any(|rx| &rx.doctor_license == license)
        {
            return Err(PharmacyError::Conflict(format!(
                "Doctor {license} is referenced by existing prescriptions"
            )));
        }
        state.doctors.remove(license);
        Ok(())
    }

    async fn insert_pharmacist(
        &self,
        pharmacist: &NewPharmacist,
        hashed_password: &str,
    ) -> Result<Pharmacist> {
        let mut state = self.state.lock().await;
        if state.pharmacists.contains_key(&pharmacist.license_number) {
            return Err(PharmacyError::AlreadyExists(
                "License number already registered".to_string(),
            ));
        }
        if MemoryState::email_taken(
            state.pharmacists.values().map(|p| &p.email),
            &pharmacist.email,
        ) {
            return Err(PharmacyError::AlreadyExists(
                "Email already registered".to_string(),
            ));
        }

        let record = Pharmacist {
            id: next(&mut state.sequences.pharmacist),
            license_number: pharmacist.license_number.clone(),
            name: pharmacist.name.clone(),
            email: pharmacist.email.clone(),
            hashed_password: hashed_password.to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
        };
        state
            .pharmacists
            .insert(record.license_number.clone(), record.clone());
        Ok(record)
    }

    async fn find_pharmacist_by_license(
        &self,
        license: &LicenseNumber,
    ) -> Result<Option<Pharmacist>> {
        Ok(self.state.lock().await.pharmacists.get(license).cloned())
    }

    async fn find_pharmacist_by_email(&self, email: &str) -> Result<Option<Pharmacist>> {
        let state = self.state.lock().await;
        Ok(state.pharmacists.values().find(|p| p.email == email).cloned())
    }

    async fn list_pharmacists(&self) -> Result<Vec<Pharmacist>> {
        let state = self.state.lock().await;
        let mut pharmacists: Vec<Pharmacist> = state.pharmacists.values().cloned().collect();
        pharmacists.sort_by_key(|p| p.id);
        Ok(pharmacists)
    }

    async fn update_pharmacist(
        &self,
        license: &LicenseNumber,
        update: &PharmacistUpdate,
    ) -> Result<Pharmacist> {
        let mut state = self.state.lock().await;
        let pharmacist = state
            .pharmacists
            .get_mut(license)
            .ok_or_else(|| PharmacyError::not_found("Pharmacist"))?;
        if let Some(name) = &update.name {
            pharmacist.name = name.clone();
        }
        pharmacist.updated_at = Some(Utc::now());
        Ok(pharmacist.clone())
    }

    async fn delete_pharmacist(&self, license: &LicenseNumber) -> Result<()> {
        let mut state = self.state.lock().await;
        state
            .pharmacists
            .remove(license)
            .map(|_| ())
            .ok_or_else(|| PharmacyError::not_found("Pharmacist"))
    }

    async fn insert_medication(&self, medication: &NewMedication) -> Result<Medication> {
        let mut state = self.state.lock().await;
        if state.medications.contains_key(&medication.name) {
            return Err(PharmacyError::AlreadyExists(
                "Medication already registered".to_string(),
            ));
        }

        let record = Medication {
            id: next(&mut state.sequences.medication),
            name: medication.name.clone(),
            description: medication.description.clone(),
            dosage_form: medication.dosage_form.clone(),
            strength: medication.strength.clone(),
            stock_quantity: medication.stock_quantity,
            price: medication.price,
        };
        state.medications.insert(record.name.clone(), record.clone());
        Ok(record)
    }

    async fn find_medication_by_name(&self, name: &MedicationName) -> Result<Option<Medication>> {
        Ok(self.state.lock().await.medications.get(name).cloned())
    }

    async fn list_medications(&self) -> Result<Vec<Medication>> {
        Ok(self
            .state
            .lock()
            .await
            .medications
            .values()
            .cloned()
            .collect())
    }

    async fn update_medication(
        &self,
        name: &MedicationName,
        update: &MedicationUpdate,
    ) -> Result<Medication> {
        let mut state = self.state.lock().await;
        let medication = state
            .medications
            .get_mut(name)
            .ok_or_else(|| PharmacyError::not_found("Medication"))?;
        medication.description = update.description.clone();
        medication.dosage_form = update.dosage_form.clone();
        medication.strength = update.strength.clone();
        medication.price = update.price;
        Ok(medication.clone())
    }

    async fn delete_medication(&self, name: &MedicationName) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.medications.contains_key(name) {
            return Err(PharmacyError::not_found("Medication"));
        }
        let referenced = state
            .prescriptions
            .values()
            .flat_map(|rx| rx.medications.iter())
            .any(|line| &line.medication_name == name);
        if referenced {
            return Err(PharmacyError::Conflict(format!(
                "Medication {name} is referenced by existing prescriptions"
            )));
        }
        state.medications.remove(name);
        Ok(())
    }

    async fn insert_prescription(&self, draft: &PrescriptionDraft) -> Result<Prescription> {
        let mut state = self.state.lock().await;
        state.require_patient(&draft.patient_ssn)?;
        if !state.doctors.contains_key(&draft.doctor_license) {
            return Err(PharmacyError::not_found("Doctor"));
        }

        let medications = state.build_lines(&draft.medications)?;
        let prescription = Prescription {
            id: next(&mut state.sequences.prescription),
            patient_ssn: draft.patient_ssn.clone(),
            doctor_license: draft.doctor_license.clone(),
            date_issued: draft.date_issued,
            status: PrescriptionStatus::Pending,
            medications,
        };
        state
            .prescriptions
            .insert(prescription.id, prescription.clone());
        Ok(prescription)
    }

    async fn find_prescription(&self, id: i64) -> Result<Option<Prescription>> {
        Ok(self.state.lock().await.prescriptions.get(&id).cloned())
    }

    async fn list_prescriptions_for_doctor(
        &self,
        license: &LicenseNumber,
    ) -> Result<Vec<Prescription>> {
        let state = self.state.lock().await;
        Ok(state.prescriptions_where(|rx| &rx.doctor_license == license))
    }

    async fn list_prescriptions_for_patient(&self, ssn: &Ssn) -> Result<Vec<Prescription>> {
        let state = self.state.lock().await;
        Ok(state.prescriptions_where(|rx| &rx.patient_ssn == ssn))
    }

    async fn search_prescriptions(
        &self,
        filter: &PrescriptionFilter,
        page: Pagination,
    ) -> Result<PrescriptionPage> {
        let state = self.state.lock().await;
        let matching = state.prescriptions_where(|rx| filter.matches(rx));
        let total = matching.len() as u64;

        let skip = usize::try_from(page.skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|rx| state.summarize(rx))
            .collect();

        Ok(PrescriptionPage {
            total,
            skip: page.skip,
            limit: page.limit,
            items,
        })
    }

    async fn update_prescription(
        &self,
        id: i64,
        patch: &PrescriptionPatch,
    ) -> Result<Prescription> {
        let mut state = self.state.lock().await;
        let current = state
            .prescriptions
            .get(&id)
            .cloned()
            .ok_or_else(|| PharmacyError::not_found("Prescription"))?;
        current.ensure_mutable()?;

        let mut updated = current;
        if let Some(ssn) = &patch.patient_ssn {
            state.require_patient(ssn)?;
            updated.patient_ssn = ssn.clone();
        }
        if let Some(lines) = &patch.medications {
            updated.medications = state.build_lines(lines)?;
        }

        state.prescriptions.insert(id, updated.clone());
        Ok(updated)
    }

    async fn fulfill_prescription(&self, id: i64) -> Result<Prescription> {
        let mut state = self.state.lock().await;
        let mut prescription = state
            .prescriptions
            .get(&id)
            .cloned()
            .ok_or_else(|| PharmacyError::not_found("Prescription"))?;
        prescription.mark_fulfilled()?;

        let stock: StockPlan = prescription
            .medications
            .iter()
            .filter_map(|line| {
                state
                    .medications
                    .get(&line.medication_name)
                    .map(|m| (m.name.clone(), m.stock_quantity))
            })
            .collect();
        let plan = plan_fulfillment(&prescription.medications, &stock)?;

        for (name, level) in plan {
            if let Some(medication) = state.medications.get_mut(&name) {
                medication.stock_quantity = level;
            }
        }
        state.prescriptions.insert(id, prescription.clone());
        Ok(prescription)
    }

    async fn delete_prescription(&self, id: i64) -> Result<()> {
        let mut state = self.state.lock().await;
        let prescription = state
            .prescriptions
            .get(&id)
            .ok_or_else(|| PharmacyError::not_found("Prescription"))?;
        prescription.ensure_mutable()?;
        state.prescriptions.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_patient(ssn: &str, email: &str) -> NewPatient {
        NewPatient {
            ssn: Ssn::new(ssn).unwrap(),
            name: "Ada".to_string(),
            date_of_birth: None,
            contact_info: None,
            allergies: None,
            email: email.to_string(),
            password: "correct-horse".to_string(),
        }
    }

    fn new_doctor(license: &str) -> NewDoctor {
        NewDoctor {
            license_number: LicenseNumber::new(license).unwrap(),
            name: "Dr. Grey".to_string(),
            specialization: None,
            contact_info: None,
            email: format!("{}@example.com", license.to_lowercase()),
            password: "correct-horse".to_string(),
        }
    }

    fn new_medication(name: &str, stock: i32) -> NewMedication {
        NewMedication {
            name: MedicationName::new(name).unwrap(),
            description: None,
            dosage_form: None,
            strength: None,
            stock_quantity: stock,
            price: None,
        }
    }

    fn draft(lines: &[&str]) -> PrescriptionDraft {
        PrescriptionDraft {
            patient_ssn: Ssn::new("111-11-1111").unwrap(),
            doctor_license: LicenseNumber::new("D1").unwrap(),
            date_issued: "2026-03-01".parse().unwrap(),
            medications: lines
                .iter()
                .map(|name| NewPrescriptionLine {
                    medication_name: MedicationName::new(*name).unwrap(),
                    dosage: "500mg".to_string(),
                    frequency: "twice daily".to_string(),
                    duration: "7 days".to_string(),
                })
                .collect(),
        }
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert_patient(&new_patient("111-11-1111", "ada@example.com"), "hash")
            .await
            .unwrap();
        store.insert_doctor(&new_doctor("D1"), "hash").await.unwrap();
        store
            .insert_medication(&new_medication("Amoxicillin", 1))
            .await
            .unwrap();
        store
            .insert_medication(&new_medication("Ibuprofen", 0))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_duplicate_patient_keys_rejected() {
        let store = seeded().await;

        let err = store
            .insert_patient(&new_patient("111-11-1111", "other@example.com"), "hash")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "SSN already registered");

        let err = store
            .insert_patient(&new_patient("222-22-2222", "ada@example.com"), "hash")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Email already registered");
    }

    #[tokio::test]
    async fn test_insert_prescription_names_missing_medication() {
        let store = seeded().await;
        let err = store
            .insert_prescription(&draft(&["Amoxicillin", "Ghost"]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Medication Ghost not found");
        assert!(store.find_prescription(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fulfill_out_of_stock_leaves_stock_untouched() {
        let store = seeded().await;
        let rx = store
            .insert_prescription(&draft(&["Amoxicillin", "Ibuprofen"]))
            .await
            .unwrap();

        let err = store.fulfill_prescription(rx.id).await.unwrap_err();
        assert_eq!(err.to_string(), "Ibuprofen out of stock");

        let amoxicillin = MedicationName::new("Amoxicillin").unwrap();
        let medication = store.find_medication_by_name(&amoxicillin).await.unwrap();
        assert_eq!(medication.unwrap().stock_quantity, 1);
        let stored = store.find_prescription(rx.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PrescriptionStatus::Pending);
    }

    #[tokio::test]
    async fn test_restrict_delete_of_referenced_records() {
        let store = seeded().await;
        store
            .insert_prescription(&draft(&["Amoxicillin"]))
            .await
            .unwrap();

        let ssn = Ssn::new("111-11-1111").unwrap();
        assert!(matches!(
            store.delete_patient(&ssn).await,
            Err(PharmacyError::Conflict(_))
        ));
        let name = MedicationName::new("Amoxicillin").unwrap();
        assert!(matches!(
            store.delete_medication(&name).await,
            Err(PharmacyError::Conflict(_))
        ));
        let unused = MedicationName::new("Ibuprofen").unwrap();
        store.delete_medication(&unused).await.unwrap();
    }

    #[tokio::test]
    async fn test_search_enriches_names_and_counts_total() {
        let store = seeded().await;
        for _ in 0..3 {
            store
                .insert_prescription(&draft(&["Amoxicillin"]))
                .await
                .unwrap();
        }

        let page = store
            .search_prescriptions(
                &PrescriptionFilter::default(),
                Pagination::new(Some(1), Some(1)).unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].prescription.id, 2);
        assert_eq!(page.items[0].patient_name.as_deref(), Some("Ada"));
        assert_eq!(page.items[0].doctor_name.as_deref(), Some("Dr. Grey"));
    }

    #[tokio::test]
    async fn test_medication_update_keeps_stock() {
        let store = seeded().await;
        let name = MedicationName::new("Amoxicillin").unwrap();
        let updated = store
            .update_medication(
                &name,
                &MedicationUpdate {
                    strength: Some("250mg".to_string()),
                    price: Some(4.5),
                    ..MedicationUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.strength.as_deref(), Some("250mg"));
        assert_eq!(updated.stock_quantity, 1);

        let missing = MedicationName::new("Ghost").unwrap();
        let err = store
            .update_medication(&missing, &MedicationUpdate::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Medication not found");
    }

    #[tokio::test]
    async fn test_patient_update_touches_only_supplied_fields() {
        let store = seeded().await;
        let ssn = Ssn::new("111-11-1111").unwrap();
        let updated = store
            .update_patient(
                &ssn,
                &PatientUpdate {
                    allergies: Some("penicillin".to_string()),
                    ..PatientUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Ada");
        assert_eq!(updated.allergies.as_deref(), Some("penicillin"));
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_pharmacist_delete_is_unrestricted() {
        let store = seeded().await;
        let pharmacist = NewPharmacist {
            license_number: LicenseNumber::new("P1").unwrap(),
            name: "Phil".to_string(),
            email: "phil@example.com".to_string(),
            password: "correct-horse".to_string(),
        };
        store.insert_pharmacist(&pharmacist, "hash").await.unwrap();
        assert_eq!(store.list_pharmacists().await.unwrap().len(), 1);

        store.delete_pharmacist(&pharmacist.license_number).await.unwrap();
        assert!(store.list_pharmacists().await.unwrap().is_empty());
        assert!(matches!(
            store.delete_pharmacist(&pharmacist.license_number).await,
            Err(PharmacyError::NotFound(_))
        ));
    }
}
