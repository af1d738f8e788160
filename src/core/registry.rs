//! Account registration and the medication catalog
//!
//! Registration is public; every other operation takes the acting account so
//! the role requirement is carried by the signature.

use crate::adapters::database::traits::PharmacyStore;
use crate::auth::hash_password;
use crate::domain::{
    Doctor, DoctorUpdate, Identity, LicenseNumber, Medication, MedicationName, MedicationUpdate,
    NewDoctor, NewMedication, NewPatient, NewPharmacist, Patient, PatientUpdate, Pharmacist,
    PharmacistUpdate, PharmacyError, Principal, Result, Ssn,
};
use std::sync::Arc;

/// Registers accounts and maintains the medication catalog
#[derive(Clone)]
pub struct Registry {
    store: Arc<dyn PharmacyStore>,
}

impl Registry {
    pub fn new(store: Arc<dyn PharmacyStore>) -> Self {
        Self { store }
    }

    pub async fn register_patient(&self, patient: NewPatient) -> Result<Patient> {
        patient.validate()?;
        let hashed = hash_password(&patient.password)?;
        let created = self.store.insert_patient(&patient, &hashed).await?;
        tracing::info!(patient_id = created.id, "Patient registered");
        Ok(created)
    }

    pub async fn register_doctor(&self, doctor: NewDoctor) -> Result<Doctor> {
        doctor.validate()?;
        let hashed = hash_password(&doctor.password)?;
        let created = self.store.insert_doctor(&doctor, &hashed).await?;
        tracing::info!(doctor_license = %created.license_number, "Doctor registered");
        Ok(created)
    }

    pub async fn register_pharmacist(&self, pharmacist: NewPharmacist) -> Result<Pharmacist> {
        pharmacist.validate()?;
        let hashed = hash_password(&pharmacist.password)?;
        let created = self.store.insert_pharmacist(&pharmacist, &hashed).await?;
        tracing::info!(pharmacist_license = %created.license_number, "Pharmacist registered");
        Ok(created)
    }

    pub async fn list_patients(&self, _pharmacist: &Pharmacist) -> Result<Vec<Patient>> {
        self.store.list_patients().await
    }

    /// Patient directory for prescribing; there is no doctor-patient assignment
    pub async fn list_patients_for_doctor(&self, _doctor: &Doctor) -> Result<Vec<Patient>> {
        self.store.list_patients().await
    }

    /// Pharmacists and doctors see any patient; a patient sees only themself
    pub async fn patient(&self, principal: &Principal, ssn: &Ssn) -> Result<Patient> {
        if let Identity::Patient(own) = &principal.identity {
            if own != ssn {
                return Err(PharmacyError::Forbidden(
                    "Not authorized to view other patient profiles".to_string(),
                ));
            }
        }
        self.store
            .find_patient_by_ssn(ssn)
            .await?
            .ok_or_else(|| PharmacyError::not_found("Patient"))
    }

    /// Pharmacists may edit any patient, patients only themself
    pub async fn update_patient(
        &self,
        principal: &Principal,
        ssn: &Ssn,
        update: PatientUpdate,
    ) -> Result<Patient> {
        let allowed = match &principal.identity {
            Identity::Pharmacist(_) => true,
            Identity::Patient(own) => own == ssn,
            Identity::Doctor(_) => false,
        };
        if !allowed {
            return Err(PharmacyError::Forbidden(
                "Not authorized to update other patient profiles".to_string(),
            ));
        }
        update.validate()?;
        let updated = self.store.update_patient(ssn, &update).await?;
        tracing::info!(patient_id = updated.id, principal_id = principal.id, "Patient updated");
        Ok(updated)
    }

    /// Pharmacists may delete any patient, patients only themself
    ///
    /// # Errors
    ///
    /// `Conflict` while any prescription still references the patient.
    pub async fn delete_patient(&self, principal: &Principal, ssn: &Ssn) -> Result<()> {
        let allowed = match &principal.identity {
            Identity::Pharmacist(_) => true,
            Identity::Patient(own) => own == ssn,
            Identity::Doctor(_) => false,
        };
        if !allowed {
            return Err(PharmacyError::Forbidden(
                "Not authorized to delete other patient profiles".to_string(),
            ));
        }
        self.store.delete_patient(ssn).await?;
        tracing::info!(principal_id = principal.id, "Patient deleted");
        Ok(())
    }

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>> {
        self.store.list_doctors().await
    }

    pub async fn doctor(&self, license: &LicenseNumber) -> Result<Doctor> {
        self.store
            .find_doctor_by_license(license)
            .await?
            .ok_or_else(|| PharmacyError::not_found("Doctor"))
    }

    /// Pharmacists may edit any doctor, doctors only themself
    pub async fn update_doctor(
        &self,
        principal: &Principal,
        license: &LicenseNumber,
        update: DoctorUpdate,
    ) -> Result<Doctor> {
        let allowed = match &principal.identity {
            Identity::Pharmacist(_) => true,
            Identity::Doctor(own) => own == license,
            Identity::Patient(_) => false,
        };
        if !allowed {
            return Err(PharmacyError::Forbidden(
                "Not authorized to update other doctor profiles".to_string(),
            ));
        }
        update.validate()?;
        let updated = self.store.update_doctor(license, &update).await?;
        tracing::info!(doctor_license = %license, "Doctor updated");
        Ok(updated)
    }

    /// Pharmacists may delete any doctor, doctors only themself
    pub async fn delete_doctor(
        &self,
        principal: &Principal,
        license: &LicenseNumber,
    ) -> Result<()> {
        let allowed = match &principal.identity {
            Identity::Pharmacist(_) => true,
            Identity::Doctor(own) => own == license,
            Identity::Patient(_) => false,
        };
        if !allowed {
            return Err(PharmacyError::Forbidden(
                "Not authorized to delete other doctor profiles".to_string(),
            ));
        }
        self.store.delete_doctor(license).await?;
        tracing::info!(doctor_license = %license, "Doctor deleted");
        Ok(())
    }

    pub async fn list_pharmacists(&self, _pharmacist: &Pharmacist) -> Result<Vec<Pharmacist>> {
        self.store.list_pharmacists().await
    }

    pub async fn pharmacist(
        &self,
        _pharmacist: &Pharmacist,
        license: &LicenseNumber,
    ) -> Result<Pharmacist> {
        self.store
            .find_pharmacist_by_license(license)
            .await?
            .ok_or_else(|| PharmacyError::not_found("Pharmacist"))
    }

    /// A pharmacist may only edit their own profile
    pub async fn update_pharmacist(
        &self,
        pharmacist: &Pharmacist,
        license: &LicenseNumber,
        update: PharmacistUpdate,
    ) -> Result<Pharmacist> {
        if &pharmacist.license_number != license {
            return Err(PharmacyError::Forbidden(
                "Not authorized to update other pharmacist profiles".to_string(),
            ));
        }
        update.validate()?;
        let updated = self.store.update_pharmacist(license, &update).await?;
        tracing::info!(pharmacist_license = %license, "Pharmacist updated");
        Ok(updated)
    }

    pub async fn delete_pharmacist(
        &self,
        pharmacist: &Pharmacist,
        license: &LicenseNumber,
    ) -> Result<()> {
        self.store.delete_pharmacist(license).await?;
        tracing::info!(
            pharmacist_license = %license,
            deleted_by = %pharmacist.license_number,
            "Pharmacist deleted"
        );
        Ok(())
    }

    pub async fn add_medication(
        &self,
        pharmacist: &Pharmacist,
        medication: NewMedication,
    ) -> Result<Medication> {
        medication.validate()?;
        let created = self.store.insert_medication(&medication).await?;
        tracing::info!(
            medication = %created.name,
            stock = created.stock_quantity,
            pharmacist_license = %pharmacist.license_number,
            "Medication added"
        );
        Ok(created)
    }

    pub async fn list_medications(&self) -> Result<Vec<Medication>> {
        self.store.list_medications().await
    }

    pub async fn medication(&self, name: &MedicationName) -> Result<Medication> {
        self.store
            .find_medication_by_name(name)
            .await?
            .ok_or_else(|| PharmacyError::not_found("Medication"))
    }

    /// Replace descriptive fields; stock only moves through fulfillment
    pub async fn update_medication(
        &self,
        pharmacist: &Pharmacist,
        name: &MedicationName,
        update: MedicationUpdate,
    ) -> Result<Medication> {
        update.validate()?;
        let updated = self.store.update_medication(name, &update).await?;
        tracing::info!(
            medication = %name,
            pharmacist_license = %pharmacist.license_number,
            "Medication updated"
        );
        Ok(updated)
    }

    pub async fn delete_medication(
        &self,
        pharmacist: &Pharmacist,
        name: &MedicationName,
    ) -> Result<()> {
        self.store.delete_medication(name).await?;
        tracing::info!(
            medication = %name,
            pharmacist_license = %pharmacist.license_number,
            "Medication deleted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::auth::verify_password;
    use crate::domain::Account;

    fn new_patient(ssn: &str, email: &str) -> NewPatient {
        NewPatient {
            ssn: Ssn::new(ssn).unwrap(),
            name: "Ada".to_string(),
            date_of_birth: None,
            contact_info: None,
            allergies: None,
            email: email.to_string(),
            password: "s3cret-pass".to_string(),
        }
    }

    fn registry() -> Registry {
        Registry::new(Arc::new(MemoryStore::new()))
    }

    fn new_pharmacist(license: &str) -> NewPharmacist {
        NewPharmacist {
            license_number: LicenseNumber::new(license).unwrap(),
            name: "Pat".to_string(),
            email: format!("{}@example.com", license.to_lowercase()),
            password: "s3cret-pass".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let registry = registry();
        let patient = registry
            .register_patient(new_patient("111-11-1111", "ada@example.com"))
            .await
            .unwrap();
        assert_ne!(patient.hashed_password, "s3cret-pass");
        assert!(verify_password("s3cret-pass", &patient.hashed_password));
    }

    #[tokio::test]
    async fn test_duplicate_registration_messages() {
        let registry = registry();
        registry
            .register_patient(new_patient("111-11-1111", "ada@example.com"))
            .await
            .unwrap();

        let err = registry
            .register_patient(new_patient("111-11-1111", "other@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "SSN already registered");

        let err = registry
            .register_patient(new_patient("222-22-2222", "ada@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Email already registered");
    }

    #[tokio::test]
    async fn test_patient_profile_scoping() {
        let registry = registry();
        let ada = registry
            .register_patient(new_patient("111-11-1111", "ada@example.com"))
            .await
            .unwrap();
        let bob = registry
            .register_patient(new_patient("222-22-2222", "bob@example.com"))
            .await
            .unwrap();

        let found = registry.patient(&ada.principal(), &ada.ssn).await.unwrap();
        assert_eq!(found.id, ada.id);

        let err = registry.patient(&ada.principal(), &bob.ssn).await.unwrap_err();
        assert_eq!(err.to_string(), "Not authorized to view other patient profiles");

        let err = registry
            .delete_patient(&ada.principal(), &bob.ssn)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Not authorized to delete other patient profiles");

        registry.delete_patient(&bob.principal(), &bob.ssn).await.unwrap();
        assert!(registry.patient(&ada.principal(), &ada.ssn).await.is_ok());
    }

    #[tokio::test]
    async fn test_medication_validation() {
        let registry = registry();
        let pharmacist = registry
            .register_pharmacist(new_pharmacist("P1"))
            .await
            .unwrap();

        let err = registry
            .add_medication(
                &pharmacist,
                NewMedication {
                    name: MedicationName::new("Ibuprofen").unwrap(),
                    description: None,
                    dosage_form: None,
                    strength: None,
                    stock_quantity: -1,
                    price: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PharmacyError::Validation(_)));

        let err = registry
            .medication(&MedicationName::new("Ibuprofen").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Medication not found");
    }

    #[tokio::test]
    async fn test_patient_update_scoping() {
        let registry = registry();
        let ada = registry
            .register_patient(new_patient("111-11-1111", "ada@example.com"))
            .await
            .unwrap();
        let bob = registry
            .register_patient(new_patient("222-22-2222", "bob@example.com"))
            .await
            .unwrap();
        let phil = registry.register_pharmacist(new_pharmacist("P1")).await.unwrap();
        let rename = || PatientUpdate {
            name: Some("Ada L.".to_string()),
            ..PatientUpdate::default()
        };

        let err = registry
            .update_patient(&bob.principal(), &ada.ssn, rename())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Not authorized to update other patient profiles");

        let own = registry
            .update_patient(&ada.principal(), &ada.ssn, rename())
            .await
            .unwrap();
        assert_eq!(own.name, "Ada L.");

        let blank = PatientUpdate {
            name: Some(String::new()),
            ..PatientUpdate::default()
        };
        assert!(matches!(
            registry.update_patient(&phil.principal(), &bob.ssn, blank).await,
            Err(PharmacyError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_pharmacist_edits_only_own_profile() {
        let registry = registry();
        let p1 = registry.register_pharmacist(new_pharmacist("P1")).await.unwrap();
        let p2 = registry.register_pharmacist(new_pharmacist("P2")).await.unwrap();
        let update = || PharmacistUpdate {
            name: Some("Renamed".to_string()),
        };

        let err = registry
            .update_pharmacist(&p1, &p2.license_number, update())
            .await
            .unwrap_err();
        assert!(matches!(err, PharmacyError::Forbidden(_)));

        let updated = registry
            .update_pharmacist(&p1, &p1.license_number, update())
            .await
            .unwrap();
        assert_eq!(updated.name, "Renamed");

        registry.delete_pharmacist(&p1, &p2.license_number).await.unwrap();
        let remaining = registry.list_pharmacists(&p1).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].license_number, p1.license_number);
    }
}
