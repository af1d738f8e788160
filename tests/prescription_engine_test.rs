//! Prescription lifecycle tests driving the engine over the in-memory store

use chrono::NaiveDate;
use pharmacy::adapters::database::PharmacyStore;
use pharmacy::adapters::memory::MemoryStore;
use pharmacy::core::prescription::{FixedClock, PrescriptionEngine};
use pharmacy::core::Registry;
use pharmacy::domain::{
    Doctor, LicenseNumber, MedicationName, NewDoctor, NewMedication, NewPatient, NewPharmacist,
    NewPrescription, NewPrescriptionLine, Pagination, Pharmacist, PharmacyError,
    PrescriptionFilter, PrescriptionPatch, PrescriptionStatus, Ssn,
};
use std::sync::Arc;

struct Pharmacy {
    store: Arc<MemoryStore>,
    engine: PrescriptionEngine,
    doctor: Doctor,
    pharmacist: Pharmacist,
}

fn line(medication: &str) -> NewPrescriptionLine {
    NewPrescriptionLine {
        medication_name: MedicationName::new(medication).unwrap(),
        dosage: "1 tablet".to_string(),
        frequency: "daily".to_string(),
        duration: "5 days".to_string(),
    }
}

fn medication(name: &str, stock_quantity: i32) -> NewMedication {
    NewMedication {
        name: MedicationName::new(name).unwrap(),
        description: None,
        dosage_form: Some("tablet".to_string()),
        strength: None,
        stock_quantity,
        price: None,
    }
}

async fn setup(stock: &[(&str, i32)]) -> Pharmacy {
    let store = Arc::new(MemoryStore::new());
    let registry = Registry::new(store.clone());
    let engine = PrescriptionEngine::with_clock(
        store.clone(),
        Arc::new(FixedClock(NaiveDate::from_ymd_opt(2026, 5, 4).unwrap())),
    );

    registry
        .register_patient(NewPatient {
            ssn: Ssn::new("111-11-1111").unwrap(),
            name: "Pat".to_string(),
            date_of_birth: None,
            contact_info: None,
            allergies: Some("penicillin".to_string()),
            email: "pat@example.com".to_string(),
            password: "patient-pass".to_string(),
        })
        .await
        .unwrap();
    let doctor = registry
        .register_doctor(NewDoctor {
            license_number: LicenseNumber::new("D1").unwrap(),
            name: "Dr. One".to_string(),
            specialization: None,
            contact_info: None,
            email: "d1@example.com".to_string(),
            password: "doctor-pass".to_string(),
        })
        .await
        .unwrap();
    let pharmacist = registry
        .register_pharmacist(NewPharmacist {
            license_number: LicenseNumber::new("P1").unwrap(),
            name: "Phil".to_string(),
            email: "p1@example.com".to_string(),
            password: "pharmacist-pass".to_string(),
        })
        .await
        .unwrap();
    for (name, quantity) in stock {
        registry
            .add_medication(&pharmacist, medication(name, *quantity))
            .await
            .unwrap();
    }

    Pharmacy {
        store,
        engine,
        doctor,
        pharmacist,
    }
}

impl Pharmacy {
    async fn prescribe(&self, medications: &[&str]) -> i64 {
        self.engine
            .create(
                &self.doctor,
                NewPrescription {
                    patient_ssn: Ssn::new("111-11-1111").unwrap(),
                    doctor_license: LicenseNumber::new("D1").unwrap(),
                    medications: medications.iter().map(|m| line(m)).collect(),
                },
            )
            .await
            .unwrap()
            .id
    }

    async fn stock(&self, name: &str) -> i32 {
        self.store
            .find_medication_by_name(&MedicationName::new(name).unwrap())
            .await
            .unwrap()
            .unwrap()
            .stock_quantity
    }
}

#[tokio::test]
async fn test_multi_line_fulfillment_decrements_each_line() {
    let pharmacy = setup(&[("Amoxicillin", 3), ("Ibuprofen", 1)]).await;
    let id = pharmacy.prescribe(&["Amoxicillin", "Ibuprofen"]).await;

    let fulfilled = pharmacy
        .engine
        .fulfill(&pharmacy.pharmacist, id)
        .await
        .unwrap();
    assert_eq!(fulfilled.status, PrescriptionStatus::Fulfilled);
    assert_eq!(fulfilled.date_issued, NaiveDate::from_ymd_opt(2026, 5, 4).unwrap());
    assert_eq!(pharmacy.stock("Amoxicillin").await, 2);
    assert_eq!(pharmacy.stock("Ibuprofen").await, 0);
}

#[tokio::test]
async fn test_one_empty_line_blocks_the_whole_prescription() {
    let pharmacy = setup(&[("Amoxicillin", 3), ("Ibuprofen", 0)]).await;
    let id = pharmacy.prescribe(&["Amoxicillin", "Ibuprofen"]).await;

    let err = pharmacy
        .engine
        .fulfill(&pharmacy.pharmacist, id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PharmacyError::OutOfStock { ref medication } if medication == "Ibuprofen"
    ));
    assert_eq!(pharmacy.stock("Amoxicillin").await, 3);

    let current = pharmacy.store.find_prescription(id).await.unwrap().unwrap();
    assert_eq!(current.status, PrescriptionStatus::Pending);
}

#[tokio::test]
async fn test_concurrent_fulfillments_never_oversell() {
    let pharmacy = Arc::new(setup(&[("Amoxicillin", 1)]).await);
    let first = pharmacy.prescribe(&["Amoxicillin"]).await;
    let second = pharmacy.prescribe(&["Amoxicillin"]).await;

    let handles: Vec<_> = [first, second]
        .into_iter()
        .map(|id| {
            let pharmacy = pharmacy.clone();
            tokio::spawn(async move { pharmacy.engine.fulfill(&pharmacy.pharmacist, id).await })
        })
        .collect();

    let mut succeeded = 0;
    let mut out_of_stock = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(PharmacyError::OutOfStock { .. }) => out_of_stock += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!((succeeded, out_of_stock), (1, 1));
    assert_eq!(pharmacy.stock("Amoxicillin").await, 0);
}

#[tokio::test]
async fn test_concurrent_refulfillment_deducts_once() {
    let pharmacy = Arc::new(setup(&[("Amoxicillin", 5)]).await);
    let id = pharmacy.prescribe(&["Amoxicillin"]).await;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let pharmacy = pharmacy.clone();
            tokio::spawn(async move { pharmacy.engine.fulfill(&pharmacy.pharmacist, id).await })
        })
        .collect();

    let mut conflicts = 0;
    for handle in handles {
        if let Err(e) = handle.await.unwrap() {
            assert!(matches!(e, PharmacyError::Conflict(_)));
            conflicts += 1;
        }
    }
    assert_eq!(conflicts, 3);
    assert_eq!(pharmacy.stock("Amoxicillin").await, 4);
}

#[tokio::test]
async fn test_update_replaces_lines_and_keeps_status() {
    let pharmacy = setup(&[("Amoxicillin", 1), ("Ibuprofen", 1)]).await;
    let id = pharmacy.prescribe(&["Amoxicillin"]).await;

    let patch = PrescriptionPatch {
        patient_ssn: None,
        medications: Some(vec![line("Ibuprofen"), line("Amoxicillin")]),
    };
    let updated = pharmacy
        .engine
        .update(&pharmacy.doctor, id, &patch)
        .await
        .unwrap();
    assert_eq!(updated.status, PrescriptionStatus::Pending);
    let names: Vec<&str> = updated
        .medications
        .iter()
        .map(|l| l.medication_name.as_str())
        .collect();
    assert_eq!(names, ["Ibuprofen", "Amoxicillin"]);
}

#[tokio::test]
async fn test_update_with_unknown_medication_changes_nothing() {
    let pharmacy = setup(&[("Amoxicillin", 1)]).await;
    let id = pharmacy.prescribe(&["Amoxicillin"]).await;

    let patch = PrescriptionPatch {
        patient_ssn: None,
        medications: Some(vec![line("Unobtainium")]),
    };
    let err = pharmacy
        .engine
        .update(&pharmacy.doctor, id, &patch)
        .await
        .unwrap_err();
    assert!(matches!(err, PharmacyError::NotFound(_)));

    let current = pharmacy.store.find_prescription(id).await.unwrap().unwrap();
    assert_eq!(current.medications.len(), 1);
    assert_eq!(current.medications[0].medication_name.as_str(), "Amoxicillin");
}

#[tokio::test]
async fn test_listing_pages_newest_first() {
    let pharmacy = setup(&[("Amoxicillin", 10)]).await;
    let mut ids = Vec::new();
    for _ in 0..5 {
        ids.push(pharmacy.prescribe(&["Amoxicillin"]).await);
    }
    pharmacy
        .engine
        .fulfill(&pharmacy.pharmacist, ids[0])
        .await
        .unwrap();

    let page = pharmacy
        .engine
        .list_all(
            &pharmacy.pharmacist,
            &PrescriptionFilter::default(),
            Pagination::new(Some(1), Some(2)).unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(page.total, 5);
    let page_ids: Vec<i64> = page.items.iter().map(|s| s.prescription.id).collect();
    assert_eq!(page_ids, [ids[3], ids[2]]);

    let fulfilled_only = PrescriptionFilter {
        status: Some(PrescriptionStatus::Fulfilled),
        ..Default::default()
    };
    let page = pharmacy
        .engine
        .list_all(&pharmacy.pharmacist, &fulfilled_only, Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].prescription.id, ids[0]);
}

#[tokio::test]
async fn test_inverted_date_range_is_rejected() {
    let pharmacy = setup(&[]).await;
    let filter = PrescriptionFilter {
        start_date: NaiveDate::from_ymd_opt(2026, 6, 1),
        end_date: NaiveDate::from_ymd_opt(2026, 5, 1),
        ..Default::default()
    };
    let err = pharmacy
        .engine
        .list_all(&pharmacy.pharmacist, &filter, Pagination::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PharmacyError::Validation(_)));
}
