//! Row mapping for the PostgreSQL tables
//!
//! Column lists are shared between queries so every `SELECT` and `RETURNING`
//! clause hands the mappers the same shape.

use crate::domain::{
    Doctor, Medication, Patient, Pharmacist, PharmacyError, Prescription, PrescriptionLine,
    PrescriptionStatus, Result,
};
use tokio_postgres::error::SqlState;
use tokio_postgres::Row;

pub(crate) const PATIENT_COLUMNS: &str = "id, ssn, name, date_of_birth, contact_info, allergies, \
     email, hashed_password, is_active, created_at, updated_at";

pub(crate) const DOCTOR_COLUMNS: &str = "id, license_number, name, specialization, contact_info, \
     email, hashed_password, is_active, created_at, updated_at";

pub(crate) const PHARMACIST_COLUMNS: &str =
    "id, license_number, name, email, hashed_password, is_active, created_at, updated_at";

pub(crate) const MEDICATION_COLUMNS: &str =
    "id, name, description, dosage_form, strength, stock_quantity, price";

pub(crate) const PRESCRIPTION_COLUMNS: &str =
    "p.id, p.patient_ssn, p.doctor_license, p.date_issued, p.status";

pub(crate) const LINE_COLUMNS: &str =
    "id, prescription_id, medication_name, dosage, frequency, duration";

/// Reads a natural-key column, rejecting values the domain would refuse
fn key<K>(row: &Row, column: &str) -> Result<K>
where
    K: TryFrom<String, Error = String>,
{
    let raw: String = row.try_get(column)?;
    K::try_from(raw).map_err(|e| PharmacyError::Database(format!("Invalid {column} in row: {e}")))
}

pub(crate) fn patient_from_row(row: &Row) -> Result<Patient> {
    Ok(Patient {
        id: row.try_get("id")?,
        ssn: key(row, "ssn")?,
        name: row.try_get("name")?,
        date_of_birth: row.try_get("date_of_birth")?,
        contact_info: row.try_get("contact_info")?,
        allergies: row.try_get("allergies")?,
        email: row.try_get("email")?,
        hashed_password: row.try_get("hashed_password")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(crate) fn doctor_from_row(row: &Row) -> Result<Doctor> {
    Ok(Doctor {
        id: row.try_get("id")?,
        license_number: key(row, "license_number")?,
        name: row.try_get("name")?,
        specialization: row.try_get("specialization")?,
        contact_info: row.try_get("contact_info")?,
        email: row.try_get("email")?,
        hashed_password: row.try_get("hashed_password")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(crate) fn pharmacist_from_row(row: &Row) -> Result<Pharmacist> {
    Ok(Pharmacist {
        id: row.try_get("id")?,
        license_number: key(row, "license_number")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        hashed_password: row.try_get("hashed_password")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(crate) fn medication_from_row(row: &Row) -> Result<Medication> {
    Ok(Medication {
        id: row.try_get("id")?,
        name: key(row, "name")?,
        description: row.try_get("description")?,
        dosage_form: row.try_get("dosage_form")?,
        strength: row.try_get("strength")?,
        stock_quantity: row.try_get("stock_quantity")?,
        price: row.try_get("price")?,
    })
}

pub(crate) fn line_from_row(row: &Row) -> Result<PrescriptionLine> {
    Ok(PrescriptionLine {
        id: row.try_get("id")?,
        medication_name: key(row, "medication_name")?,
        dosage: row.try_get("dosage")?,
        frequency: row.try_get("frequency")?,
        duration: row.try_get("duration")?,
    })
}

/// Maps a prescription header; lines are attached by the caller
pub(crate) fn prescription_from_row(row: &Row) -> Result<Prescription> {
    let status: String = row.try_get("status")?;
    Ok(Prescription {
        id: row.try_get("id")?,
        patient_ssn: key(row, "patient_ssn")?,
        doctor_license: key(row, "doctor_license")?,
        date_issued: row.try_get("date_issued")?,
        status: status
            .parse::<PrescriptionStatus>()
            .map_err(PharmacyError::Database)?,
        medications: Vec::new(),
    })
}

/// Message for a unique violation, told apart by constraint name
///
/// The messages match what the in-memory backend reports for the same
/// collision.
pub(crate) fn unique_violation_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("patients_ssn_key") => "SSN already registered",
        Some("doctors_license_number_key" | "pharmacists_license_number_key") => {
            "License number already registered"
        }
        Some("medications_name_key") => "Medication already registered",
        Some(name) if name.ends_with("_email_key") => "Email already registered",
        _ => "Record already registered",
    }
}

/// Translates constraint violations into client errors
pub(crate) fn map_db_error(err: tokio_postgres::Error) -> PharmacyError {
    if let Some(db) = err.as_db_error() {
        let code = db.code();
        if *code == SqlState::UNIQUE_VIOLATION {
            return PharmacyError::AlreadyExists(
                unique_violation_message(db.constraint()).to_string(),
            );
        }
        if *code == SqlState::FOREIGN_KEY_VIOLATION {
            return PharmacyError::Conflict(format!(
                "Referenced record constraint violated: {}",
                db.message()
            ));
        }
        if *code == SqlState::CHECK_VIOLATION {
            return PharmacyError::Validation(db.message().to_string());
        }
    }
    PharmacyError::Database(err.to_string())
}
