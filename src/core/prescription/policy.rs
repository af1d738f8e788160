//! Role-based authorization rules for prescription operations

use crate::domain::{
    Doctor, Identity, LicenseNumber, PharmacyError, Prescription, Principal, Result,
};

/// A doctor may only prescribe under their own license
pub fn authorize_prescriber(doctor: &Doctor, doctor_license: &LicenseNumber) -> Result<()> {
    if &doctor.license_number != doctor_license {
        tracing::warn!(
            role = "doctor",
            caller_license = %doctor.license_number,
            requested_license = %doctor_license,
            reason = "license does not match the caller",
            "Prescription issue denied"
        );
        return Err(PharmacyError::Forbidden(
            "Not authorized to prescribe under another doctor's license".to_string(),
        ));
    }
    Ok(())
}

/// Pharmacists read anything; doctors and patients only their own prescriptions
pub fn authorize_read(principal: &Principal, prescription: &Prescription) -> Result<()> {
    let allowed = match &principal.identity {
        Identity::Pharmacist(_) => true,
        Identity::Doctor(license) => prescription.is_authored_by(license),
        Identity::Patient(ssn) => &prescription.patient_ssn == ssn,
    };
    if !allowed {
        crate::log_access_denied!(
            principal.role(),
            prescription.id,
            "not a party to the prescription"
        );
        return Err(PharmacyError::Forbidden(
            "Not authorized to access this prescription".to_string(),
        ));
    }
    Ok(())
}

/// Only the prescribing doctor may change or delete a prescription
pub fn authorize_author(doctor: &Doctor, prescription: &Prescription) -> Result<()> {
    if !prescription.is_authored_by(&doctor.license_number) {
        crate::log_access_denied!("doctor", prescription.id, "not the prescribing doctor");
        return Err(PharmacyError::Forbidden(
            "Not authorized to modify this prescription".to_string(),
        ));
    }
    Ok(())
}
