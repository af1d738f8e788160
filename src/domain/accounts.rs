//! Patient, doctor and pharmacist account records
//!
//! These are read-mostly reference data for the prescription engine. The
//! `hashed_password` field is never serialized into API responses.

use crate::domain::errors::PharmacyError;
use crate::domain::ids::{LicenseNumber, Ssn};
use crate::domain::principal::{Identity, Principal, Role};
use crate::domain::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Common view over the three account kinds used by authentication
pub trait Account {
    /// Role this account kind authenticates as
    const ROLE: Role;

    /// Principal describing this account
    fn principal(&self) -> Principal;

    /// Argon2 PHC string of the account password
    fn hashed_password(&self) -> &str;

    /// Whether the account may authenticate
    fn is_active(&self) -> bool;
}

/// A registered patient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub ssn: Ssn,
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub contact_info: Option<String>,
    pub allergies: Option<String>,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub hashed_password: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A registered doctor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub license_number: LicenseNumber,
    pub name: String,
    pub specialization: Option<String>,
    pub contact_info: Option<String>,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub hashed_password: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A registered pharmacist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pharmacist {
    pub id: i64,
    pub license_number: LicenseNumber,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub hashed_password: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Account for Patient {
    const ROLE: Role = Role::Patient;

    fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            email: self.email.clone(),
            identity: Identity::Patient(self.ssn.clone()),
            is_active: self.is_active,
        }
    }

    fn hashed_password(&self) -> &str {
        &self.hashed_password
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl Account for Doctor {
    const ROLE: Role = Role::Doctor;

    fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            email: self.email.clone(),
            identity: Identity::Doctor(self.license_number.clone()),
            is_active: self.is_active,
        }
    }

    fn hashed_password(&self) -> &str {
        &self.hashed_password
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl Account for Pharmacist {
    const ROLE: Role = Role::Pharmacist;

    fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            email: self.email.clone(),
            identity: Identity::Pharmacist(self.license_number.clone()),
            is_active: self.is_active,
        }
    }

    fn hashed_password(&self) -> &str {
        &self.hashed_password
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

/// Patient registration payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewPatient {
    pub ssn: Ssn,
    pub name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub contact_info: Option<String>,
    #[serde(default)]
    pub allergies: Option<String>,
    pub email: String,
    pub password: String,
}

/// Doctor registration payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewDoctor {
    pub license_number: LicenseNumber,
    pub name: String,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub contact_info: Option<String>,
    pub email: String,
    pub password: String,
}

/// Pharmacist registration payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewPharmacist {
    pub license_number: LicenseNumber,
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Profile changes a patient or pharmacist may apply to a patient record
///
/// Absent fields are left as they are. The SSN and email are identity keys and
/// cannot be changed here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatientUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub contact_info: Option<String>,
    #[serde(default)]
    pub allergies: Option<String>,
}

/// Profile changes to a doctor record
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DoctorUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub contact_info: Option<String>,
}

/// Profile changes to a pharmacist record
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PharmacistUpdate {
    #[serde(default)]
    pub name: Option<String>,
}

impl NewPatient {
    /// Checks required fields
    pub fn validate(&self) -> Result<()> {
        require_present("name", &self.name)?;
        validate_credentials(&self.email, &self.password)
    }
}

impl NewDoctor {
    /// Checks required fields
    pub fn validate(&self) -> Result<()> {
        require_present("name", &self.name)?;
        validate_credentials(&self.email, &self.password)
    }
}

impl NewPharmacist {
    /// Checks required fields
    pub fn validate(&self) -> Result<()> {
        require_present("name", &self.name)?;
        validate_credentials(&self.email, &self.password)
    }
}

impl PatientUpdate {
    /// A supplied name must not be blank
    pub fn validate(&self) -> Result<()> {
        validate_name(self.name.as_deref())
    }
}

impl DoctorUpdate {
    pub fn validate(&self) -> Result<()> {
        validate_name(self.name.as_deref())
    }
}

impl PharmacistUpdate {
    pub fn validate(&self) -> Result<()> {
        validate_name(self.name.as_deref())
    }
}

fn validate_name(name: Option<&str>) -> Result<()> {
    match name {
        Some(name) => require_present("name", name),
        None => Ok(()),
    }
}

/// Rejects blank required text fields
pub(crate) fn require_present(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PharmacyError::Validation(format!("{field} is required")));
    }
    Ok(())
}

fn validate_credentials(email: &str, password: &str) -> Result<()> {
    require_present("email", email)?;
    if !email.contains('@') {
        return Err(PharmacyError::Validation(format!(
            "Invalid email address: {email}"
        )));
    }
    if password.len() < 8 {
        return Err(PharmacyError::Validation(
            "password must be at least 8 characters".to_string(),
        ));
    }
    Ok(())
}
