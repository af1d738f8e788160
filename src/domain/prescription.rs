//! Prescription records, line items and their lifecycle rules
//!
//! A prescription starts `pending` and may move to `fulfilled` exactly once.
//! Fulfilled prescriptions are frozen: their lines, patient and existence can no
//! longer change.

use crate::domain::accounts::require_present;
use crate::domain::errors::PharmacyError;
use crate::domain::ids::{LicenseNumber, MedicationName, Ssn};
use crate::domain::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a prescription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PrescriptionStatus {
    /// Issued by a doctor, awaiting a pharmacist
    #[default]
    Pending,
    /// Dispensed; stock has been deducted
    Fulfilled,
    /// Reserved status; nothing transitions into it
    Cancelled,
}

impl PrescriptionStatus {
    /// Storage and wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PrescriptionStatus::Pending => "pending",
            PrescriptionStatus::Fulfilled => "fulfilled",
            PrescriptionStatus::Cancelled => "cancelled",
        }
    }

    /// The only legal transition is `pending -> fulfilled`
    pub fn can_transition_to(self, next: PrescriptionStatus) -> bool {
        matches!(
            (self, next),
            (PrescriptionStatus::Pending, PrescriptionStatus::Fulfilled)
        )
    }
}

impl fmt::Display for PrescriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrescriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PrescriptionStatus::Pending),
            "fulfilled" => Ok(PrescriptionStatus::Fulfilled),
            "cancelled" => Ok(PrescriptionStatus::Cancelled),
            other => Err(format!("Unknown prescription status: {other}")),
        }
    }
}

/// One medication entry of a prescription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrescriptionLine {
    pub id: i64,
    pub medication_name: MedicationName,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
}

/// A prescription with its owned lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: i64,
    pub patient_ssn: Ssn,
    pub doctor_license: LicenseNumber,
    pub date_issued: NaiveDate,
    pub status: PrescriptionStatus,
    pub medications: Vec<PrescriptionLine>,
}

impl Prescription {
    /// Whether `license` is the prescribing doctor
    pub fn is_authored_by(&self, license: &LicenseNumber) -> bool {
        &self.doctor_license == license
    }

    /// Fails with `Conflict` once the prescription has been fulfilled
    pub fn ensure_mutable(&self) -> Result<()> {
        if self.status == PrescriptionStatus::Fulfilled {
            return Err(PharmacyError::Conflict(format!(
                "Prescription {} is fulfilled and can no longer be modified",
                self.id
            )));
        }
        Ok(())
    }

    /// Moves the prescription to `fulfilled`
    ///
    /// Repeat fulfillment is a `Conflict`; it must never deduct stock twice.
    pub fn mark_fulfilled(&mut self) -> Result<()> {
        if !self.status.can_transition_to(PrescriptionStatus::Fulfilled) {
            return Err(PharmacyError::Conflict(format!(
                "Prescription {} is already {}",
                self.id, self.status
            )));
        }
        self.status = PrescriptionStatus::Fulfilled;
        Ok(())
    }
}

/// A line to be added to a prescription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPrescriptionLine {
    pub medication_name: MedicationName,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
}

impl NewPrescriptionLine {
    /// Free-text fields only need to be present
    pub fn validate(&self) -> Result<()> {
        require_present("dosage", &self.dosage)?;
        require_present("frequency", &self.frequency)?;
        require_present("duration", &self.duration)
    }
}

/// Prescription creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewPrescription {
    pub patient_ssn: Ssn,
    pub doctor_license: LicenseNumber,
    pub medications: Vec<NewPrescriptionLine>,
}

/// A validated prescription ready to be persisted
#[derive(Debug, Clone)]
pub struct PrescriptionDraft {
    pub patient_ssn: Ssn,
    pub doctor_license: LicenseNumber,
    pub date_issued: NaiveDate,
    pub medications: Vec<NewPrescriptionLine>,
}

/// Partial update of a pending prescription
///
/// `status` is deliberately absent; unknown fields are rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrescriptionPatch {
    #[serde(default)]
    pub patient_ssn: Option<Ssn>,
    #[serde(default)]
    pub medications: Option<Vec<NewPrescriptionLine>>,
}

impl PrescriptionPatch {
    /// True when the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.patient_ssn.is_none() && self.medications.is_none()
    }
}

/// Pharmacist-side listing filters, combined with logical AND
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrescriptionFilter {
    pub patient_ssn: Option<Ssn>,
    pub doctor_license: Option<LicenseNumber>,
    pub status: Option<PrescriptionStatus>,
    /// Inclusive lower bound on `date_issued`
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on `date_issued`
    pub end_date: Option<NaiveDate>,
}

impl PrescriptionFilter {
    /// Rejects inverted date ranges
    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(PharmacyError::Validation(format!(
                    "start_date {start} is after end_date {end}"
                )));
            }
        }
        Ok(())
    }

    /// Whether `prescription` satisfies every set filter
    pub fn matches(&self, prescription: &Prescription) -> bool {
        self.patient_ssn
            .as_ref()
            .map_or(true, |ssn| &prescription.patient_ssn == ssn)
            && self
                .doctor_license
                .as_ref()
                .map_or(true, |license| &prescription.doctor_license == license)
            && self.status.map_or(true, |status| prescription.status == status)
            && self
                .start_date
                .map_or(true, |start| prescription.date_issued >= start)
            && self
                .end_date
                .map_or(true, |end| prescription.date_issued <= end)
    }
}

/// Offset/limit window over an ordered listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub skip: u64,
    pub limit: u64,
}

impl Pagination {
    pub const DEFAULT_LIMIT: u64 = 100;
    pub const MAX_LIMIT: u64 = 1000;

    /// Builds a window, applying defaults and rejecting out-of-range limits
    pub fn new(skip: Option<u64>, limit: Option<u64>) -> Result<Self> {
        let limit = limit.unwrap_or(Self::DEFAULT_LIMIT);
        if limit == 0 || limit > Self::MAX_LIMIT {
            return Err(PharmacyError::Validation(format!(
                "limit must be between 1 and {}, got {limit}",
                Self::MAX_LIMIT
            )));
        }
        Ok(Self {
            skip: skip.unwrap_or(0),
            limit,
        })
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// A prescription enriched with display names at read time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrescriptionSummary {
    #[serde(flatten)]
    pub prescription: Prescription,
    pub patient_name: Option<String>,
    pub doctor_name: Option<String>,
}

/// One page of the pharmacist listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrescriptionPage {
    /// Number of prescriptions matching the filter, ignoring pagination
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
    pub items: Vec<PrescriptionSummary>,
}
