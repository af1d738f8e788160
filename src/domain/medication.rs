//! Medication catalog records

use crate::domain::errors::PharmacyError;
use crate::domain::ids::MedicationName;
use crate::domain::Result;
use serde::{Deserialize, Serialize};

/// A catalog medication with its current stock
///
/// `stock_quantity` is only ever decremented by prescription fulfillment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub id: i64,
    pub name: MedicationName,
    pub description: Option<String>,
    pub dosage_form: Option<String>,
    pub strength: Option<String>,
    pub stock_quantity: i32,
    pub price: Option<f64>,
}

/// Medication creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewMedication {
    pub name: MedicationName,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub dosage_form: Option<String>,
    #[serde(default)]
    pub strength: Option<String>,
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default)]
    pub price: Option<f64>,
}

/// Replacement descriptive fields for a catalog medication
///
/// Stock is not part of the payload; only fulfillment moves it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MedicationUpdate {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub dosage_form: Option<String>,
    #[serde(default)]
    pub strength: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

impl NewMedication {
    /// Rejects negative stock and negative prices
    pub fn validate(&self) -> Result<()> {
        if self.stock_quantity < 0 {
            return Err(PharmacyError::Validation(format!(
                "stock_quantity must be non-negative, got {}",
                self.stock_quantity
            )));
        }
        validate_price(self.price)
    }
}

impl MedicationUpdate {
    pub fn validate(&self) -> Result<()> {
        validate_price(self.price)
    }
}

fn validate_price(price: Option<f64>) -> Result<()> {
    if let Some(price) = price {
        if !price.is_finite() || price < 0.0 {
            return Err(PharmacyError::Validation(format!(
                "price must be a non-negative number, got {price}"
            )));
        }
    }
    Ok(())
}
