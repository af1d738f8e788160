//! Lifecycle rules shared by every storage backend
//!
//! Backends call into these functions while holding their locks so the
//! stock arithmetic and ordering rules live in exactly one place.

use crate::domain::{MedicationName, PharmacyError, Prescription, PrescriptionLine, Result};
use std::collections::BTreeMap;

/// Stock levels after a successful fulfillment, keyed by medication name
pub type StockPlan = BTreeMap<MedicationName, i32>;

/// Computes the stock levels a fulfillment would leave behind
///
/// Lines are walked in order and each takes one unit; the first line whose
/// medication has no stock left aborts the whole plan with `OutOfStock`.
/// `stock` must hold the current level of every medication the lines reference.
pub fn plan_fulfillment(lines: &[PrescriptionLine], stock: &StockPlan) -> Result<StockPlan> {
    let mut remaining = StockPlan::new();

    for line in lines {
        let name = &line.medication_name;
        let level = match remaining.get(name) {
            Some(level) => *level,
            None => *stock.get(name).ok_or_else(|| {
                PharmacyError::not_found(format!("Medication {name}"))
            })?,
        };

        if level <= 0 {
            return Err(PharmacyError::OutOfStock {
                medication: name.to_string(),
            });
        }
        remaining.insert(name.clone(), level - 1);
    }

    Ok(remaining)
}

/// Distinct medication names referenced by `lines`, in lock order
pub fn lock_order(lines: &[PrescriptionLine]) -> Vec<MedicationName> {
    let mut names: Vec<MedicationName> = lines
        .iter()
        .map(|line| line.medication_name.clone())
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Sorts by `date_issued` descending, ties broken by id descending
pub fn sort_newest_first(prescriptions: &mut [Prescription]) {
    prescriptions.sort_by(|a, b| {
        b.date_issued
            .cmp(&a.date_issued)
            .then_with(|| b.id.cmp(&a.id))
    });
}
