//! Prescription endpoints

use crate::domain::{
    Doctor, LicenseNumber, NewPrescription, Pagination, Patient, Pharmacist, PharmacyError,
    Prescription, PrescriptionFilter, PrescriptionPage, PrescriptionPatch, PrescriptionStatus,
    Result, Ssn,
};
use crate::server::error::ApiResult;
use crate::server::extract::{Authenticated, Current};
use crate::server::state::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fmt::Display;
use std::str::FromStr;

/// Raw query string of `GET /prescriptions/all`
///
/// Values are kept as text so a malformed one is reported as a 422 naming
/// the parameter.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub skip: Option<String>,
    pub limit: Option<String>,
    pub patient_ssn: Option<String>,
    pub doctor_license: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

fn parse_param<T>(name: &str, raw: Option<String>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    raw.map(|value| {
        value.parse::<T>().map_err(|e| {
            PharmacyError::Validation(format!("Invalid value for {name}: {value} ({e})"))
        })
    })
    .transpose()
}

impl ListQuery {
    /// Splits the query into filters and a pagination window
    pub fn into_parts(self) -> Result<(PrescriptionFilter, Pagination)> {
        let page = Pagination::new(
            parse_param::<u64>("skip", self.skip)?,
            parse_param::<u64>("limit", self.limit)?,
        )?;
        let filter = PrescriptionFilter {
            patient_ssn: parse_param::<Ssn>("patient_ssn", self.patient_ssn)?,
            doctor_license: parse_param::<LicenseNumber>("doctor_license", self.doctor_license)?,
            status: parse_param::<PrescriptionStatus>("status", self.status)?,
            start_date: parse_param::<NaiveDate>("start_date", self.start_date)?,
            end_date: parse_param::<NaiveDate>("end_date", self.end_date)?,
        };
        Ok((filter, page))
    }
}

pub async fn create(
    State(state): State<AppState>,
    Current(doctor): Current<Doctor>,
    payload: std::result::Result<Json<NewPrescription>, JsonRejection>,
) -> ApiResult<Json<Prescription>> {
    let Json(request) = payload?;
    Ok(Json(state.engine.create(&doctor, request).await?))
}

pub async fn list_for_doctor(
    State(state): State<AppState>,
    Current(doctor): Current<Doctor>,
) -> ApiResult<Json<Vec<Prescription>>> {
    Ok(Json(state.engine.list_for_doctor(&doctor).await?))
}

pub async fn list_for_patient(
    State(state): State<AppState>,
    Current(patient): Current<Patient>,
) -> ApiResult<Json<Vec<Prescription>>> {
    Ok(Json(state.engine.list_for_patient(&patient).await?))
}

pub async fn list_all(
    State(state): State<AppState>,
    Current(pharmacist): Current<Pharmacist>,
    query: std::result::Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<PrescriptionPage>> {
    let Query(query) = query?;
    let (filter, page) = query.into_parts()?;
    Ok(Json(state.engine.list_all(&pharmacist, &filter, page).await?))
}

pub async fn read(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Prescription>> {
    let Path(id) = id?;
    Ok(Json(state.engine.read(&principal, id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Current(doctor): Current<Doctor>,
    id: std::result::Result<Path<i64>, PathRejection>,
    payload: std::result::Result<Json<PrescriptionPatch>, JsonRejection>,
) -> ApiResult<Json<Prescription>> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    Ok(Json(state.engine.update(&doctor, id, &patch).await?))
}

pub async fn fulfill(
    State(state): State<AppState>,
    Current(pharmacist): Current<Pharmacist>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Prescription>> {
    let Path(id) = id?;
    Ok(Json(state.engine.fulfill(&pharmacist, id).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Current(doctor): Current<Doctor>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    state.engine.delete(&doctor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_uses_defaults() {
        let (filter, page) = ListQuery::default().into_parts().unwrap();
        assert_eq!(filter, PrescriptionFilter::default());
        assert_eq!(page, Pagination::default());
    }

    #[test]
    fn test_query_parses_every_filter() {
        let query = ListQuery {
            skip: Some("10".to_string()),
            limit: Some("5".to_string()),
            patient_ssn: Some("111-11-1111".to_string()),
            doctor_license: Some("D1".to_string()),
            status: Some("fulfilled".to_string()),
            start_date: Some("2026-01-01".to_string()),
            end_date: Some("2026-01-31".to_string()),
        };
        let (filter, page) = query.into_parts().unwrap();
        assert_eq!(page, Pagination { skip: 10, limit: 5 });
        assert_eq!(filter.status, Some(PrescriptionStatus::Fulfilled));
        assert_eq!(filter.end_date, NaiveDate::from_ymd_opt(2026, 1, 31));
    }

    #[test]
    fn test_bad_values_are_validation_errors() {
        let bad_status = ListQuery {
            status: Some("shipped".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            bad_status.into_parts(),
            Err(PharmacyError::Validation(_))
        ));

        let bad_limit = ListQuery {
            limit: Some("5000".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            bad_limit.into_parts(),
            Err(PharmacyError::Validation(_))
        ));
    }
}
