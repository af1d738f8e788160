//! Patient, doctor and pharmacist account endpoints

use crate::domain::{
    Doctor, DoctorUpdate, LicenseNumber, NewDoctor, NewPatient, NewPharmacist, Patient,
    PatientUpdate, Pharmacist, PharmacistUpdate, Ssn,
};
use crate::server::error::ApiResult;
use crate::server::extract::{Authenticated, Current};
use crate::server::state::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

pub async fn register_patient(
    State(state): State<AppState>,
    payload: Result<Json<NewPatient>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Patient>)> {
    let Json(patient) = payload?;
    let created = state.registry.register_patient(patient).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_patients(
    State(state): State<AppState>,
    Current(pharmacist): Current<Pharmacist>,
) -> ApiResult<Json<Vec<Patient>>> {
    Ok(Json(state.registry.list_patients(&pharmacist).await?))
}

pub async fn current_patient(Current(patient): Current<Patient>) -> Json<Patient> {
    Json(patient)
}

pub async fn list_patients_for_doctor(
    State(state): State<AppState>,
    Current(doctor): Current<Doctor>,
) -> ApiResult<Json<Vec<Patient>>> {
    Ok(Json(state.registry.list_patients_for_doctor(&doctor).await?))
}

pub async fn read_patient(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ssn: Result<Path<Ssn>, PathRejection>,
) -> ApiResult<Json<Patient>> {
    let Path(ssn) = ssn?;
    Ok(Json(state.registry.patient(&principal, &ssn).await?))
}

pub async fn update_patient(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ssn: Result<Path<Ssn>, PathRejection>,
    payload: Result<Json<PatientUpdate>, JsonRejection>,
) -> ApiResult<Json<Patient>> {
    let Path(ssn) = ssn?;
    let Json(update) = payload?;
    Ok(Json(
        state.registry.update_patient(&principal, &ssn, update).await?,
    ))
}

pub async fn delete_patient(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    ssn: Result<Path<Ssn>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(ssn) = ssn?;
    state.registry.delete_patient(&principal, &ssn).await?;
    Ok(Json(json!({ "message": "Patient deleted successfully" })))
}

pub async fn register_doctor(
    State(state): State<AppState>,
    payload: Result<Json<NewDoctor>, JsonRejection>,
) -> ApiResult<Json<Doctor>> {
    let Json(doctor) = payload?;
    Ok(Json(state.registry.register_doctor(doctor).await?))
}

pub async fn list_doctors(State(state): State<AppState>) -> ApiResult<Json<Vec<Doctor>>> {
    Ok(Json(state.registry.list_doctors().await?))
}

pub async fn doctor_by_license(
    State(state): State<AppState>,
    license: Result<Path<LicenseNumber>, PathRejection>,
) -> ApiResult<Json<Doctor>> {
    let Path(license) = license?;
    Ok(Json(state.registry.doctor(&license).await?))
}

pub async fn current_doctor(Current(doctor): Current<Doctor>) -> Json<Doctor> {
    Json(doctor)
}

pub async fn update_doctor(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    license: Result<Path<LicenseNumber>, PathRejection>,
    payload: Result<Json<DoctorUpdate>, JsonRejection>,
) -> ApiResult<Json<Doctor>> {
    let Path(license) = license?;
    let Json(update) = payload?;
    Ok(Json(
        state
            .registry
            .update_doctor(&principal, &license, update)
            .await?,
    ))
}

pub async fn delete_doctor(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    license: Result<Path<LicenseNumber>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(license) = license?;
    state.registry.delete_doctor(&principal, &license).await?;
    Ok(Json(json!({ "message": "Doctor deleted successfully" })))
}

pub async fn register_pharmacist(
    State(state): State<AppState>,
    payload: Result<Json<NewPharmacist>, JsonRejection>,
) -> ApiResult<Json<Pharmacist>> {
    let Json(pharmacist) = payload?;
    Ok(Json(state.registry.register_pharmacist(pharmacist).await?))
}

pub async fn current_pharmacist(Current(pharmacist): Current<Pharmacist>) -> Json<Pharmacist> {
    Json(pharmacist)
}

pub async fn list_pharmacists(
    State(state): State<AppState>,
    Current(pharmacist): Current<Pharmacist>,
) -> ApiResult<Json<Vec<Pharmacist>>> {
    Ok(Json(state.registry.list_pharmacists(&pharmacist).await?))
}

pub async fn read_pharmacist(
    State(state): State<AppState>,
    Current(pharmacist): Current<Pharmacist>,
    license: Result<Path<LicenseNumber>, PathRejection>,
) -> ApiResult<Json<Pharmacist>> {
    let Path(license) = license?;
    Ok(Json(state.registry.pharmacist(&pharmacist, &license).await?))
}

pub async fn update_pharmacist(
    State(state): State<AppState>,
    Current(pharmacist): Current<Pharmacist>,
    license: Result<Path<LicenseNumber>, PathRejection>,
    payload: Result<Json<PharmacistUpdate>, JsonRejection>,
) -> ApiResult<Json<Pharmacist>> {
    let Path(license) = license?;
    let Json(update) = payload?;
    Ok(Json(
        state
            .registry
            .update_pharmacist(&pharmacist, &license, update)
            .await?,
    ))
}

pub async fn delete_pharmacist(
    State(state): State<AppState>,
    Current(pharmacist): Current<Pharmacist>,
    license: Result<Path<LicenseNumber>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(license) = license?;
    state.registry.delete_pharmacist(&pharmacist, &license).await?;
    Ok(Json(json!({ "message": "Pharmacist deleted successfully" })))
}
