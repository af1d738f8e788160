//! Medication catalog endpoints

use crate::domain::{Medication, MedicationName, MedicationUpdate, NewMedication, Pharmacist};
use crate::server::error::ApiResult;
use crate::server::extract::{Authenticated, Current};
use crate::server::state::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

pub async fn create(
    State(state): State<AppState>,
    Current(pharmacist): Current<Pharmacist>,
    payload: Result<Json<NewMedication>, JsonRejection>,
) -> ApiResult<Json<Medication>> {
    let Json(medication) = payload?;
    Ok(Json(state.registry.add_medication(&pharmacist, medication).await?))
}

pub async fn list(
    State(state): State<AppState>,
    _principal: Authenticated,
) -> ApiResult<Json<Vec<Medication>>> {
    Ok(Json(state.registry.list_medications().await?))
}

pub async fn read(
    State(state): State<AppState>,
    _principal: Authenticated,
    name: Result<Path<MedicationName>, PathRejection>,
) -> ApiResult<Json<Medication>> {
    let Path(name) = name?;
    Ok(Json(state.registry.medication(&name).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Current(pharmacist): Current<Pharmacist>,
    name: Result<Path<MedicationName>, PathRejection>,
    payload: Result<Json<MedicationUpdate>, JsonRejection>,
) -> ApiResult<Json<Medication>> {
    let Path(name) = name?;
    let Json(update) = payload?;
    Ok(Json(
        state
            .registry
            .update_medication(&pharmacist, &name, update)
            .await?,
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    Current(pharmacist): Current<Pharmacist>,
    name: Result<Path<MedicationName>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(name) = name?;
    state.registry.delete_medication(&pharmacist, &name).await?;
    Ok(Json(json!({ "message": "Medication deleted successfully" })))
}
