//! Route handlers

pub mod accounts;
pub mod auth;
pub mod medications;
pub mod prescriptions;

use crate::server::error::ApiResult;
use crate::server::state::AppState;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the Pharmacy" }))
}

/// Reports whether the store answers
pub async fn health(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state.store.ping().await?;
    Ok(Json(json!({
        "status": "ok",
        "backend": state.store.backend_name(),
    })))
}
