//! Token endpoints, one per role

use crate::auth::{AccessToken, StoredAccount};
use crate::domain::{Doctor, Patient, Pharmacist};
use crate::server::error::ApiResult;
use crate::server::extract::Credentials;
use crate::server::state::AppState;
use axum::extract::State;
use axum::Json;

async fn login<A: StoredAccount>(
    state: &AppState,
    Credentials(form): Credentials,
) -> ApiResult<Json<AccessToken>> {
    let token = state
        .resolver
        .login::<A>(&form.username, &form.password)
        .await?;
    Ok(Json(token))
}

pub async fn pharmacist_token(
    State(state): State<AppState>,
    credentials: Credentials,
) -> ApiResult<Json<AccessToken>> {
    login::<Pharmacist>(&state, credentials).await
}

pub async fn doctor_token(
    State(state): State<AppState>,
    credentials: Credentials,
) -> ApiResult<Json<AccessToken>> {
    login::<Doctor>(&state, credentials).await
}

pub async fn patient_token(
    State(state): State<AppState>,
    credentials: Credentials,
) -> ApiResult<Json<AccessToken>> {
    login::<Patient>(&state, credentials).await
}
