//! HTTP surface
//!
//! Routes are registered flat with their full paths so a trailing slash is
//! never ambiguous. Every handler reaches the domain through [`AppState`];
//! failures leave through [`error::ApiError`] as `{"detail": ...}` bodies.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use crate::config::ServerConfig;
use crate::domain::{PharmacyError, Result};
use axum::http::HeaderValue;
use axum::routing::{get, patch, post};
use axum::Router;
use handlers::{accounts, auth, medications, prescriptions};
use tokio::sync::watch;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Assemble every route with tracing and CORS applied
pub fn build_router(state: AppState, cors_allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Tokens
        .route("/auth/token", post(auth::pharmacist_token))
        .route("/auth/doctor-token", post(auth::doctor_token))
        .route("/auth/patient-token", post(auth::patient_token))
        // Patients
        .route(
            "/patients/",
            post(accounts::register_patient).get(accounts::list_patients),
        )
        .route("/patients/me", get(accounts::current_patient))
        .route("/patients/doctor", get(accounts::list_patients_for_doctor))
        .route(
            "/patients/:ssn",
            get(accounts::read_patient)
                .patch(accounts::update_patient)
                .delete(accounts::delete_patient),
        )
        // Doctors
        .route(
            "/doctors/",
            post(accounts::register_doctor).get(accounts::list_doctors),
        )
        .route("/doctors/me", get(accounts::current_doctor))
        .route(
            "/doctors/by-license/:license",
            get(accounts::doctor_by_license),
        )
        .route(
            "/doctors/:license",
            patch(accounts::update_doctor).delete(accounts::delete_doctor),
        )
        // Pharmacists
        .route(
            "/pharmacists/",
            post(accounts::register_pharmacist).get(accounts::list_pharmacists),
        )
        .route("/pharmacists/me", get(accounts::current_pharmacist))
        .route(
            "/pharmacists/by-license/:license",
            get(accounts::read_pharmacist),
        )
        .route(
            "/pharmacists/:license",
            get(accounts::read_pharmacist)
                .patch(accounts::update_pharmacist)
                .delete(accounts::delete_pharmacist),
        )
        // Medications
        .route(
            "/medications/",
            post(medications::create).get(medications::list),
        )
        .route(
            "/medications/:name",
            get(medications::read)
                .put(medications::update)
                .delete(medications::delete),
        )
        // Prescriptions
        .route("/prescriptions/", post(prescriptions::create))
        .route("/prescriptions/doctor", get(prescriptions::list_for_doctor))
        .route("/prescriptions/patient", get(prescriptions::list_for_patient))
        .route("/prescriptions/all", get(prescriptions::list_all))
        .route(
            "/prescriptions/:id",
            get(prescriptions::read)
                .patch(prescriptions::update)
                .delete(prescriptions::delete),
        )
        .route("/prescriptions/:id/fulfill", patch(prescriptions::fulfill))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_allowed_origins))
        .with_state(state)
}

/// CORS policy for the configured origins
///
/// `"*"` allows any origin. Unparseable origins are skipped with a warning.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Bind and serve until the shutdown signal flips to `true`
///
/// # Errors
///
/// `Io` if the address cannot be bound or the server stops abnormally.
pub async fn serve(
    state: AppState,
    config: &ServerConfig,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| PharmacyError::Io(format!("Failed to bind {address}: {e}")))?;

    tracing::info!(
        address = %address,
        backend = state.store.backend_name(),
        "Listening for requests"
    );

    let router = build_router(state, &config.cors_allowed_origins);
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            while !*shutdown.borrow() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
            tracing::info!("Draining in-flight requests");
        })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::auth::TokenIssuer;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use chrono::Duration;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn router(origins: &[String]) -> Router {
        let state = AppState::new(
            Arc::new(MemoryStore::new()),
            TokenIssuer::new(b"router-test-secret", Duration::minutes(5)),
        );
        build_router(state, origins)
    }

    #[tokio::test]
    async fn test_root_route() {
        let response = router(&[])
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let response = router(&[])
            .oneshot(Request::get("/nowhere").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_allows_listed_origin() {
        let origins = vec!["http://localhost:3000".to_string()];
        let request = Request::get("/")
            .header(header::ORIGIN, "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let response = router(&origins).oneshot(request).await.unwrap();
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:3000"
        );
    }

    #[tokio::test]
    async fn test_cors_omits_header_for_unlisted_origin() {
        let request = Request::get("/")
            .header(header::ORIGIN, "http://evil.example")
            .body(Body::empty())
            .unwrap();
        let response = router(&[]).oneshot(request).await.unwrap();
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }
}
