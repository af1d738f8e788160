//! HTTP error mapping
//!
//! Every handler error becomes `{"detail": "<message>"}`. Client errors keep
//! their message; infrastructure failures are logged and replaced by a
//! generic body so no internals leak to callers.

use crate::domain::PharmacyError;
use axum::extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Handler error carrying a domain error to the response
#[derive(Debug)]
pub struct ApiError(pub PharmacyError);

/// Result alias for handlers
pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Status code for the wrapped error
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            PharmacyError::NotFound(_) => StatusCode::NOT_FOUND,
            PharmacyError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            PharmacyError::Forbidden(_) => StatusCode::FORBIDDEN,
            PharmacyError::InactiveAccount(_)
            | PharmacyError::Conflict(_)
            | PharmacyError::OutOfStock { .. }
            | PharmacyError::AlreadyExists(_) => StatusCode::BAD_REQUEST,
            PharmacyError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PharmacyError> for ApiError {
    fn from(err: PharmacyError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(PharmacyError::Validation(rejection.body_text()))
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        Self(PharmacyError::Validation(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(PharmacyError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(PharmacyError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = if self.0.is_client_error() {
            self.0.to_string()
        } else {
            tracing::error!(error = %self.0, "Request failed");
            "Internal server error".to_string()
        };

        let mut response = (status, Json(json!({ "detail": detail }))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(PharmacyError::not_found("Patient"), StatusCode::NOT_FOUND)]
    #[test_case(PharmacyError::unauthenticated(), StatusCode::UNAUTHORIZED)]
    #[test_case(PharmacyError::InactiveAccount("Inactive doctor".into()), StatusCode::BAD_REQUEST)]
    #[test_case(PharmacyError::Forbidden("no".into()), StatusCode::FORBIDDEN)]
    #[test_case(PharmacyError::Conflict("fulfilled".into()), StatusCode::BAD_REQUEST)]
    #[test_case(PharmacyError::OutOfStock { medication: "A".into() }, StatusCode::BAD_REQUEST)]
    #[test_case(PharmacyError::AlreadyExists("taken".into()), StatusCode::BAD_REQUEST)]
    #[test_case(PharmacyError::Validation("blank".into()), StatusCode::UNPROCESSABLE_ENTITY)]
    #[test_case(PharmacyError::Database("down".into()), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_status_mapping(err: PharmacyError, expected: StatusCode) {
        assert_eq!(ApiError(err).into_response().status(), expected);
    }

    #[test]
    fn test_unauthorized_carries_challenge() {
        let response = ApiError(PharmacyError::unauthenticated()).into_response();
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }
}
