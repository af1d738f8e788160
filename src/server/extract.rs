//! Request extractors for the acting principal and login credentials

use crate::auth::{PresentedCredentials, StoredAccount};
use crate::domain::{PharmacyError, Principal, Resolution};
use crate::server::error::ApiError;
use crate::server::state::AppState;
use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::{Form, Json};
use serde::Deserialize;

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// The current active account of one role
///
/// Rejects with 401 for a missing, invalid or foreign-role token and 400 for
/// an inactive account.
pub struct Current<A>(pub A);

#[async_trait]
impl<A> FromRequestParts<AppState> for Current<A>
where
    A: StoredAccount + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let account = state
            .resolver
            .require::<A>(bearer_token(&parts.headers))
            .await?;
        Ok(Self(account))
    }
}

/// Any active principal, whichever role's channel accepts the token
pub struct Authenticated(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let credentials = PresentedCredentials::from_bearer(bearer_token(&parts.headers));
        match state.resolver.resolve_any(&credentials).await? {
            Resolution::Resolved(principal) => Ok(Self(principal)),
            Resolution::Unauthenticated => Err(ApiError(PharmacyError::unauthenticated())),
        }
    }
}

/// Email and password posted to a token endpoint
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Account email
    pub username: String,
    pub password: String,
}

/// Accepts the login form either URL-encoded or as JSON
pub struct Credentials(pub LoginForm);

#[async_trait]
impl<S> FromRequest<S> for Credentials
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        if is_json {
            let Json(form) = Json::<LoginForm>::from_request(req, state).await?;
            Ok(Self(form))
        } else {
            let Form(form) = Form::<LoginForm>::from_request(req, state).await?;
            Ok(Self(form))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use test_case::test_case;

    #[test_case("Bearer abc", Some("abc"))]
    #[test_case("bearer abc", Some("abc"))]
    #[test_case("Basic abc", None)]
    #[test_case("Bearer ", None)]
    #[test_case("abc", None)]
    fn test_bearer_token(header: &str, expected: Option<&str>) {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(header).unwrap());
        assert_eq!(bearer_token(&headers), expected);
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
