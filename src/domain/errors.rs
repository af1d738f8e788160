//! Domain error types
//!
//! This module defines the error hierarchy for the pharmacy backend.
//! Client-facing variants carry the exact message returned to API callers;
//! infrastructure variants are logged and surfaced as internal failures.

use thiserror::Error;

/// Main pharmacy error type
///
/// Every fallible operation in the crate returns this type. The HTTP layer maps
/// each variant to a status code in [`crate::server::error`].
#[derive(Debug, Error)]
pub enum PharmacyError {
    /// A referenced patient, doctor, pharmacist, medication or prescription is absent
    #[error("{0}")]
    NotFound(String),

    /// No valid credential was presented for the required channel(s)
    #[error("{0}")]
    Unauthenticated(String),

    /// The credential resolved to an account that has been deactivated
    #[error("{0}")]
    InactiveAccount(String),

    /// The principal is authenticated but has no rights over the target
    #[error("{0}")]
    Forbidden(String),

    /// The target exists but the requested transition is illegal in its current state
    #[error("{0}")]
    Conflict(String),

    /// Fulfillment blocked because a line's medication has no stock left
    #[error("{medication} out of stock")]
    OutOfStock { medication: String },

    /// A natural key (SSN, license number, email, medication name) is already taken
    #[error("{0}")]
    AlreadyExists(String),

    /// Request payload or query parameters failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Storage backend errors
    #[error("Database error: {0}")]
    Database(String),

    /// Token or password-hash machinery failed (not a rejected credential)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl PharmacyError {
    /// Builds the canonical "<entity> not found" error
    pub fn not_found(entity: impl AsRef<str>) -> Self {
        PharmacyError::NotFound(format!("{} not found", entity.as_ref()))
    }

    /// Builds the canonical 401 error
    pub fn unauthenticated() -> Self {
        PharmacyError::Unauthenticated("Could not validate credentials".to_string())
    }

    /// Returns true for variants whose message is safe to show to API callers
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PharmacyError::NotFound(_)
                | PharmacyError::Unauthenticated(_)
                | PharmacyError::InactiveAccount(_)
                | PharmacyError::Forbidden(_)
                | PharmacyError::Conflict(_)
                | PharmacyError::OutOfStock { .. }
                | PharmacyError::AlreadyExists(_)
                | PharmacyError::Validation(_)
        )
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for PharmacyError {
    fn from(err: std::io::Error) -> Self {
        PharmacyError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for PharmacyError {
    fn from(err: serde_json::Error) -> Self {
        PharmacyError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for PharmacyError {
    fn from(err: toml::de::Error) -> Self {
        PharmacyError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<tokio_postgres::Error> for PharmacyError {
    fn from(err: tokio_postgres::Error) -> Self {
        PharmacyError::Database(err.to_string())
    }
}

impl From<deadpool_postgres::PoolError> for PharmacyError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        PharmacyError::Database(format!("Failed to get connection from pool: {err}"))
    }
}

impl From<jsonwebtoken::errors::Error> for PharmacyError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        PharmacyError::Authentication(format!("JWT error: {err}"))
    }
}
