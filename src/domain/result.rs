//! Result type alias for the pharmacy backend

use super::errors::PharmacyError;

/// Result type alias for pharmacy operations
///
/// # Examples
///
/// ```
/// use pharmacy::domain::result::Result;
/// use pharmacy::domain::errors::PharmacyError;
///
/// fn failing_function() -> Result<()> {
///     Err(PharmacyError::Validation("dosage is required".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, PharmacyError>;
