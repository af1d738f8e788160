//! Argon2 password hashing

use crate::domain::{PharmacyError, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};

/// Hashes a password into an Argon2id PHC string with a fresh random salt
///
/// # Errors
///
/// Returns an `Authentication` error if the hasher fails.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PharmacyError::Authentication(format!("Failed to hash password: {e}")))
}

/// Checks a password against a stored PHC string
///
/// A mismatch and an unparseable stored hash both yield `false`; neither is
/// an error from the caller's point of view.
pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    match PasswordHash::new(hashed_password) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash could not be parsed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("correct-horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct-horse", &hash));
        assert!(!verify_password("wrong-horse", &hash));
    }

    #[test]
    fn test_salts_differ() {
        let first = hash_password("correct-horse").unwrap();
        let second = hash_password("correct-horse").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_garbage_hash_is_not_a_match() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
