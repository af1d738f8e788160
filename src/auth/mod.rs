//! Authentication: password hashing, access tokens and identity resolution
//!
//! - [`password`] - Argon2 hashing and verification
//! - [`token`] - HS256 access token issuing and decoding
//! - [`resolver`] - Bearer credentials to acting principal

pub mod password;
pub mod resolver;
pub mod token;

pub use password::{hash_password, verify_password};
pub use resolver::{IdentityResolver, PresentedCredentials, StoredAccount};
pub use token::{AccessToken, Claims, TokenIssuer};
