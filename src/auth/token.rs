//! Access token issuing and decoding
//!
//! Tokens are HS256 JWTs carrying the account email in `sub` and the role in
//! `user_type`. The role claim decides which credential channel accepts a token.

use crate::config::AuthConfig;
use crate::domain::{Result, Role};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

/// JWT claims of an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account email
    pub sub: String,
    /// Role the token was issued for
    pub user_type: Role,
    pub exp: i64,
    pub iat: i64,
}

/// Response body of the token endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
}

impl AccessToken {
    fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Signs and verifies access tokens with one shared HMAC key
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenIssuer {
    /// Builds an issuer from raw key bytes and a token lifetime
    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            lifetime,
        }
    }

    /// Builds an issuer from the `[auth]` configuration section
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config.jwt_secret.expose_secret().as_bytes(),
            Duration::minutes(config.access_token_expire_minutes),
        )
    }

    /// Issues a bearer token for `email` acting as `role`
    ///
    /// # Errors
    ///
    /// Returns an `Authentication` error if signing fails.
    pub fn issue(&self, email: &str, role: Role) -> Result<AccessToken> {
        let now = Utc::now();
        let claims = Claims {
            sub: email.to_string(),
            user_type: role,
            exp: (now + self.lifetime).timestamp(),
            iat: now.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(AccessToken::bearer(token))
    }

    /// Verifies signature and expiry and returns the claims
    ///
    /// # Errors
    ///
    /// Returns an `Authentication` error for any malformed, forged or expired token.
    pub fn decode(&self, token: &str) -> Result<Claims> {
        Ok(decode::<Claims>(token, &self.decoding_key, &self.validation)?.claims)
    }
}
