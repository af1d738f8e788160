//! Identity resolution from bearer credentials
//!
//! Three credential channels exist, one per role, evaluated in the order
//! pharmacist, doctor, patient. A channel resolves only when its token decodes,
//! carries the channel's role claim, and names an existing active account.
//! Failures on one channel are discarded and the next channel is tried.

use crate::adapters::database::traits::PharmacyStore;
use crate::auth::password::verify_password;
use crate::auth::token::{AccessToken, TokenIssuer};
use crate::domain::{
    Account, Doctor, Patient, Pharmacist, PharmacyError, Principal, Resolution, Result, Role,
};
use async_trait::async_trait;
use std::sync::Arc;

/// An account kind that can be loaded by login email
#[async_trait]
pub trait StoredAccount: Account + Sized + Send {
    async fn find_by_email(store: &dyn PharmacyStore, email: &str) -> Result<Option<Self>>;
}

#[async_trait]
impl StoredAccount for Patient {
    async fn find_by_email(store: &dyn PharmacyStore, email: &str) -> Result<Option<Self>> {
        store.find_patient_by_email(email).await
    }
}

#[async_trait]
impl StoredAccount for Doctor {
    async fn find_by_email(store: &dyn PharmacyStore, email: &str) -> Result<Option<Self>> {
        store.find_doctor_by_email(email).await
    }
}

#[async_trait]
impl StoredAccount for Pharmacist {
    async fn find_by_email(store: &dyn PharmacyStore, email: &str) -> Result<Option<Self>> {
        store.find_pharmacist_by_email(email).await
    }
}

/// Bearer tokens presented on each channel
#[derive(Debug, Clone, Default)]
pub struct PresentedCredentials {
    pub pharmacist: Option<String>,
    pub doctor: Option<String>,
    pub patient: Option<String>,
}

impl PresentedCredentials {
    /// Feeds one bearer token to every channel
    ///
    /// The token's role claim then selects the single channel that accepts it.
    pub fn from_bearer(token: Option<&str>) -> Self {
        let token = token.map(str::to_string);
        Self {
            pharmacist: token.clone(),
            doctor: token.clone(),
            patient: token,
        }
    }

    /// Channels in evaluation order
    fn channels(&self) -> [(Role, Option<&str>); 3] {
        [
            (Role::Pharmacist, self.pharmacist.as_deref()),
            (Role::Doctor, self.doctor.as_deref()),
            (Role::Patient, self.patient.as_deref()),
        ]
    }
}

/// Turns credentials into acting principals and issues tokens on login
#[derive(Clone)]
pub struct IdentityResolver {
    store: Arc<dyn PharmacyStore>,
    tokens: TokenIssuer,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn PharmacyStore>, tokens: TokenIssuer) -> Self {
        Self { store, tokens }
    }

    /// Resolves the first channel that yields an active principal
    ///
    /// # Errors
    ///
    /// Only storage failures are errors; rejected credentials produce
    /// `Resolution::Unauthenticated`.
    pub async fn resolve_any(&self, credentials: &PresentedCredentials) -> Result<Resolution> {
        for (role, token) in credentials.channels() {
            let Some(token) = token else {
                continue;
            };
            let Ok(claims) = self.tokens.decode(token) else {
                continue;
            };
            if claims.user_type != role {
                continue;
            }

            let principal = match role {
                Role::Pharmacist => self.active_principal::<Pharmacist>(&claims.sub).await?,
                Role::Doctor => self.active_principal::<Doctor>(&claims.sub).await?,
                Role::Patient => self.active_principal::<Patient>(&claims.sub).await?,
            };
            if let Some(principal) = principal {
                tracing::debug!(role = %role, principal_id = principal.id, "Resolved principal");
                return Ok(Resolution::Resolved(principal));
            }
        }

        Ok(Resolution::Unauthenticated)
    }

    /// Resolves the current active account of kind `A`
    ///
    /// # Errors
    ///
    /// `Unauthenticated` when the token is missing, invalid, issued for another
    /// role or names no account; `InactiveAccount` when the account is disabled.
    pub async fn require<A: StoredAccount>(&self, token: Option<&str>) -> Result<A> {
        let token = token.ok_or_else(PharmacyError::unauthenticated)?;
        let claims = self
            .tokens
            .decode(token)
            .map_err(|_| PharmacyError::unauthenticated())?;
        if claims.user_type != A::ROLE {
            return Err(PharmacyError::unauthenticated());
        }

        let account = A::find_by_email(self.store.as_ref(), &claims.sub)
            .await?
            .ok_or_else(PharmacyError::unauthenticated)?;
        if !account.is_active() {
            return Err(PharmacyError::InactiveAccount(format!("Inactive {}", A::ROLE)));
        }
        Ok(account)
    }

    /// Exchanges email and password for an access token of role `A::ROLE`
    ///
    /// # Errors
    ///
    /// `Unauthenticated` for an unknown email or wrong password and
    /// `InactiveAccount` for a disabled account.
    pub async fn login<A: StoredAccount>(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AccessToken> {
        let account = A::find_by_email(self.store.as_ref(), email).await?;
        let account = match account {
            Some(account) if verify_password(password, account.hashed_password()) => account,
            _ => {
                tracing::info!(role = %A::ROLE, "Rejected login attempt");
                return Err(PharmacyError::Unauthenticated(
                    "Incorrect email or password".to_string(),
                ));
            }
        };
        if !account.is_active() {
            return Err(PharmacyError::InactiveAccount(format!(
                "Inactive {} account",
                A::ROLE
            )));
        }

        tracing::info!(
            role = %A::ROLE,
            principal_id = account.principal().id,
            "Issued access token"
        );
        self.tokens.issue(email, A::ROLE)
    }

    async fn active_principal<A: StoredAccount>(&self, email: &str) -> Result<Option<Principal>> {
        Ok(A::find_by_email(self.store.as_ref(), email)
            .await?
            .filter(|account| account.is_active())
            .map(|account| account.principal()))
    }
}
