//! Shared application state

use crate::adapters::database::traits::PharmacyStore;
use crate::auth::{IdentityResolver, TokenIssuer};
use crate::core::prescription::{Clock, PrescriptionEngine, SystemClock};
use crate::core::Registry;
use std::sync::Arc;

/// Services every handler can reach, cloned per request
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PharmacyStore>,
    pub resolver: IdentityResolver,
    pub engine: PrescriptionEngine,
    pub registry: Registry,
}

impl AppState {
    pub fn new(store: Arc<dyn PharmacyStore>, tokens: TokenIssuer) -> Self {
        Self::with_clock(store, tokens, Arc::new(SystemClock))
    }

    /// Builds the state with an explicit issue-date source
    pub fn with_clock(
        store: Arc<dyn PharmacyStore>,
        tokens: TokenIssuer,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            resolver: IdentityResolver::new(store.clone(), tokens),
            engine: PrescriptionEngine::with_clock(store.clone(), clock),
            registry: Registry::new(store.clone()),
            store,
        }
    }
}
