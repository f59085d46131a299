//! Shared state injected into handlers via `Extension`.

use std::sync::Arc;

use super::error::Environment;
use crate::identity::{AuthenticationGate, CredentialStore, PasswordHasher, VerificationEngine};
use crate::payment::{PaymentGateway, PaymentIntegrityChecker};

/// Account lifecycle collaborators.
pub struct AuthState {
    credentials: Arc<dyn CredentialStore>,
    hasher: Arc<dyn PasswordHasher>,
    engine: VerificationEngine,
    gate: AuthenticationGate,
}

impl AuthState {
    #[must_use]
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        hasher: Arc<dyn PasswordHasher>,
        engine: VerificationEngine,
    ) -> Self {
        let gate = AuthenticationGate::new(credentials.clone(), hasher.clone());
        Self {
            credentials,
            hasher,
            engine,
            gate,
        }
    }

    #[must_use]
    pub fn credentials(&self) -> &dyn CredentialStore {
        self.credentials.as_ref()
    }

    #[must_use]
    pub fn hasher(&self) -> &dyn PasswordHasher {
        self.hasher.as_ref()
    }

    #[must_use]
    pub const fn engine(&self) -> &VerificationEngine {
        &self.engine
    }

    #[must_use]
    pub const fn gate(&self) -> &AuthenticationGate {
        &self.gate
    }
}

pub struct PaymentState {
    checker: PaymentIntegrityChecker,
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentState {
    #[must_use]
    pub fn new(checker: PaymentIntegrityChecker, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { checker, gateway }
    }

    #[must_use]
    pub const fn checker(&self) -> &PaymentIntegrityChecker {
        &self.checker
    }

    #[must_use]
    pub fn gateway(&self) -> &dyn PaymentGateway {
        self.gateway.as_ref()
    }
}

/// Everything the router needs, assembled once at startup.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthState>,
    pub payment: Arc<PaymentState>,
    pub environment: Environment,
}
