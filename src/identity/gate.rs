//! Login checks: verification gate first, then credentials.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::account::normalize_email;
use super::hasher::PasswordHasher;
use super::store::{CredentialStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("account not found")]
    AccountNotFound,
    #[error("account is not verified")]
    AccountUnverified,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("cryptographic operation failed: {0:#}")]
    Crypto(anyhow::Error),
}

/// Successful login confirmation. No session is created.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Authorized {
    pub email: String,
    pub name: String,
}

pub struct AuthenticationGate {
    credentials: Arc<dyn CredentialStore>,
    hasher: Arc<dyn PasswordHasher>,
}

impl AuthenticationGate {
    #[must_use]
    pub fn new(credentials: Arc<dyn CredentialStore>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            credentials,
            hasher,
        }
    }

    /// Refuse unverified accounts, then check the password.
    ///
    /// Unverified accounts get `AccountUnverified` whatever password is presented.
    ///
    /// # Errors
    /// See [`AuthError`].
    #[instrument(skip_all)]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Authorized, AuthError> {
        let email = normalize_email(email);
        let Some(account) = self.credentials.find_by_email(&email).await? else {
            debug!("login for unknown account");
            return Err(AuthError::AccountNotFound);
        };

        if !account.is_verified() {
            return Err(AuthError::AccountUnverified);
        }

        let matches = self
            .hasher
            .verify(password, &account.password_hash)
            .map_err(AuthError::Crypto)?;
        if !matches {
            debug!(email = %email, "password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(Authorized {
            email: account.email,
            name: account.name,
        })
    }
}
