//! Signup: validate, create the unverified account, issue its first artifact.

use std::fmt;
use tracing::{info, instrument};

use super::account::{Account, NewAccount, normalize_email, valid_email};
use super::hasher::PasswordHasher;
use super::store::{CredentialStore, StoreError};
use super::verification::{VerificationEngine, VerificationError};

#[derive(Clone, Default)]
pub struct SignupRequest {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("name", &self.name)
            .field("phone", &self.phone)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("missing required fields")]
    MissingFields,
    #[error("invalid email address")]
    InvalidEmail,
    #[error("account already exists")]
    Conflict,
    #[error(transparent)]
    Store(StoreError),
    #[error("cryptographic operation failed: {0:#}")]
    Crypto(anyhow::Error),
    #[error(transparent)]
    Verification(#[from] VerificationError),
}

impl From<StoreError> for RegistrationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => Self::Conflict,
            other => Self::Store(other),
        }
    }
}

/// Create an unverified account and dispatch its first artifact.
///
/// The account is persisted before dispatch. A dispatch failure is returned as
/// `Verification(DispatchFailure)` and the account stays in place, so a resend
/// can recover.
///
/// # Errors
/// `MissingFields` when any field is blank, `InvalidEmail`, `Conflict` when the
/// normalized email is taken.
#[instrument(skip_all)]
pub async fn register(
    credentials: &dyn CredentialStore,
    hasher: &dyn PasswordHasher,
    engine: &VerificationEngine,
    request: SignupRequest,
) -> Result<Account, RegistrationError> {
    let name = request.name.trim();
    let phone = request.phone.trim();
    let email = normalize_email(&request.email);
    if name.is_empty() || phone.is_empty() || email.is_empty() || request.password.is_empty() {
        return Err(RegistrationError::MissingFields);
    }
    if !valid_email(&email) {
        return Err(RegistrationError::InvalidEmail);
    }

    if credentials.find_by_email(&email).await?.is_some() {
        return Err(RegistrationError::Conflict);
    }

    let password_hash = hasher
        .hash(&request.password)
        .map_err(RegistrationError::Crypto)?;
    let account = credentials
        .create(NewAccount {
            email,
            name: name.to_string(),
            phone: phone.to_string(),
            password_hash,
        })
        .await?;
    info!(email = %account.email, "account registered");

    engine.issue(&account).await?;
    Ok(account)
}
