//! Storage traits for accounts and OTP records.
//!
//! Implementations must make every method atomic per email. In particular
//! `upsert_otp` leaves at most one live record per account, and `consume_otp`
//! deletes the record and marks the account verified in one step.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::account::{Account, NewAccount};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("account already exists")]
    Conflict,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Hashed one-time code awaiting consumption.
#[derive(Clone)]
pub struct OtpRecord {
    pub email: String,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
}

impl OtpRecord {
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

impl std::fmt::Debug for OtpRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtpRecord")
            .field("email", &self.email)
            .field("code_hash", &"***")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    /// Insert a new unverified account. Returns [`StoreError::Conflict`] when
    /// the email is already registered.
    async fn create(&self, account: NewAccount) -> Result<Account, StoreError>;

    /// Replace the activation token of an unverified account.
    ///
    /// Returns `false` when no unverified account exists for `email`.
    async fn set_activation_token(&self, email: &str, token: &str) -> Result<bool, StoreError>;

    /// Mark the account holding `token` verified and clear the token.
    async fn activate_by_token(&self, token: &str) -> Result<Option<Account>, StoreError>;

    /// Cheap liveness probe for `/health`.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait VerificationRecordStore: Send + Sync {
    /// Create or replace the OTP record for `record.email`.
    async fn upsert_otp(&self, record: OtpRecord) -> Result<(), StoreError>;

    async fn find_otp(&self, email: &str) -> Result<Option<OtpRecord>, StoreError>;

    /// Delete the record only if it still carries `code_hash`.
    async fn delete_otp(&self, email: &str, code_hash: &str) -> Result<bool, StoreError>;

    /// Delete the record carrying `code_hash` and mark the account verified.
    ///
    /// Returns `false` (and changes nothing) when the record was replaced or
    /// removed since it was read.
    async fn consume_otp(&self, email: &str, code_hash: &str) -> Result<bool, StoreError>;
}
