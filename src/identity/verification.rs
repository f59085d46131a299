//! Verification engine: issues, re-issues and consumes verification artifacts.
//!
//! Two strategies exist and a deployment runs exactly one of them:
//!
//! - `LinkToken`: 32 random bytes, hex encoded, stored inline on the account and
//!   mailed as `{frontend}/activate/{token}`. No expiry; single use.
//! - `NumericOtp`: a random 6-digit code, stored only as an Argon2 hash keyed by
//!   email with an explicit expiry. Upserted, so at most one code is live.
//!
//! Issuing persists the artifact before dispatching it. When dispatch fails the
//! artifact stays in place and a resend replaces it.

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use rand::{Rng, RngCore, rngs::OsRng};
use std::{str::FromStr, sync::Arc};
use tracing::{debug, error, info, instrument, warn};

use super::account::{Account, VerificationState, normalize_email};
use super::hasher::PasswordHasher;
use super::store::{CredentialStore, OtpRecord, StoreError, VerificationRecordStore};
use crate::notify::{Notification, Notifier};

pub const DEFAULT_OTP_TTL_SECONDS: i64 = 10 * 60;
pub const MAX_OTP_TTL_SECONDS: i64 = 24 * 60 * 60;
const ACTIVATION_TOKEN_BYTES: usize = 32;
const OTP_LOWER: u32 = 100_000;
const OTP_UPPER: u32 = 1_000_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerificationStrategy {
    LinkToken,
    NumericOtp,
}

impl VerificationStrategy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LinkToken => "link",
            Self::NumericOtp => "otp",
        }
    }
}

impl FromStr for VerificationStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "link" | "link-token" | "token" => Ok(Self::LinkToken),
            "otp" | "numeric-otp" => Ok(Self::NumericOtp),
            other => Err(format!("unknown verification strategy: {other}")),
        }
    }
}

/// What the user presents to prove control of the mailbox.
#[derive(Clone, Copy, Debug)]
pub enum ArtifactClaim<'a> {
    /// Token from an activation link; the account is resolved by the token.
    Link { token: &'a str },
    Otp { email: &'a str, code: &'a str },
}

#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("account not found")]
    NotFound,
    #[error("account already verified")]
    AlreadyVerified,
    #[error("no outstanding verification artifact")]
    ArtifactMissing,
    #[error("verification artifact expired")]
    ArtifactExpired,
    #[error("verification artifact does not match")]
    ArtifactMismatch,
    #[error("{0} verification is not enabled")]
    UnsupportedStrategy(&'static str),
    #[error("failed to deliver verification email: {0:#}")]
    DispatchFailure(anyhow::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("cryptographic operation failed: {0:#}")]
    Crypto(anyhow::Error),
}

pub struct VerificationEngine {
    strategy: VerificationStrategy,
    credentials: Arc<dyn CredentialStore>,
    records: Arc<dyn VerificationRecordStore>,
    hasher: Arc<dyn PasswordHasher>,
    notifier: Arc<dyn Notifier>,
    frontend_base_url: String,
    otp_ttl_seconds: i64,
}

impl VerificationEngine {
    #[must_use]
    pub fn new(
        strategy: VerificationStrategy,
        credentials: Arc<dyn CredentialStore>,
        records: Arc<dyn VerificationRecordStore>,
        hasher: Arc<dyn PasswordHasher>,
        notifier: Arc<dyn Notifier>,
        frontend_base_url: String,
    ) -> Self {
        Self {
            strategy,
            credentials,
            records,
            hasher,
            notifier,
            frontend_base_url,
            otp_ttl_seconds: DEFAULT_OTP_TTL_SECONDS,
        }
    }

    /// OTP lifetime, clamped to `1..=MAX_OTP_TTL_SECONDS`.
    #[must_use]
    pub fn with_otp_ttl_seconds(mut self, seconds: i64) -> Self {
        self.otp_ttl_seconds = seconds.clamp(1, MAX_OTP_TTL_SECONDS);
        self
    }

    #[must_use]
    pub const fn strategy(&self) -> VerificationStrategy {
        self.strategy
    }

    #[must_use]
    pub fn otp_ttl_seconds(&self) -> i64 {
        self.otp_ttl_seconds
    }

    /// Where the browser lands after a successful link activation.
    #[must_use]
    pub fn activation_redirect_url(&self) -> String {
        let base = self.frontend_base_url.trim_end_matches('/');
        format!("{base}/login?activated=true")
    }

    /// Generate, persist and dispatch a fresh artifact for `account`.
    ///
    /// Any outstanding artifact is replaced. The account stays unverified.
    ///
    /// # Errors
    /// `AlreadyVerified` for verified accounts, `NotFound` if the account
    /// vanished, `DispatchFailure` if the email could not be delivered (the
    /// artifact remains persisted).
    #[instrument(skip_all, fields(email = %account.email, strategy = self.strategy.as_str()))]
    pub async fn issue(&self, account: &Account) -> Result<(), VerificationError> {
        if account.is_verified() {
            return Err(VerificationError::AlreadyVerified);
        }

        let notification = match self.strategy {
            VerificationStrategy::LinkToken => {
                let token = generate_activation_token().map_err(VerificationError::Crypto)?;
                if !self
                    .credentials
                    .set_activation_token(&account.email, &token)
                    .await?
                {
                    return Err(VerificationError::NotFound);
                }
                let url = build_activation_url(&self.frontend_base_url, &token);
                Notification::activation(&account.email, &account.name, &url)
            }
            VerificationStrategy::NumericOtp => {
                let expires_at = otp_expiry(Utc::now(), self.otp_ttl_seconds)
                    .map_err(VerificationError::Crypto)?;
                let code = generate_otp();
                let code_hash = self
                    .hasher
                    .hash(&code)
                    .map_err(VerificationError::Crypto)?;
                self.records
                    .upsert_otp(OtpRecord {
                        email: account.email.clone(),
                        code_hash,
                        expires_at,
                    })
                    .await?;
                Notification::otp(&account.email, &account.name, &code, self.otp_ttl_seconds)
            }
        };

        if let Err(err) = self.notifier.send(&notification).await {
            error!("Failed to dispatch verification artifact: {err:#}");
            return Err(VerificationError::DispatchFailure(err));
        }

        info!("verification artifact issued");
        Ok(())
    }

    /// Re-issue an artifact for an existing, unverified account.
    ///
    /// # Errors
    /// `NotFound` for unknown emails, `AlreadyVerified` for verified accounts,
    /// plus everything [`VerificationEngine::issue`] returns.
    pub async fn resend(&self, email: &str) -> Result<(), VerificationError> {
        let email = normalize_email(email);
        let account = self
            .credentials
            .find_by_email(&email)
            .await?
            .ok_or(VerificationError::NotFound)?;
        self.issue(&account).await
    }

    /// Consume a presented artifact, verifying the owning account.
    ///
    /// On success the account is verified and the artifact is gone, in one
    /// atomic store operation. Returns the verified email.
    ///
    /// # Errors
    /// `ArtifactMissing` when nothing is outstanding (never issued, already
    /// consumed, or replaced concurrently), `ArtifactExpired` for a stale OTP,
    /// `ArtifactMismatch` for a wrong OTP, `UnsupportedStrategy` when the claim
    /// does not match the configured strategy.
    #[instrument(skip_all, fields(strategy = self.strategy.as_str()))]
    pub async fn consume(&self, claim: ArtifactClaim<'_>) -> Result<String, VerificationError> {
        match (self.strategy, claim) {
            (VerificationStrategy::LinkToken, ArtifactClaim::Link { token }) => {
                self.consume_link(token).await
            }
            (VerificationStrategy::NumericOtp, ArtifactClaim::Otp { email, code }) => {
                self.consume_otp(email, code).await
            }
            (VerificationStrategy::LinkToken, ArtifactClaim::Otp { .. }) => {
                Err(VerificationError::UnsupportedStrategy("otp"))
            }
            (VerificationStrategy::NumericOtp, ArtifactClaim::Link { .. }) => {
                Err(VerificationError::UnsupportedStrategy("link"))
            }
        }
    }

    async fn consume_link(&self, token: &str) -> Result<String, VerificationError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(VerificationError::ArtifactMissing);
        }

        match self.credentials.activate_by_token(token).await? {
            Some(account) => {
                info!(email = %account.email, "account activated");
                Ok(account.email)
            }
            None => {
                debug!("activation token not found");
                Err(VerificationError::ArtifactMissing)
            }
        }
    }

    async fn consume_otp(&self, email: &str, code: &str) -> Result<String, VerificationError> {
        let email = normalize_email(email);
        let record = self
            .records
            .find_otp(&email)
            .await?
            .ok_or(VerificationError::ArtifactMissing)?;

        // Expiry is checked before the code so stale codes never verify.
        if record.is_expired_at(Utc::now()) {
            self.records.delete_otp(&email, &record.code_hash).await?;
            debug!(email = %email, "expired otp purged");
            return Err(VerificationError::ArtifactExpired);
        }

        let code = code.trim();
        if !is_otp_format(code)
            || !self
                .hasher
                .verify(code, &record.code_hash)
                .map_err(VerificationError::Crypto)?
        {
            warn!(email = %email, "otp mismatch");
            return Err(VerificationError::ArtifactMismatch);
        }

        if !self.records.consume_otp(&email, &record.code_hash).await? {
            // Replaced or consumed between read and delete.
            return Err(VerificationError::ArtifactMissing);
        }

        info!(email = %email, "account verified with otp");
        Ok(email)
    }

    /// Current verification state for an email.
    ///
    /// # Errors
    /// `NotFound` for unknown emails.
    pub async fn status(&self, email: &str) -> Result<VerificationState, VerificationError> {
        let email = normalize_email(email);
        let account = self
            .credentials
            .find_by_email(&email)
            .await?
            .ok_or(VerificationError::NotFound)?;
        Ok(account.state)
    }
}

fn otp_expiry(now: DateTime<Utc>, ttl_seconds: i64) -> anyhow::Result<DateTime<Utc>> {
    Duration::try_seconds(ttl_seconds)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .with_context(|| format!("otp lifetime of {ttl_seconds}s is out of range"))
}

/// Random activation token for email links (hex, 64 chars).
pub(crate) fn generate_activation_token() -> anyhow::Result<String> {
    let mut bytes = [0u8; ACTIVATION_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate activation token")?;
    Ok(hex::encode(bytes))
}

/// Random 6-digit code; never starts with zero.
pub(crate) fn generate_otp() -> String {
    OsRng.gen_range(OTP_LOWER..OTP_UPPER).to_string()
}

fn is_otp_format(code: &str) -> bool {
    code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit())
}

/// Build the frontend activation link included in outbound emails.
pub(crate) fn build_activation_url(frontend_base_url: &str, token: &str) -> String {
    let base = frontend_base_url.trim_end_matches('/');
    format!("{base}/activate/{token}")
}
