//! Account model and email helpers.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationState {
    Unverified,
    Verified,
}

impl VerificationState {
    #[must_use]
    pub const fn from_verified(verified: bool) -> Self {
        if verified {
            Self::Verified
        } else {
            Self::Unverified
        }
    }

    #[must_use]
    pub const fn is_verified(self) -> bool {
        matches!(self, Self::Verified)
    }
}

/// A registered account, keyed by its normalized email.
#[derive(Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub password_hash: String,
    pub state: VerificationState,
    /// Outstanding activation token (link strategy only).
    pub activation_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        self.state.is_verified()
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("phone", &self.phone)
            .field("password_hash", &"***")
            .field("state", &self.state)
            .field(
                "activation_token",
                &self.activation_token.as_ref().map(|_| "***"),
            )
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Fields required to create an account; the email must already be normalized.
#[derive(Clone)]
pub struct NewAccount {
    pub email: String,
    pub name: String,
    pub phone: String,
    pub password_hash: String,
}

impl NewAccount {
    /// Materialize an unverified account with a fresh id.
    #[must_use]
    pub fn into_account(self) -> Account {
        Account {
            id: Uuid::new_v4(),
            email: self.email,
            name: self.name,
            phone: self.phone,
            password_hash: self.password_hash,
            state: VerificationState::Unverified,
            activation_token: None,
            created_at: Utc::now(),
        }
    }
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("phone", &self.phone)
            .field("password_hash", &"***")
            .finish()
    }
}

/// Normalize an email for lookup/uniqueness checks.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
#[must_use]
pub fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}
