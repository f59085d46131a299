//! # Storefront (Accounts & Payment Confirmation)
//!
//! `storefront` is the backend for a small e-commerce frontend. It owns the
//! account lifecycle (signup, verification, login) and validates payment
//! gateway callbacks.
//!
//! ## Account Lifecycle
//!
//! Accounts are keyed by their lower-cased email address and start out
//! `Unverified`. Each deployment picks one verification strategy:
//!
//! - **Link token:** a random hex token is stored on the account and mailed as an
//!   activation link. Visiting the link verifies the account and clears the token.
//! - **Numeric OTP:** a 6-digit code is mailed; only its Argon2 hash is stored,
//!   keyed by email, and it expires after a configurable TTL (10 minutes by default).
//!
//! Issuing a new artifact always replaces the outstanding one. Login is refused
//! for unverified accounts regardless of the password.
//!
//! ## Payments
//!
//! Orders are created through Razorpay. The payment callback is trusted only if
//! its `HMAC-SHA256(order_id|payment_id)` signature matches, compared in constant time.

pub mod api;
pub mod cli;
pub mod identity;
pub mod notify;
pub mod payment;

#[cfg(test)]
mod test_support;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
