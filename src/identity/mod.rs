//! Account identity, credential storage and the verification lifecycle.
//!
//! The pieces are wired together at startup and shared behind `Arc`:
//!
//! - [`CredentialStore`] and [`VerificationRecordStore`] persist accounts and
//!   outstanding OTP records. Both provide atomic read-modify-write per email.
//! - [`VerificationEngine`] issues, re-issues and consumes verification artifacts.
//! - [`AuthenticationGate`] checks credentials and verification status for login.
//! - [`PasswordHasher`] is the single one-way hash used for passwords and OTPs.

pub mod account;
pub mod gate;
pub mod hasher;
pub mod memory;
pub mod postgres;
pub mod registration;
pub mod store;
pub mod verification;

pub use account::{Account, NewAccount, VerificationState, normalize_email, valid_email};
pub use gate::{AuthError, AuthenticationGate, Authorized};
pub use hasher::{Argon2Hasher, PasswordHasher};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use registration::{RegistrationError, SignupRequest, register};
pub use store::{CredentialStore, OtpRecord, StoreError, VerificationRecordStore};
pub use verification::{
    ArtifactClaim, DEFAULT_OTP_TTL_SECONDS, MAX_OTP_TTL_SECONDS, VerificationEngine,
    VerificationError, VerificationStrategy,
};
