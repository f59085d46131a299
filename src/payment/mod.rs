//! Payment order creation and callback verification.
//!
//! Orders are created through a [`PaymentGateway`]; confirmation callbacks are
//! trusted only after [`PaymentIntegrityChecker::verify_callback`] succeeds.
//! Nothing here persists payment state.

pub mod amount;
pub mod gateway;
pub mod signature;

pub use amount::to_paise;
pub use gateway::{DEFAULT_RAZORPAY_API_URL, OrderRequest, PaymentGateway, RazorpayGateway};
pub use signature::PaymentIntegrityChecker;

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("missing payment details")]
    MissingFields,
    #[error("payment signature mismatch")]
    SignatureMismatch,
    #[error("invalid amount")]
    InvalidAmount,
    #[error("invalid HMAC key: {0}")]
    Key(String),
    #[error("payment gateway request failed: {0:#}")]
    Gateway(anyhow::Error),
}
