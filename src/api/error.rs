//! HTTP error boundary.
//!
//! Every handler failure becomes an [`ApiError`], rendered as
//! `{"success": false, "message": ...}`. Internal and dispatch failures log the
//! cause and only include it in the message outside production.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::{fmt, str::FromStr};
use tracing::error;
use utoipa::ToSchema;

use crate::identity::{AuthError, RegistrationError, VerificationError};
use crate::payment::PaymentError;

pub const SERVER_ERROR_MESSAGE: &str = "Server error, please try again.";
pub const DISPATCH_ERROR_MESSAGE: &str = "Could not send email. Please try again later.";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown environment: {other}")),
        }
    }
}

/// JSON body shared by success and failure responses.
#[derive(ToSchema, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// 500 with `public` as the message; the cause is logged and only appended
    /// outside production.
    pub fn internal(environment: Environment, public: &str, cause: &dyn fmt::Display) -> Self {
        error!("{public} {cause}");
        let message = if environment.is_production() {
            public.to_string()
        } else {
            format!("{public} ({cause})")
        };
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn from_verification(err: VerificationError, environment: Environment) -> Self {
        match err {
            VerificationError::NotFound => Self::not_found("User not found."),
            VerificationError::AlreadyVerified => Self::bad_request("Email already verified."),
            VerificationError::ArtifactMissing => {
                Self::bad_request("No pending verification. Please request a new one.")
            }
            VerificationError::ArtifactExpired => Self::bad_request("OTP expired"),
            VerificationError::ArtifactMismatch => Self::bad_request("Invalid OTP"),
            VerificationError::UnsupportedStrategy(strategy) => Self::bad_request(format!(
                "{} verification is not enabled.",
                if strategy == "otp" { "OTP" } else { "Link" }
            )),
            VerificationError::DispatchFailure(cause) => {
                Self::internal(environment, DISPATCH_ERROR_MESSAGE, &format_args!("{cause:#}"))
            }
            err @ (VerificationError::Store(_) | VerificationError::Crypto(_)) => {
                Self::internal(environment, SERVER_ERROR_MESSAGE, &err)
            }
        }
    }

    pub fn from_registration(err: RegistrationError, environment: Environment) -> Self {
        match err {
            RegistrationError::MissingFields => Self::bad_request("All fields are required."),
            RegistrationError::InvalidEmail => Self::bad_request("Invalid email address."),
            RegistrationError::Conflict => {
                Self::bad_request("Email already registered. Please log in.")
            }
            RegistrationError::Verification(err) => Self::from_verification(err, environment),
            err @ (RegistrationError::Store(_) | RegistrationError::Crypto(_)) => {
                Self::internal(environment, SERVER_ERROR_MESSAGE, &err)
            }
        }
    }

    pub fn from_auth(err: AuthError, environment: Environment) -> Self {
        match err {
            AuthError::AccountNotFound => Self::bad_request("User not found."),
            AuthError::AccountUnverified => {
                Self::unauthorized("Please activate your account before logging in.")
            }
            AuthError::InvalidCredentials => Self::bad_request("Invalid credentials."),
            err @ (AuthError::Store(_) | AuthError::Crypto(_)) => {
                Self::internal(environment, SERVER_ERROR_MESSAGE, &err)
            }
        }
    }

    pub fn from_payment(err: PaymentError, environment: Environment) -> Self {
        match err {
            PaymentError::MissingFields => Self::bad_request("Missing payment details"),
            PaymentError::SignatureMismatch => Self::bad_request("Payment verification failed"),
            PaymentError::InvalidAmount => Self::bad_request("Invalid amount"),
            PaymentError::Gateway(cause) => Self::internal(
                environment,
                "Failed to create order",
                &format_args!("{cause:#}"),
            ),
            err @ PaymentError::Key(_) => Self::internal(
                environment,
                "Server error during payment verification",
                &err,
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = MessageResponse {
            success: false,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
