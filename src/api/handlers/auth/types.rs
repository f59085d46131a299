//! Request/response types for auth endpoints.
//!
//! Request fields default to empty so a missing field reaches the handler and
//! gets the same 400 as a blank one.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::{IntoParams, ToSchema};

#[derive(ToSchema, Deserialize, Default)]
#[serde(default)]
pub struct SignupPayload {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for SignupPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupPayload")
            .field("name", &self.name)
            .field("phone", &self.phone)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(ToSchema, Deserialize, Default)]
#[serde(default)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginPayload")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(ToSchema, Serialize, Debug, PartialEq, Eq)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub email: String,
    pub name: String,
}

#[derive(IntoParams, Deserialize, Debug, Default)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct EmailQuery {
    /// Account email address.
    pub email: String,
}

#[derive(ToSchema, Deserialize, Debug, Default)]
#[serde(default)]
pub struct ResendVerificationPayload {
    pub email: String,
}

#[derive(ToSchema, Deserialize, Default)]
#[serde(default)]
pub struct VerifyOtpPayload {
    pub email: String,
    pub otp: String,
}

impl fmt::Debug for VerifyOtpPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifyOtpPayload")
            .field("email", &self.email)
            .field("otp", &"***")
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct VerificationStatusResponse {
    #[serde(rename = "isVerified")]
    pub is_verified: bool,
}
