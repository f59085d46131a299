//! Verification endpoints: link activation, OTP confirmation, status and resend.

use axum::{
    Json,
    extract::{Extension, Path, Query, rejection::QueryRejection},
    response::Redirect,
};
use std::sync::Arc;
use tracing::instrument;

use super::types::{
    EmailQuery, ResendVerificationPayload, VerificationStatusResponse, VerifyOtpPayload,
};
use crate::api::error::{ApiError, Environment, MessageResponse};
use crate::api::state::AuthState;
use crate::identity::{ArtifactClaim, VerificationError, VerificationStrategy};

const EMAIL_REQUIRED: &str = "Email is required.";

/// Consume an activation link token and send the browser to the login page.
#[utoipa::path(
    get,
    path = "/auth/activate/{token}",
    params(
        ("token" = String, Path, description = "Activation token from the email link")
    ),
    responses(
        (status = 303, description = "Account activated; redirect to the frontend login page"),
        (status = 400, description = "Invalid or already used token", body = MessageResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn activate(
    auth: Extension<Arc<AuthState>>,
    environment: Extension<Environment>,
    Path(token): Path<String>,
) -> Result<Redirect, ApiError> {
    auth.engine()
        .consume(ArtifactClaim::Link { token: &token })
        .await
        .map_err(|err| match err {
            VerificationError::ArtifactMissing => {
                ApiError::bad_request("Invalid or expired activation token.")
            }
            other => ApiError::from_verification(other, *environment),
        })?;

    Ok(Redirect::to(&auth.engine().activation_redirect_url()))
}

/// Confirm an emailed OTP.
#[utoipa::path(
    post,
    path = "/auth/verify-otp",
    request_body = VerifyOtpPayload,
    responses(
        (status = 200, description = "Account verified", body = MessageResponse),
        (status = 400, description = "Missing fields, expired, incorrect or no outstanding OTP", body = MessageResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn verify_otp(
    auth: Extension<Arc<AuthState>>,
    environment: Extension<Environment>,
    payload: Option<Json<VerifyOtpPayload>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Some(Json(payload)) = payload else {
        return Err(ApiError::bad_request("Email and OTP are required."));
    };
    if payload.email.trim().is_empty() || payload.otp.trim().is_empty() {
        return Err(ApiError::bad_request("Email and OTP are required."));
    }

    auth.engine()
        .consume(ArtifactClaim::Otp {
            email: &payload.email,
            code: &payload.otp,
        })
        .await
        .map_err(|err| match err {
            VerificationError::ArtifactMissing => {
                ApiError::bad_request("No OTP found. Please request a new one.")
            }
            other => ApiError::from_verification(other, *environment),
        })?;

    Ok(Json(MessageResponse::ok("Email verified successfully.")))
}

#[utoipa::path(
    get,
    path = "/auth/check-verification",
    params(EmailQuery),
    responses(
        (status = 200, description = "Verification state", body = VerificationStatusResponse),
        (status = 400, description = "Missing email or unknown user", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn check_verification(
    auth: Extension<Arc<AuthState>>,
    environment: Extension<Environment>,
    query: Result<Query<EmailQuery>, QueryRejection>,
) -> Result<Json<VerificationStatusResponse>, ApiError> {
    let email = query.ok().map(|Query(query)| query.email).unwrap_or_default();
    if email.trim().is_empty() {
        return Err(ApiError::bad_request(EMAIL_REQUIRED));
    }

    let state = auth
        .engine()
        .status(&email)
        .await
        .map_err(|err| match err {
            VerificationError::NotFound => ApiError::bad_request("User not found."),
            other => ApiError::from_verification(other, *environment),
        })?;

    Ok(Json(VerificationStatusResponse {
        is_verified: state.is_verified(),
    }))
}

/// Re-issue the verification artifact for an unverified account.
#[utoipa::path(
    post,
    path = "/auth/resend-verification",
    request_body = ResendVerificationPayload,
    responses(
        (status = 200, description = "Verification sent again", body = MessageResponse),
        (status = 400, description = "Missing email or already verified", body = MessageResponse),
        (status = 404, description = "Unknown user", body = MessageResponse),
        (status = 500, description = "Email could not be sent", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn resend_verification(
    auth: Extension<Arc<AuthState>>,
    environment: Extension<Environment>,
    payload: Option<Json<ResendVerificationPayload>>,
) -> Result<Json<MessageResponse>, ApiError> {
    resend(&auth, *environment, payload).await
}

/// Same as `/auth/resend-verification`.
#[utoipa::path(
    post,
    path = "/auth/resend-otp",
    request_body = ResendVerificationPayload,
    responses(
        (status = 200, description = "Verification sent again", body = MessageResponse),
        (status = 400, description = "Missing email or already verified", body = MessageResponse),
        (status = 404, description = "Unknown user", body = MessageResponse),
        (status = 500, description = "Email could not be sent", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn resend_otp(
    auth: Extension<Arc<AuthState>>,
    environment: Extension<Environment>,
    payload: Option<Json<ResendVerificationPayload>>,
) -> Result<Json<MessageResponse>, ApiError> {
    resend(&auth, *environment, payload).await
}

#[instrument(skip_all)]
async fn resend(
    auth: &AuthState,
    environment: Environment,
    payload: Option<Json<ResendVerificationPayload>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = payload
        .map(|Json(payload)| payload.email)
        .unwrap_or_default();
    if email.trim().is_empty() {
        return Err(ApiError::bad_request(EMAIL_REQUIRED));
    }

    auth.engine()
        .resend(&email)
        .await
        .map_err(|err| ApiError::from_verification(err, environment))?;

    let message = match auth.engine().strategy() {
        VerificationStrategy::LinkToken => "Activation email sent again. Check your inbox.",
        VerificationStrategy::NumericOtp => "Verification code sent again. Check your inbox.",
    };
    Ok(Json(MessageResponse::ok(message)))
}
