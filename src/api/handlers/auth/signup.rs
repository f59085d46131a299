use axum::{Json, extract::Extension, http::StatusCode};
use std::sync::Arc;
use tracing::instrument;

use super::types::SignupPayload;
use crate::api::error::{ApiError, Environment, MessageResponse};
use crate::api::state::AuthState;
use crate::identity::{SignupRequest, VerificationStrategy, register};

#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupPayload,
    responses(
        (status = 201, description = "Account created and verification sent", body = MessageResponse),
        (status = 400, description = "Missing fields, invalid email or already registered", body = MessageResponse),
        (status = 500, description = "Verification email could not be sent", body = MessageResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn signup(
    auth: Extension<Arc<AuthState>>,
    environment: Extension<Environment>,
    payload: Option<Json<SignupPayload>>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Some(Json(payload)) = payload else {
        return Err(ApiError::bad_request("All fields are required."));
    };

    let request = SignupRequest {
        name: payload.name,
        phone: payload.phone,
        email: payload.email,
        password: payload.password,
    };
    register(auth.credentials(), auth.hasher(), auth.engine(), request)
        .await
        .map_err(|err| ApiError::from_registration(err, *environment))?;

    let message = match auth.engine().strategy() {
        VerificationStrategy::LinkToken => {
            "User registered successfully. Check your email to activate your account."
        }
        VerificationStrategy::NumericOtp => {
            "User registered successfully. Check your email for the verification code."
        }
    };
    Ok((StatusCode::CREATED, Json(MessageResponse::ok(message))))
}
