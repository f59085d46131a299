use axum::{Json, extract::Extension};
use std::sync::Arc;
use tracing::{info, instrument};

use super::types::{LoginPayload, LoginResponse};
use crate::api::error::{ApiError, Environment, MessageResponse};
use crate::api::state::AuthState;

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 400, description = "Missing fields, unknown user or invalid credentials", body = MessageResponse),
        (status = 401, description = "Account not verified", body = MessageResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    auth: Extension<Arc<AuthState>>,
    environment: Extension<Environment>,
    payload: Option<Json<LoginPayload>>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Some(Json(payload)) = payload else {
        return Err(ApiError::bad_request("Email and password are required."));
    };
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required."));
    }

    let authorized = auth
        .gate()
        .authenticate(&payload.email, &payload.password)
        .await
        .map_err(|err| ApiError::from_auth(err, *environment))?;
    info!(email = %authorized.email, "login succeeded");

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful!".to_string(),
        email: authorized.email,
        name: authorized.name,
    }))
}
