use axum::{http::StatusCode, response::IntoResponse};

use crate::api::error::ApiError;

// axum handler for GET /
pub async fn root() -> &'static str {
    "Welcome to the E-commerce API"
}

/// Catch-all for unknown routes.
pub async fn not_found() -> impl IntoResponse {
    ApiError::new(StatusCode::NOT_FOUND, "Route not found")
}
