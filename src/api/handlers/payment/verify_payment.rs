use axum::{Json, extract::Extension};
use std::sync::Arc;
use tracing::{info, instrument};

use super::types::VerifyPaymentPayload;
use crate::api::error::{ApiError, Environment, MessageResponse};
use crate::api::state::PaymentState;

/// Check the gateway's callback signature. Nothing is persisted.
#[utoipa::path(
    post,
    path = "/razorpay/verify-payment",
    request_body = VerifyPaymentPayload,
    responses(
        (status = 200, description = "Signature valid", body = MessageResponse),
        (status = 400, description = "Missing details or signature mismatch", body = MessageResponse)
    ),
    tag = "payment"
)]
#[instrument(skip_all)]
pub async fn verify_payment(
    payment: Extension<Arc<PaymentState>>,
    environment: Extension<Environment>,
    payload: Option<Json<VerifyPaymentPayload>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();
    payment
        .checker()
        .verify_callback(
            payload.razorpay_order_id.as_deref(),
            payload.razorpay_payment_id.as_deref(),
            payload.razorpay_signature.as_deref(),
        )
        .map_err(|err| ApiError::from_payment(err, *environment))?;

    info!(order_id = ?payload.razorpay_order_id, "payment verified");
    Ok(Json(MessageResponse::ok("Payment verified successfully")))
}
