use axum::{Json, extract::Extension};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

use super::types::CreateOrderPayload;
use crate::api::error::{ApiError, Environment, MessageResponse};
use crate::api::state::PaymentState;
use crate::payment::{OrderRequest, PaymentError, to_paise};

/// Create a gateway order; the gateway's order object is returned unchanged.
#[utoipa::path(
    post,
    path = "/razorpay/create-order",
    request_body = CreateOrderPayload,
    responses(
        (status = 200, description = "Order created; gateway order object"),
        (status = 400, description = "Invalid amount", body = MessageResponse),
        (status = 500, description = "Gateway failure", body = MessageResponse)
    ),
    tag = "payment"
)]
#[instrument(skip_all)]
pub async fn create_order(
    payment: Extension<Arc<PaymentState>>,
    environment: Extension<Environment>,
    payload: Option<Json<CreateOrderPayload>>,
) -> Result<Json<Value>, ApiError> {
    let amount = payload
        .map(|Json(payload)| payload.amount)
        .unwrap_or_default();
    let paise = to_paise(&amount).map_err(|err| ApiError::from_payment(err, *environment))?;

    let order = OrderRequest::inr(paise);
    let created = payment
        .gateway()
        .create_order(&order)
        .await
        .map_err(|err| ApiError::from_payment(PaymentError::Gateway(err), *environment))?;
    info!(amount = paise, receipt = %order.receipt, "order created");

    Ok(Json(created))
}
