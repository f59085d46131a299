use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize, Debug, Default)]
#[serde(default)]
pub struct CreateOrderPayload {
    /// Amount in rupees, as a JSON number or numeric string.
    #[schema(value_type = Object)]
    pub amount: Value,
}

#[derive(ToSchema, Deserialize, Debug, Default)]
#[serde(default)]
pub struct VerifyPaymentPayload {
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
}
