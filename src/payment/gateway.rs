//! Order creation against the payment gateway.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

pub const DEFAULT_RAZORPAY_API_URL: &str = "https://api.razorpay.com/v1";
pub const ORDER_CURRENCY: &str = "INR";

/// Order options sent to the gateway.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct OrderRequest {
    pub amount: u64,
    pub currency: String,
    pub receipt: String,
}

impl OrderRequest {
    /// INR order with a time-based receipt id.
    #[must_use]
    pub fn inr(amount_paise: u64) -> Self {
        Self {
            amount: amount_paise,
            currency: ORDER_CURRENCY.to_string(),
            receipt: format!("order_rcptid_{}", Utc::now().timestamp_millis()),
        }
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an order and return the gateway's order object unchanged.
    async fn create_order(&self, order: &OrderRequest) -> Result<Value>;
}

pub struct RazorpayGateway {
    client: Client,
    api_url: String,
    key_id: String,
    key_secret: SecretString,
}

impl RazorpayGateway {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_url: &str, key_id: String, key_secret: SecretString) -> Result<Self> {
        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()
            .context("Failed to build payment gateway HTTP client")?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            key_id,
            key_secret,
        })
    }

    fn orders_url(&self) -> String {
        format!("{}/orders", self.api_url)
    }
}

impl std::fmt::Debug for RazorpayGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayGateway")
            .field("api_url", &self.api_url)
            .field("key_id", &self.key_id)
            .field("key_secret", &"***")
            .finish()
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    #[instrument(skip_all, fields(amount = order.amount, receipt = %order.receipt))]
    async fn create_order(&self, order: &OrderRequest) -> Result<Value> {
        let response = self
            .client
            .post(self.orders_url())
            .basic_auth(&self.key_id, Some(self.key_secret.expose_secret()))
            .json(order)
            .send()
            .await
            .context("payment gateway request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("order creation failed (status={status}): {body}"));
        }

        let order: Value = response
            .json()
            .await
            .context("payment gateway returned invalid JSON")?;
        debug!(order_id = ?order.get("id"), "order created");
        Ok(order)
    }
}
