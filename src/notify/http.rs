//! Transactional email over an HTTP JSON API.
//!
//! The request body follows the common `sender`/`to`/`subject`/`htmlContent`
//! shape; the API key travels in the `api-key` header.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument};

use super::{Notification, Notifier};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailBody {
    sender: EmailAddress,
    to: Vec<EmailAddress>,
    subject: String,
    html_content: String,
}

#[derive(Clone)]
pub struct HttpNotifierConfig {
    pub api_url: String,
    pub api_key: SecretString,
    pub sender_email: String,
    pub sender_name: Option<String>,
}

impl std::fmt::Debug for HttpNotifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpNotifierConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"***")
            .field("sender_email", &self.sender_email)
            .field("sender_name", &self.sender_name)
            .finish()
    }
}

#[derive(Debug)]
pub struct HttpNotifier {
    client: Client,
    config: HttpNotifierConfig,
}

impl HttpNotifier {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: HttpNotifierConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build email HTTP client")?;
        Ok(Self { client, config })
    }

    fn body(&self, notification: &Notification) -> SendEmailBody {
        SendEmailBody {
            sender: EmailAddress {
                email: self.config.sender_email.clone(),
                name: self.config.sender_name.clone(),
            },
            to: vec![EmailAddress {
                email: notification.to_email.clone(),
                name: notification.to_name.clone(),
            }],
            subject: notification.subject.clone(),
            html_content: notification.html.clone(),
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    #[instrument(skip_all, fields(to_email = %notification.to_email))]
    async fn send(&self, notification: &Notification) -> Result<()> {
        let response = self
            .client
            .post(&self.config.api_url)
            .header("api-key", self.config.api_key.expose_secret())
            .json(&self.body(notification))
            .send()
            .await
            .context("email API request failed")?;

        let status = response.status();
        if status.is_success() {
            debug!("email accepted by provider");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(anyhow!("email send failed (status={status}): {body}"))
    }
}
