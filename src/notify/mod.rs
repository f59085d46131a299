//! Notification dispatch for verification artifacts.
//!
//! The verification engine hands a rendered [`Notification`] to a [`Notifier`]
//! and awaits the result; failures are surfaced to the caller, never retried here.
//!
//! - [`LogNotifier`] logs recipient and subject only (local development).
//! - [`HttpNotifier`] posts to a transactional email HTTP API.

mod http;

pub use http::{HttpNotifier, HttpNotifierConfig};

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

pub const DEFAULT_SENDER_NAME: &str = "E-commerce App";

/// A rendered email ready for delivery.
#[derive(Clone)]
pub struct Notification {
    pub to_email: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub html: String,
}

impl Notification {
    /// Activation email carrying the single-use link.
    #[must_use]
    pub fn activation(to_email: &str, name: &str, activation_url: &str) -> Self {
        let escaped = escape_html(name);
        let url = escape_html(activation_url);
        let html = format!(
            "<p>Hello {escaped},</p>\
             <p>Click the link below to activate your account:</p>\
             <p><a href=\"{url}\" target=\"_blank\">Activate Account</a></p>\
             <p>If you did not request this, please ignore this email.</p>"
        );
        Self {
            to_email: to_email.to_string(),
            to_name: Some(name.to_string()),
            subject: "Activate Your Account".to_string(),
            html,
        }
    }

    /// OTP email; the code lifetime is shown to the user.
    #[must_use]
    pub fn otp(to_email: &str, name: &str, code: &str, ttl_seconds: i64) -> Self {
        let escaped = escape_html(name);
        let lifetime = describe_lifetime(ttl_seconds);
        let html = format!(
            "<p>Hello {escaped},</p>\
             <p>Your verification code is:</p>\
             <h2>{code}</h2>\
             <p>This code expires in {lifetime}.</p>\
             <p>If you did not request this, please ignore this email.</p>"
        );
        Self {
            to_email: to_email.to_string(),
            to_name: Some(name.to_string()),
            subject: "Your verification code".to_string(),
            html,
        }
    }
}

impl std::fmt::Debug for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The body carries the artifact.
        f.debug_struct("Notification")
            .field("to_email", &self.to_email)
            .field("to_name", &self.to_name)
            .field("subject", &self.subject)
            .field("html", &"***")
            .finish()
    }
}

/// Notification dispatcher.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver the notification or return why it could not be delivered.
    async fn send(&self, notification: &Notification) -> Result<()>;
}

/// Local dev notifier that logs instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        info!(
            to_email = %notification.to_email,
            subject = %notification.subject,
            "email delivery disabled; notification logged"
        );
        Ok(())
    }
}

/// Human readable lifetime: seconds below a minute, otherwise whole minutes rounded up.
fn describe_lifetime(seconds: i64) -> String {
    let seconds = seconds.max(1);
    if seconds < 60 {
        let unit = if seconds == 1 { "second" } else { "seconds" };
        return format!("{seconds} {unit}");
    }
    let minutes = seconds / 60 + i64::from(seconds % 60 != 0);
    let unit = if minutes == 1 { "minute" } else { "minutes" };
    format!("{minutes} {unit}")
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
