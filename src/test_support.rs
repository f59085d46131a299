//! Test doubles shared across module tests.

use anyhow::{Result, anyhow};
use argon2::Params;
use async_trait::async_trait;
use std::sync::Mutex;

use crate::identity::Argon2Hasher;
use crate::notify::{Notification, Notifier};

/// Argon2 with minimal cost so tests stay fast.
pub fn fast_hasher() -> Argon2Hasher {
    let params = Params::new(1024, 1, 1, None).expect("valid argon2 params");
    Argon2Hasher::with_params(params)
}

/// Keeps every notification it is asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().expect("notifier lock").clone()
    }

    pub fn last_link_token(&self) -> Option<String> {
        let last = self.sent().pop()?;
        let (_, rest) = last.html.split_once("/activate/")?;
        let token: String = rest.chars().take_while(char::is_ascii_hexdigit).collect();
        (!token.is_empty()).then_some(token)
    }

    pub fn last_otp(&self) -> Option<String> {
        let last = self.sent().pop()?;
        let (_, rest) = last.html.split_once("<h2>")?;
        let (code, _) = rest.split_once("</h2>")?;
        Some(code.to_string())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        self.sent
            .lock()
            .expect("notifier lock")
            .push(notification.clone());
        Ok(())
    }
}

/// Always fails, like an unreachable email provider.
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _notification: &Notification) -> Result<()> {
        Err(anyhow!("email provider unavailable"))
    }
}
