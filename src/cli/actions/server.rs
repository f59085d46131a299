use crate::{
    api::{self, AppState, AuthState, Environment, PaymentState},
    identity::{
        Argon2Hasher, CredentialStore, MemoryStore, PasswordHasher, PgStore, VerificationEngine,
        VerificationRecordStore, VerificationStrategy,
    },
    notify::{HttpNotifier, HttpNotifierConfig, LogNotifier, Notifier},
    payment::{PaymentIntegrityChecker, RazorpayGateway},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{info, warn};

pub struct Args {
    pub port: u16,
    pub dsn: Option<String>,
    pub environment: Environment,
    pub frontend_base_url: String,
    pub verification_strategy: VerificationStrategy,
    pub otp_ttl_seconds: i64,
    pub email_api_url: Option<String>,
    pub email_api_key: Option<SecretString>,
    pub email_sender: Option<String>,
    pub email_sender_name: String,
    pub razorpay_api_url: String,
    pub razorpay_key_id: String,
    pub razorpay_key_secret: SecretString,
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args")
            .field("port", &self.port)
            .field("dsn", &self.dsn.as_ref().map(|_| "***"))
            .field("environment", &self.environment)
            .field("frontend_base_url", &self.frontend_base_url)
            .field("verification_strategy", &self.verification_strategy)
            .field("otp_ttl_seconds", &self.otp_ttl_seconds)
            .field("email_api_url", &self.email_api_url)
            .field("email_sender", &self.email_sender)
            .field("email_sender_name", &self.email_sender_name)
            .field("razorpay_api_url", &self.razorpay_api_url)
            .field("razorpay_key_id", &self.razorpay_key_id)
            .finish_non_exhaustive()
    }
}

fn notifier(args: &Args) -> Result<Arc<dyn Notifier>> {
    let (Some(api_url), Some(api_key), Some(sender)) = (
        args.email_api_url.clone(),
        args.email_api_key.clone(),
        args.email_sender.clone(),
    ) else {
        warn!("email API not configured; notifications will only be logged");
        return Ok(Arc::new(LogNotifier));
    };

    let notifier = HttpNotifier::new(HttpNotifierConfig {
        api_url,
        api_key,
        sender_email: sender,
        sender_name: Some(args.email_sender_name.clone()),
    })?;
    Ok(Arc::new(notifier))
}

async fn stores(
    dsn: Option<&str>,
) -> Result<(Arc<dyn CredentialStore>, Arc<dyn VerificationRecordStore>)> {
    let Some(dsn) = dsn else {
        warn!("no DSN configured; accounts are kept in memory");
        let store = Arc::new(MemoryStore::new());
        let credentials: Arc<dyn CredentialStore> = store.clone();
        let records: Arc<dyn VerificationRecordStore> = store;
        return Ok((credentials, records));
    };

    let store = Arc::new(
        PgStore::connect(dsn)
            .await
            .context("Failed to connect to database")?,
    );
    let credentials: Arc<dyn CredentialStore> = store.clone();
    let records: Arc<dyn VerificationRecordStore> = store;
    Ok((credentials, records))
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable, a client cannot be built, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let (credentials, records) = stores(args.dsn.as_deref()).await?;

    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());
    let notifier = notifier(&args)?;

    let engine = VerificationEngine::new(
        args.verification_strategy,
        credentials.clone(),
        records,
        hasher.clone(),
        notifier,
        args.frontend_base_url.clone(),
    )
    .with_otp_ttl_seconds(args.otp_ttl_seconds);

    let gateway = RazorpayGateway::new(
        &args.razorpay_api_url,
        args.razorpay_key_id.clone(),
        args.razorpay_key_secret.clone(),
    )?;
    let checker = PaymentIntegrityChecker::new(args.razorpay_key_secret.clone());

    let state = AppState {
        auth: Arc::new(AuthState::new(credentials, hasher, engine)),
        payment: Arc::new(PaymentState::new(checker, Arc::new(gateway))),
        environment: args.environment,
    };

    info!(
        environment = args.environment.as_str(),
        strategy = args.verification_strategy.as_str(),
        "starting storefront"
    );

    api::new(args.port, state).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Args {
        Args {
            port: 3001,
            dsn: None,
            environment: Environment::Development,
            frontend_base_url: "http://localhost:3000".to_string(),
            verification_strategy: VerificationStrategy::LinkToken,
            otp_ttl_seconds: 600,
            email_api_url: None,
            email_api_key: None,
            email_sender: None,
            email_sender_name: "E-commerce App".to_string(),
            razorpay_api_url: "https://api.razorpay.com/v1".to_string(),
            razorpay_key_id: "rzp_test_key".to_string(),
            razorpay_key_secret: SecretString::from("rzp_secret"),
        }
    }

    #[test]
    fn notifier_falls_back_to_log_without_api() {
        assert!(notifier(&args()).is_ok());
    }

    #[test]
    fn notifier_uses_http_when_configured() {
        let mut args = args();
        args.email_api_url = Some("https://mail.example.test/send".to_string());
        args.email_api_key = Some(SecretString::from("mail-key"));
        args.email_sender = Some("shop@example.test".to_string());
        assert!(notifier(&args).is_ok());
    }

    #[test]
    fn debug_hides_dsn_and_secrets() {
        let mut args = args();
        args.dsn = Some("postgres://user:hunter2@db/storefront".to_string());
        let debug = format!("{args:?}");
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("rzp_secret"));
    }
}
