//! Maps validated CLI arguments to the action to run.

use crate::api::Environment;
use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{ARG_DSN, ARG_ENVIRONMENT, ARG_PORT, auth, email, payment};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(3001);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .filter(|v| !v.trim().is_empty());
    let environment = matches
        .get_one::<Environment>(ARG_ENVIRONMENT)
        .copied()
        .unwrap_or_default();

    let auth_opts = auth::Options::parse(matches)?;
    let email_opts = email::Options::parse(matches)?;
    let payment_opts = payment::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        environment,
        frontend_base_url: auth_opts.frontend_base_url,
        verification_strategy: auth_opts.verification_strategy,
        otp_ttl_seconds: auth_opts.otp_ttl_seconds,
        email_api_url: email_opts.api_url,
        email_api_key: email_opts.api_key,
        email_sender: email_opts.sender,
        email_sender_name: email_opts.sender_name,
        razorpay_api_url: payment_opts.api_url,
        razorpay_key_id: payment_opts.key_id,
        razorpay_key_secret: payment_opts.key_secret,
    }))
}
