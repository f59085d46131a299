use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

use crate::payment::DEFAULT_RAZORPAY_API_URL;

pub const ARG_RAZORPAY_KEY_ID: &str = "razorpay-key-id";
pub const ARG_RAZORPAY_KEY_SECRET: &str = "razorpay-key-secret";
pub const ARG_RAZORPAY_API_URL: &str = "razorpay-api-url";

#[derive(Debug)]
pub struct Options {
    pub key_id: String,
    pub key_secret: SecretString,
    pub api_url: String,
}

impl Options {
    /// Parse payment gateway arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the key id or secret is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let get_non_empty = |id: &str| {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
        };

        Ok(Self {
            key_id: get_non_empty(ARG_RAZORPAY_KEY_ID)
                .context("missing required argument: --razorpay-key-id")?,
            key_secret: get_non_empty(ARG_RAZORPAY_KEY_SECRET)
                .map(SecretString::from)
                .context("missing required argument: --razorpay-key-secret")?,
            api_url: get_non_empty(ARG_RAZORPAY_API_URL)
                .unwrap_or_else(|| DEFAULT_RAZORPAY_API_URL.to_string()),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_RAZORPAY_KEY_ID)
                .long(ARG_RAZORPAY_KEY_ID)
                .help("Razorpay key id")
                .env("RAZORPAY_KEY_ID")
                .required(true),
        )
        .arg(
            Arg::new(ARG_RAZORPAY_KEY_SECRET)
                .long(ARG_RAZORPAY_KEY_SECRET)
                .help("Razorpay key secret; also signs payment callbacks")
                .env("RAZORPAY_KEY_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_RAZORPAY_API_URL)
                .long(ARG_RAZORPAY_API_URL)
                .help("Razorpay API base URL")
                .env("STOREFRONT_RAZORPAY_API_URL")
                .default_value(DEFAULT_RAZORPAY_API_URL),
        )
}
