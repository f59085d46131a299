use anyhow::{Result, bail};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

use crate::notify::DEFAULT_SENDER_NAME;

pub const ARG_EMAIL_API_URL: &str = "email-api-url";
pub const ARG_EMAIL_API_KEY: &str = "email-api-key";
pub const ARG_EMAIL_SENDER: &str = "email-sender";
pub const ARG_EMAIL_SENDER_NAME: &str = "email-sender-name";

/// Email transport settings. `api_url == None` means emails are only logged.
#[derive(Debug)]
pub struct Options {
    pub api_url: Option<String>,
    pub api_key: Option<SecretString>,
    pub sender: Option<String>,
    pub sender_name: String,
}

impl Options {
    /// Parse email transport arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the API url is set without a key or sender.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        // Helper to filter empty strings which clap might pass through if env vars are set to ""
        let get_non_empty = |id: &str| {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
        };

        let api_url = get_non_empty(ARG_EMAIL_API_URL);
        let api_key = get_non_empty(ARG_EMAIL_API_KEY).map(SecretString::from);
        let sender = get_non_empty(ARG_EMAIL_SENDER);

        if api_url.is_some() {
            if api_key.is_none() {
                bail!("missing required argument: --{ARG_EMAIL_API_KEY}");
            }
            if sender.is_none() {
                bail!("missing required argument: --{ARG_EMAIL_SENDER}");
            }
        }

        Ok(Self {
            api_url,
            api_key,
            sender,
            sender_name: get_non_empty(ARG_EMAIL_SENDER_NAME)
                .unwrap_or_else(|| DEFAULT_SENDER_NAME.to_string()),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_EMAIL_API_URL)
                .long(ARG_EMAIL_API_URL)
                .help("Transactional email API endpoint; emails are only logged when unset")
                .env("STOREFRONT_EMAIL_API_URL"),
        )
        .arg(
            Arg::new(ARG_EMAIL_API_KEY)
                .long(ARG_EMAIL_API_KEY)
                .help("Transactional email API key")
                .env("STOREFRONT_EMAIL_API_KEY")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_EMAIL_SENDER)
                .long(ARG_EMAIL_SENDER)
                .help("From address for outgoing email")
                .env("STOREFRONT_EMAIL_SENDER"),
        )
        .arg(
            Arg::new(ARG_EMAIL_SENDER_NAME)
                .long(ARG_EMAIL_SENDER_NAME)
                .help("Display name for outgoing email")
                .env("STOREFRONT_EMAIL_SENDER_NAME")
                .default_value(DEFAULT_SENDER_NAME),
        )
}
