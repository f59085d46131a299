use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};

use crate::identity::{DEFAULT_OTP_TTL_SECONDS, MAX_OTP_TTL_SECONDS, VerificationStrategy};

pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";
pub const ARG_VERIFICATION_STRATEGY: &str = "verification-strategy";
pub const ARG_OTP_TTL_SECONDS: &str = "otp-ttl-seconds";

#[derive(Debug)]
pub struct Options {
    pub frontend_base_url: String,
    pub verification_strategy: VerificationStrategy,
    pub otp_ttl_seconds: i64,
}

impl Options {
    /// Parse account verification arguments from matches.
    ///
    /// # Errors
    /// Returns an error if a value is missing or invalid.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let frontend_base_url = matches
            .get_one::<String>(ARG_FRONTEND_BASE_URL)
            .cloned()
            .context("missing required argument: --frontend-base-url")?;
        url::Url::parse(&frontend_base_url)
            .with_context(|| format!("Invalid frontend base URL: {frontend_base_url}"))?;

        let verification_strategy = matches
            .get_one::<VerificationStrategy>(ARG_VERIFICATION_STRATEGY)
            .copied()
            .context("missing required argument: --verification-strategy")?;

        let otp_ttl_seconds = matches
            .get_one::<i64>(ARG_OTP_TTL_SECONDS)
            .copied()
            .unwrap_or(DEFAULT_OTP_TTL_SECONDS);

        Ok(Self {
            frontend_base_url,
            verification_strategy,
            otp_ttl_seconds,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long(ARG_FRONTEND_BASE_URL)
                .help("Frontend base URL used for activation links and redirects")
                .env("STOREFRONT_FRONTEND_BASE_URL")
                .default_value("http://localhost:3000"),
        )
        .arg(
            Arg::new(ARG_VERIFICATION_STRATEGY)
                .long(ARG_VERIFICATION_STRATEGY)
                .help("How new accounts are verified: link or otp")
                .env("STOREFRONT_VERIFICATION_STRATEGY")
                .default_value("link")
                .value_parser(|value: &str| value.parse::<VerificationStrategy>()),
        )
        .arg(
            Arg::new(ARG_OTP_TTL_SECONDS)
                .long(ARG_OTP_TTL_SECONDS)
                .help("Lifetime of emailed OTP codes in seconds (at most one day)")
                .env("STOREFRONT_OTP_TTL_SECONDS")
                .default_value("600")
                .value_parser(clap::value_parser!(i64).range(1..=MAX_OTP_TTL_SECONDS)),
        )
}
