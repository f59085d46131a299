pub mod auth;
pub mod email;
pub mod logging;
pub mod payment;

use clap::{
    Arg, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

use crate::api::Environment;

pub const ARG_PORT: &str = "port";
pub const ARG_DSN: &str = "dsn";
pub const ARG_ENVIRONMENT: &str = "environment";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("storefront")
        .about("E-commerce accounts and payments API")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("3001")
                .env("STOREFRONT_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_DSN)
                .short('d')
                .long(ARG_DSN)
                .help("Database connection string")
                .long_help(
                    "PostgreSQL connection string. When omitted, accounts are kept in memory and lost on restart.",
                )
                .env("STOREFRONT_DSN"),
        )
        .arg(
            Arg::new(ARG_ENVIRONMENT)
                .short('e')
                .long(ARG_ENVIRONMENT)
                .help("Runtime environment: development or production")
                .env("STOREFRONT_ENV")
                .default_value("development")
                .value_parser(|value: &str| value.parse::<Environment>()),
        );

    let command = auth::with_args(command);
    let command = email::with_args(command);
    let command = payment::with_args(command);
    logging::with_args(command)
}
