//! Command-line interface: argument parsing, telemetry and server startup.

pub mod actions;
pub mod commands;
pub mod dispatch;
mod start;
pub mod telemetry;

pub use start::start;
