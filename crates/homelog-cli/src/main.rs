#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod commands;
mod config;

use std::process;

use anyhow::Context;

use crate::commands::{CommandContext, Outcome};
use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "homelog_cli::startup";
pub const TRACING_TARGET_CONFIG: &str = "homelog_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "homelog_cli::command";

/// Exit status of a `check` that was denied.
const EXIT_DENIED: i32 = 2;

#[tokio::main]
async fn main() {
    let error = match run().await {
        Ok(Outcome::Success) => process::exit(0),
        Ok(Outcome::Denied) => process::exit(EXIT_DENIED),
        Err(error) => error,
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_STARTUP,
            error = %error,
            "command failed"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<Outcome> {
    let cli = Cli::init();
    config::init_tracing().context("failed to initialize tracing")?;

    cli.validate()?;
    cli.log();

    let context = CommandContext::from_cli(&cli)?;
    context.execute(&cli.command).await
}
