//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── api: ApiConfig          # backend URL, timeout, user agent
//! ├── session: SessionConfig  # token file, permission token secret
//! ├── json                    # output format
//! └── command: Command        # what to do
//! ```

mod tracing;

use std::process;

use anyhow::Context;
use clap::Parser;
use homelog_auth::session::SessionConfig;
use homelog_client::ApiConfig;

pub use self::tracing::init_tracing;
use crate::commands::Command;
use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "homelog")]
#[command(about = "Sign in to homelog and inspect access rights")]
#[command(version)]
pub struct Cli {
    /// Backend API configuration.
    #[clap(flatten)]
    pub api: ApiConfig,

    /// Session persistence and token verification.
    #[clap(flatten)]
    pub session: SessionConfig,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.api.validate().context("invalid API configuration")?;
        self.session
            .validate()
            .context("invalid session configuration")?;
        Ok(())
    }

    /// Logs configuration at debug level (no sensitive information).
    pub fn log(&self) {
        ::tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            features = ?Self::enabled_features(),
            "build information"
        );

        ::tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            api_url = %self.api.api_url,
            http_timeout_secs = self.api.http_timeout,
            token_path = %self.session.token_path.display(),
            verify_permission_token = self.session.permission_token_secret.is_some(),
            "configuration"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
