//! Session configuration.

use std::fmt;
use std::path::PathBuf;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::storage::FileTokenStorage;
use crate::token::PermissionTokenDecoder;
use crate::{Error, Result};

/// Default location of the persisted token file.
pub const DEFAULT_TOKEN_PATH: &str = ".homelog/tokens.json";

/// Default entry point a forced logout redirects to.
pub const DEFAULT_LOGIN_ROUTE: &str = "/login";

/// Configuration for [`AuthSession`](super::AuthSession).
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct SessionConfig {
    /// Path of the file the session tokens are persisted to
    #[cfg_attr(
        feature = "config",
        arg(long = "token-file", env = "HOMELOG_TOKEN_FILE", default_value = DEFAULT_TOKEN_PATH)
    )]
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,

    /// Secret the backend signs permission tokens with (enables verification)
    #[cfg_attr(
        feature = "config",
        arg(long, env = "HOMELOG_PERMISSION_TOKEN_SECRET", hide_env_values = true)
    )]
    #[serde(default)]
    pub permission_token_secret: Option<String>,

    /// Route published with the expiry event
    #[cfg_attr(
        feature = "config",
        arg(long, env = "HOMELOG_LOGIN_ROUTE", default_value = DEFAULT_LOGIN_ROUTE)
    )]
    #[serde(default = "default_login_route")]
    pub login_route: String,
}

fn default_token_path() -> PathBuf {
    PathBuf::from(DEFAULT_TOKEN_PATH)
}

fn default_login_route() -> String {
    DEFAULT_LOGIN_ROUTE.to_owned()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_path: default_token_path(),
            permission_token_secret: None,
            login_route: default_login_route(),
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn with_token_path(mut self, token_path: impl Into<PathBuf>) -> Self {
        self.token_path = token_path.into();
        self
    }

    #[must_use]
    pub fn with_permission_token_secret(mut self, secret: impl Into<String>) -> Self {
        self.permission_token_secret = Some(secret.into());
        self
    }

    #[must_use]
    pub fn with_login_route(mut self, login_route: impl Into<String>) -> Self {
        self.login_route = login_route.into();
        self
    }

    /// Returns a decoder that verifies signatures when a secret is set.
    pub fn decoder(&self) -> PermissionTokenDecoder {
        match self.permission_token_secret.as_deref() {
            Some(secret) if !secret.is_empty() => PermissionTokenDecoder::with_secret(secret),
            _ => PermissionTokenDecoder::unverified(),
        }
    }

    /// Returns the file storage at `token_path`.
    pub fn storage(&self) -> FileTokenStorage {
        FileTokenStorage::new(&self.token_path)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.token_path.as_os_str().is_empty() {
            return Err(Error::config("token path must not be empty"));
        }
        if !self.login_route.starts_with('/') {
            return Err(Error::config("login route must start with '/'")
                .with_context(self.login_route.clone()));
        }
        Ok(())
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("token_path", &self.token_path)
            .field(
                "permission_token_secret",
                &self.permission_token_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("login_route", &self.login_route)
            .finish()
    }
}
