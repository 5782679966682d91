//! Backend API client configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::Result;

/// Default backend base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api/";

/// Default timeout for HTTP requests: 30 seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ApiConfig {
    /// Base URL of the homelog backend API
    #[cfg_attr(
        feature = "config",
        arg(long = "api-url", env = "HOMELOG_API_URL", default_value = DEFAULT_API_URL)
    )]
    #[serde(default = "default_api_url")]
    pub api_url: Url,

    /// HTTP request timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "http-timeout", env = "HTTP_TIMEOUT", default_value = "30")
    )]
    #[serde(default = "default_timeout_secs")]
    pub http_timeout: u64,

    /// User-Agent header to send with requests
    #[cfg_attr(
        feature = "config",
        arg(long = "http-user-agent", env = "HTTP_USER_AGENT")
    )]
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_api_url() -> Url {
    Url::parse(DEFAULT_API_URL).expect("DEFAULT_API_URL is a valid absolute URL")
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            http_timeout: default_timeout_secs(),
            user_agent: None,
        }
    }
}

impl ApiConfig {
    /// Creates a configuration for the backend at `api_url`.
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            ..Self::default()
        }
    }

    /// Returns the effective timeout, using default if zero.
    pub fn effective_timeout(&self) -> Duration {
        if self.http_timeout == 0 {
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        } else {
            Duration::from_secs(self.http_timeout)
        }
    }

    /// Returns the effective user agent, using default if not set.
    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("homelog/{}", env!("CARGO_PKG_VERSION")))
    }

    /// Resolves `path` against the base URL.
    ///
    /// The base is treated as a directory whether or not it ends in `/`.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let mut base = self.api_url.clone();
        if !base.path().ends_with('/') {
            let directory = format!("{}/", base.path());
            base.set_path(&directory);
        }
        Ok(base.join(path.trim_start_matches('/'))?)
    }

    /// Set the timeout in seconds.
    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.http_timeout = timeout_secs;
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Rejects base URLs that are not plain HTTP(S).
    pub fn validate(&self) -> homelog_auth::Result<()> {
        match self.api_url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(homelog_auth::Error::config("API URL must use http or https")
                    .with_context(scheme.to_owned()));
            }
        }
        if self.api_url.cannot_be_a_base() || self.api_url.host().is_none() {
            return Err(homelog_auth::Error::config("API URL must have a host")
                .with_context(self.api_url.to_string()));
        }
        self.endpoint(crate::LOGIN_PATH).map_err(homelog_auth::Error::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use homelog_auth::ErrorKind;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.api_url.as_str(), DEFAULT_API_URL);
        assert_eq!(config.effective_timeout(), Duration::from_secs(30));
        assert!(config.effective_user_agent().starts_with("homelog/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_effective_timeout_uses_default_when_zero() {
        let config = ApiConfig::default().with_timeout(0);
        assert_eq!(
            config.effective_timeout(),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let with_slash = ApiConfig::new(Url::parse("http://host/api/").unwrap());
        let without_slash = ApiConfig::new(Url::parse("http://host/api").unwrap());

        for config in [with_slash, without_slash] {
            assert_eq!(
                config.endpoint("/permissions").unwrap().as_str(),
                "http://host/api/permissions"
            );
        }
    }

    #[test]
    fn test_non_http_url_rejected() {
        let config = ApiConfig::new(Url::parse("ftp://host/").unwrap());
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::Config);

        let config = ApiConfig::new(Url::parse("mailto:ada@example.com").unwrap());
        assert!(config.validate().is_err());
    }
}
