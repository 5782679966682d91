//! Reqwest-based client for the homelog backend.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use homelog_auth::PermissionSource;
use homelog_auth::grant::{PermissionRecord, Principal};
use homelog_auth::level::AccessLevel;
use homelog_auth::token::BearerToken;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::response::{decode_body, error_message};
use crate::{
    ACCESS_LEVELS_PATH, ApiConfig, Error, LOGIN_PATH, PERMISSIONS_PATH, Result, TRACING_TARGET,
};

/// Username and password sent to the login endpoint.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Tokens issued by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginTokens {
    /// Identity token, sent as the bearer on later requests.
    pub token: BearerToken,
    /// Permission token, decoded locally to start the session.
    pub permission_token: BearerToken,
}

/// Inner client that holds the HTTP client and configuration.
struct ApiClientInner {
    http: Client,
    config: ApiConfig,
    bearer: RwLock<Option<BearerToken>>,
}

/// HTTP client for the homelog backend.
///
/// Implements [`PermissionSource`] so it can feed
/// [`AccessLevelCatalog::load`](homelog_auth::level::AccessLevelCatalog::load)
/// and [`PermissionStore::load`](homelog_auth::grant::PermissionStore::load).
/// Cheap to clone; clones share the bearer token.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.inner.config)
            .field("authenticated", &self.bearer_token().is_some())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL is unusable or the HTTP
    /// client cannot be built.
    pub fn new(config: ApiConfig) -> homelog_auth::Result<Self> {
        config.validate()?;

        let timeout = config.effective_timeout();
        tracing::debug!(
            target: TRACING_TARGET,
            api_url = %config.api_url,
            timeout_ms = timeout.as_millis(),
            "creating API client"
        );

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(config.effective_user_agent())
            .build()
            .map_err(|e| homelog_auth::Error::config("failed to create HTTP client").with_source(e))?;

        let inner = ApiClientInner {
            http,
            config,
            bearer: RwLock::new(None),
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Sets or clears the identity token sent with every request.
    pub fn set_bearer_token(&self, token: Option<BearerToken>) {
        *self.inner.bearer.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Returns the identity token currently sent with requests.
    #[must_use]
    pub fn bearer_token(&self) -> Option<BearerToken> {
        self.inner
            .bearer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Exchanges credentials for an identity token and a permission token.
    pub async fn login(&self, credentials: &Credentials) -> homelog_auth::Result<LoginTokens> {
        tracing::debug!(
            target: TRACING_TARGET,
            username = %credentials.username,
            "logging in"
        );

        let url = self.inner.config.endpoint(LOGIN_PATH)?;
        let request = self.inner.http.post(url).json(credentials);
        let tokens: LoginTokens = self.send(request).await?;

        tracing::info!(
            target: TRACING_TARGET,
            username = %credentials.username,
            "login succeeded"
        );

        Ok(tokens)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.inner.config.endpoint(path)?;
        self.send(self.inner.http.get(url).query(query)).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let request = match self.bearer_token() {
            Some(token) => request.header(AUTHORIZATION, token.authorization()),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let url = response.url().clone();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = error_message(&body, status.canonical_reason().unwrap_or("request failed"));
            tracing::warn!(
                target: TRACING_TARGET,
                url = %url,
                status = status.as_u16(),
                message = %message,
                "backend returned an error"
            );
            return Err(Error::Status { status, message });
        }

        tracing::trace!(
            target: TRACING_TARGET,
            url = %url,
            status = status.as_u16(),
            bytes = body.len(),
            "backend response received"
        );

        decode_body(&body)
    }
}

#[async_trait::async_trait]
impl PermissionSource for ApiClient {
    async fn fetch_permissions(&self, principal: Principal) -> homelog_auth::Result<Vec<PermissionRecord>> {
        let (key, value) = principal.query_pair();
        let records = self.get(PERMISSIONS_PATH, &[(key, value)]).await?;
        Ok(records)
    }

    async fn fetch_access_levels(&self) -> homelog_auth::Result<Vec<AccessLevel>> {
        let levels = self.get(ACCESS_LEVELS_PATH, &[]).await?;
        Ok(levels)
    }
}
