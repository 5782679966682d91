//! Error types for backend API calls.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for API client operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error type for API client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Response body could not be decoded.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Status { status: StatusCode, message: String },
    /// The endpoint URL could not be built.
    #[error("invalid endpoint: {0}")]
    Url(#[from] url::ParseError),
}

impl From<Error> for homelog_auth::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Reqwest(e) => {
                let message = if e.is_timeout() {
                    "request timed out"
                } else if e.is_connect() {
                    "connection failed"
                } else {
                    "request failed"
                };
                let context = e.url().map(ToString::to_string);
                let error = homelog_auth::Error::fetch(message);
                match context {
                    Some(url) => error.with_context(url).with_source(e),
                    None => error.with_source(e),
                }
            }
            Error::Serde(e) => homelog_auth::Error::fetch("malformed response body").with_source(e),
            Error::Status { status, message } => {
                homelog_auth::Error::fetch(message).with_context(status.to_string())
            }
            Error::Url(e) => homelog_auth::Error::config("invalid endpoint URL").with_source(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use homelog_auth::ErrorKind;

    use super::*;

    #[test]
    fn test_status_maps_to_fetch() {
        let error: homelog_auth::Error = Error::Status {
            status: StatusCode::UNAUTHORIZED,
            message: "Invalid credentials".into(),
        }
        .into();
        assert_eq!(error.kind(), ErrorKind::Fetch);
        assert_eq!(error.message(), "Invalid credentials");
        assert_eq!(error.context(), Some("401 Unauthorized"));
    }

    #[test]
    fn test_serde_maps_to_fetch() {
        let serde = serde_json::from_str::<u8>("nope").unwrap_err();
        let error: homelog_auth::Error = Error::from(serde).into();
        assert_eq!(error.kind(), ErrorKind::Fetch);
    }
}
