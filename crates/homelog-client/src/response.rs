//! Response body shapes.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::Result;

/// A body either wrapped in the `{ success, message, data }` envelope or bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiResponse<T> {
    Envelope { data: T },
    Bare(T),
}

/// Shape of an error body; every field is optional.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Decodes a success body.
pub(crate) fn decode_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let response: ApiResponse<T> = serde_json::from_slice(bytes)?;
    Ok(match response {
        ApiResponse::Envelope { data } | ApiResponse::Bare(data) => data,
    })
}

/// Extracts a readable message from an error body.
pub(crate) fn error_message(bytes: &[u8], fallback: &str) -> String {
    serde_json::from_slice::<ErrorBody>(bytes)
        .ok()
        .and_then(|body| body.message.or(body.error))
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| fallback.to_owned())
}

#[cfg(test)]
mod tests {
    use homelog_auth::level::AccessLevel;

    use super::*;

    #[test]
    fn test_envelope_and_bare_bodies() {
        let wrapped = br#"{"success":true,"message":"Success","data":[{"id":1,"name":"READ","accessLevel":10}]}"#;
        let bare = br#"[{"id":1,"name":"READ","accessLevel":10}]"#;

        let from_envelope: Vec<AccessLevel> = decode_body(wrapped).unwrap();
        let from_bare: Vec<AccessLevel> = decode_body(bare).unwrap();
        assert_eq!(from_envelope, from_bare);
        assert_eq!(from_bare[0].rank, Some(10));
    }

    #[test]
    fn test_malformed_body_is_error() {
        assert!(decode_body::<Vec<AccessLevel>>(b"<html>").is_err());
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(br#"{"success":false,"message":"No permissions"}"#, "fallback"),
            "No permissions"
        );
        assert_eq!(error_message(br#"{"error":"boom"}"#, "fallback"), "boom");
        assert_eq!(error_message(b"", "fallback"), "fallback");
    }
}
