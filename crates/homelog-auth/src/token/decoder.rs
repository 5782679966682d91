use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use super::PermissionClaims;
use crate::{Error, Result, TRACING_TARGET_TOKEN};

/// Decodes permission tokens into [`PermissionClaims`].
///
/// Without a secret the payload is decoded but the signature is not checked:
/// the claims are trusted for UI gating only and the backend stays the
/// enforcement point. With the backend's permission-token secret the token is
/// verified as HS256.
///
/// Expiry is not checked here; see [`PermissionClaims::is_expired_at`].
#[derive(Clone, Default)]
pub struct PermissionTokenDecoder {
    key: Option<DecodingKey>,
}

impl PermissionTokenDecoder {
    /// Creates a decoder that skips signature verification.
    pub fn unverified() -> Self {
        Self::default()
    }

    /// Creates a decoder that verifies HS256 signatures with `secret`.
    pub fn with_secret(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: Some(DecodingKey::from_secret(secret.as_ref())),
        }
    }

    /// Returns true if signatures are verified.
    #[must_use]
    pub fn verifies_signature(&self) -> bool {
        self.key.is_some()
    }

    /// Decodes `token`.
    ///
    /// # Errors
    ///
    /// Returns a token decode error if the token is not a JWT, its payload is
    /// not a permission token, or verification is enabled and fails.
    pub fn decode(&self, token: &str) -> Result<PermissionClaims> {
        let claims = match &self.key {
            Some(key) => Self::decode_verified(token, key),
            None => Self::decode_unverified(token),
        }
        .inspect_err(|error| {
            tracing::warn!(
                target: TRACING_TARGET_TOKEN,
                error = %error,
                verified = self.verifies_signature(),
                "failed to decode permission token"
            );
        })?;

        tracing::trace!(
            target: TRACING_TARGET_TOKEN,
            user_id = claims.user.id,
            grants = claims.permissions.len(),
            verified = self.verifies_signature(),
            "permission token decoded"
        );

        Ok(claims)
    }

    fn decode_verified(token: &str, key: &DecodingKey) -> Result<PermissionClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        jsonwebtoken::decode::<PermissionClaims>(token, key, &validation)
            .map(|data| data.claims)
            .map_err(|e| Error::token_decode("permission token failed verification").with_source(e))
    }

    fn decode_unverified(token: &str) -> Result<PermissionClaims> {
        let mut segments = token.split('.');
        let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
            (Some(_), Some(payload), Some(_), None) => payload,
            _ => return Err(Error::token_decode("permission token is not a JWT")),
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| Error::token_decode("permission token payload is not base64url").with_source(e))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| Error::token_decode("permission token payload is malformed").with_source(e))
    }
}

impl fmt::Debug for PermissionTokenDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionTokenDecoder")
            .field("verifies_signature", &self.verifies_signature())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::ErrorKind;
    use crate::token::testing::{claims_json, signed_token, unsigned_token};

    fn expiration() -> Timestamp {
        Timestamp::from_second(1_800_000_000).unwrap()
    }

    #[test]
    fn test_unverified_decode() {
        let token = unsigned_token(&claims_json(expiration()));
        let claims = PermissionTokenDecoder::unverified().decode(&token).unwrap();
        assert_eq!(claims.user.id, 42);
        assert_eq!(claims.expires_at(), Some(expiration()));
    }

    #[test]
    fn test_garbage_is_token_error() {
        let decoder = PermissionTokenDecoder::unverified();
        for token in ["", "abc", "a.b", "a.!!!.c", "a.e30.c.d"] {
            let error = decoder.decode(token).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::TokenDecode, "{token}");
        }
    }

    #[test]
    fn test_payload_without_user_is_rejected() {
        let token = unsigned_token(&serde_json::json!({"expiration": "2030-01-01T00:00:00Z"}));
        let error = PermissionTokenDecoder::unverified().decode(&token).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::TokenDecode);
    }

    #[test]
    fn test_verified_decode() {
        let token = signed_token(&claims_json(expiration()), b"permission-secret");
        let decoder = PermissionTokenDecoder::with_secret("permission-secret");
        assert!(decoder.verifies_signature());
        assert_eq!(decoder.decode(&token).unwrap().user.id, 42);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = signed_token(&claims_json(expiration()), b"permission-secret");
        let error = PermissionTokenDecoder::with_secret("identity-secret")
            .decode(&token)
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::TokenDecode);
    }

    #[test]
    fn test_placeholder_signature_fails_verification() {
        let token = unsigned_token(&claims_json(expiration()));
        let decoder = PermissionTokenDecoder::with_secret("permission-secret");
        assert!(decoder.decode(&token).is_err());
    }
}
