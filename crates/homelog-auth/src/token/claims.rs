use std::time::Duration;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::grant::PermissionRecord;

/// The user snapshot embedded in a permission token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUser {
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed: Option<bool>,
}

/// Payload of the permission token.
///
/// Carries the user, the user's grants as backend rows and the session
/// expiration. The ISO-8601 `expiration` claim wins over the registered `exp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<i32>,
    pub user: TokenUser,
    #[serde(default)]
    pub permissions: Vec<PermissionRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<Timestamp>,
    /// Informational only; superuser rights arrive as explicit grants.
    #[serde(default)]
    pub superuser: bool,
    /// Registered expiration claim, seconds since the epoch.
    #[serde(rename = "exp", default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<i64>,
    /// Registered issued-at claim, seconds since the epoch.
    #[serde(rename = "iat", default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<i64>,
}

impl PermissionClaims {
    /// Returns when the session built from this token ends.
    #[must_use]
    pub fn expires_at(&self) -> Option<Timestamp> {
        self.expiration.or_else(|| {
            self.expires
                .and_then(|seconds| Timestamp::from_second(seconds).ok())
        })
    }

    /// Returns true if the token has no expiration or it is not after `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at().is_none_or(|expires_at| expires_at <= now)
    }

    /// Returns the time left until expiration, or `None` if already expired.
    #[must_use]
    pub fn remaining_lifetime_at(&self, now: Timestamp) -> Option<Duration> {
        let remaining = self.expires_at()?.duration_since(now);
        if remaining.is_positive() {
            Duration::try_from(remaining).ok()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::ToSpan;

    use super::*;
    use crate::token::testing::claims_json;

    #[test]
    fn test_decode_backend_payload() {
        let expiration = Timestamp::from_second(1_800_000_000).unwrap();
        let claims: PermissionClaims = serde_json::from_value(claims_json(expiration)).unwrap();

        assert_eq!(claims.user.id, 42);
        assert_eq!(claims.user.username, "ada");
        assert_eq!(claims.permissions.len(), 1);
        assert_eq!(claims.expires_at(), Some(expiration));
        assert!(!claims.superuser);
    }

    #[test]
    fn test_exp_is_fallback() {
        let mut json = claims_json(Timestamp::UNIX_EPOCH);
        json.as_object_mut().unwrap().remove("expiration");
        json["exp"] = 1_800_000_000.into();

        let claims: PermissionClaims = serde_json::from_value(json).unwrap();
        assert_eq!(
            claims.expires_at(),
            Some(Timestamp::from_second(1_800_000_000).unwrap())
        );
    }

    #[test]
    fn test_remaining_lifetime() {
        let now = Timestamp::from_second(1_700_000_000).unwrap();
        let expiration = now.checked_add(90.seconds()).unwrap();
        let claims: PermissionClaims = serde_json::from_value(claims_json(expiration)).unwrap();

        assert!(!claims.is_expired_at(now));
        assert_eq!(claims.remaining_lifetime_at(now), Some(Duration::from_secs(90)));
        assert!(claims.is_expired_at(expiration));
        assert_eq!(claims.remaining_lifetime_at(expiration), None);
    }

    #[test]
    fn test_missing_expiration_counts_as_expired() {
        let mut json = claims_json(Timestamp::UNIX_EPOCH);
        json.as_object_mut().unwrap().remove("expiration");

        let claims: PermissionClaims = serde_json::from_value(json).unwrap();
        assert!(claims.is_expired_at(Timestamp::UNIX_EPOCH));
    }
}
