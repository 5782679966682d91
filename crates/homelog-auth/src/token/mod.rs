//! Identity and permission tokens issued at login.

mod bearer;
mod claims;
mod decoder;

pub use self::bearer::BearerToken;
pub use self::claims::{PermissionClaims, TokenUser};
pub use self::decoder::PermissionTokenDecoder;

#[cfg(test)]
pub(crate) mod testing {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use jiff::Timestamp;
    use serde_json::{Value, json};

    /// Permission token payload for user 42 expiring at `expiration`.
    pub fn claims_json(expiration: Timestamp) -> Value {
        json!({
            "tokenType": 2,
            "user": {
                "id": 42,
                "username": "ada",
                "email": "ada@example.com",
                "createdAt": "2024-01-01T00:00:00.000Z",
                "updatedAt": "2024-01-01T00:00:00.000Z"
            },
            "permissions": [{
                "id": 1,
                "userId": 42,
                "admFunctionalityDefinitionId": 1,
                "admObjectDefinitionId": 2,
                "admAccessLevelDefinitionId": 2,
                "functionalityDefinition": {"id": 1, "name": "house"},
                "objectDefinition": {"id": 2, "name": "houseHouse"},
                "accessLevelDefinition": {"id": 2, "name": "WRITE", "accessLevel": 20}
            }],
            "expiration": expiration.to_string(),
            "superuser": false
        })
    }

    /// Encodes `payload` as a JWT with a placeholder signature.
    pub fn unsigned_token(payload: &Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.c2lnbmF0dXJl")
    }

    /// Encodes `payload` as an HS256 JWT signed with `secret`.
    pub fn signed_token(payload: &Value, secret: &[u8]) -> String {
        use jsonwebtoken::{EncodingKey, Header, encode};
        encode(&Header::default(), payload, &EncodingKey::from_secret(secret)).unwrap()
    }
}
