//! Persisted client-side token state.
//!
//! The identity token and the permission token are stored under the fixed
//! keys [`IDENTITY_TOKEN_KEY`] and [`PERMISSION_TOKEN_KEY`].

mod file;
mod memory;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use self::file::FileTokenStorage;
pub use self::memory::MemoryTokenStorage;
use crate::Result;
use crate::token::BearerToken;

/// Storage key of the identity token.
pub const IDENTITY_TOKEN_KEY: &str = "token";

/// Storage key of the permission token.
pub const PERMISSION_TOKEN_KEY: &str = "permissionToken";

/// The persisted token pair. Either half may be missing in stale state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    #[serde(rename = "token", default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<BearerToken>,
    #[serde(rename = "permissionToken", default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<BearerToken>,
}

impl StoredTokens {
    pub fn new(identity: BearerToken, permission: BearerToken) -> Self {
        Self {
            identity: Some(identity),
            permission: Some(permission),
        }
    }

    /// Returns both tokens if both are present.
    #[must_use]
    pub fn complete(self) -> Option<(BearerToken, BearerToken)> {
        self.identity.zip(self.permission)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identity.is_none() && self.permission.is_none()
    }
}

/// Backend for persisted token state.
///
/// [`AuthSession`] calls into the storage while holding its state lock, so
/// implementations must not wait on the session from within these calls.
///
/// [`AuthSession`]: crate::session::AuthSession
pub trait TokenStorage: fmt::Debug + Send + Sync {
    /// Reads the persisted tokens; missing state reads as empty.
    fn load(&self) -> Result<StoredTokens>;

    /// Replaces the persisted tokens.
    fn save(&self, tokens: &StoredTokens) -> Result<()>;

    /// Removes both tokens. Clearing empty state succeeds.
    fn clear(&self) -> Result<()>;
}
