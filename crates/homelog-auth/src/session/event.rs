use jiff::Timestamp;
use serde::Serialize;
use strum::{AsRefStr, Display, IntoStaticStr};

use crate::token::{BearerToken, PermissionClaims};

/// Whether a session is currently established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[derive(AsRefStr, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Anonymous,
    Authenticated,
}

/// Session lifecycle notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A session was established by login or restore.
    LoggedIn { user_id: i64 },
    /// The session was ended explicitly.
    LoggedOut,
    /// The permission token expired; the user must sign in again at `redirect`.
    Expired { redirect: String },
}

/// An established session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    pub identity_token: BearerToken,
    pub permission_token: BearerToken,
    pub claims: PermissionClaims,
    pub expires_at: Timestamp,
}

impl ActiveSession {
    #[inline]
    #[must_use]
    pub fn user_id(&self) -> i64 {
        self.claims.user.id
    }

    #[inline]
    #[must_use]
    pub fn is_superuser(&self) -> bool {
        self.claims.superuser
    }
}
