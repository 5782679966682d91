//! Convenient re-exports for common use.

pub use crate::grant::{Principal, PrincipalQuery, PermissionGrant, PermissionStore};
pub use crate::level::{AccessLevel, AccessLevelCatalog, StandardLevel};
pub use crate::session::{AuthSession, SessionConfig, SessionEvent, SessionStatus};
pub use crate::storage::{FileTokenStorage, MemoryTokenStorage, StoredTokens, TokenStorage};
pub use crate::token::{BearerToken, PermissionClaims, PermissionTokenDecoder};
pub use crate::{
    AccessControl, Decision, Error, ErrorKind, PermissionEvaluator, PermissionSource, Result,
};
