use crate::Result;
use crate::grant::{PermissionRecord, Principal};
use crate::level::AccessLevel;

/// Backend seam for loading grants and access levels.
///
/// Implemented by the HTTP client; tests substitute in-memory sources.
#[async_trait::async_trait]
pub trait PermissionSource: Send + Sync {
    /// Fetches the permission rows bound to `principal`, in backend order.
    async fn fetch_permissions(&self, principal: Principal) -> Result<Vec<PermissionRecord>>;

    /// Fetches every access level definition.
    async fn fetch_access_levels(&self) -> Result<Vec<AccessLevel>>;
}
