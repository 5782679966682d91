//! Permission grants and the per-principal grant store.

mod permission_grant;
mod principal;
mod record;
mod store;

pub use self::permission_grant::PermissionGrant;
pub use self::principal::{Principal, PrincipalQuery, PrincipalScope};
pub use self::record::{NamedDefinition, PermissionRecord, UnresolvedRecord};
pub use self::store::PermissionStore;
