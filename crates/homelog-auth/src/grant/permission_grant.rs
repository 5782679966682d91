use serde::{Deserialize, Serialize};

use super::Principal;
use crate::level::AccessLevel;

/// One permission row: a principal holding an access level on a
/// `(functionality, object)` scope.
///
/// `None` in `functionality` or `object` is a scope of its own and is matched
/// by identity, not as a wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    /// Backend identifier of the row.
    pub id: i64,
    /// Who holds the grant.
    #[serde(with = "principal_serde")]
    pub principal: Principal,
    /// Functionality name, or `None` for the functionality-less scope.
    pub functionality: Option<String>,
    /// Object name, or `None` for the object-less scope.
    pub object: Option<String>,
    /// Granted level. A grant without one never matches.
    pub access_level: Option<AccessLevel>,
}

impl PermissionGrant {
    /// Creates a grant with no functionality, object or level.
    pub fn new(id: i64, principal: Principal) -> Self {
        Self {
            id,
            principal,
            functionality: None,
            object: None,
            access_level: None,
        }
    }

    #[must_use]
    pub fn with_functionality(mut self, functionality: impl Into<String>) -> Self {
        self.functionality = Some(functionality.into());
        self
    }

    #[must_use]
    pub fn with_object(mut self, object: impl Into<String>) -> Self {
        self.object = Some(object.into());
        self
    }

    #[must_use]
    pub fn with_access_level(mut self, access_level: AccessLevel) -> Self {
        self.access_level = Some(access_level);
        self
    }

    /// Returns true if this grant allows `min_rank` on exactly the given scope.
    #[must_use]
    pub fn satisfies(
        &self,
        functionality: Option<&str>,
        object: Option<&str>,
        min_rank: i32,
    ) -> bool {
        self.access_level
            .as_ref()
            .is_some_and(|level| level.covers(min_rank))
            && self.functionality.as_deref() == functionality
            && self.object.as_deref() == object
    }

    /// Returns false for an object scope without a functionality scope.
    ///
    /// Such rows are kept but can only be reached by a request for that
    /// object with no functionality.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.functionality.is_some() || self.object.is_none()
    }
}

mod principal_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Principal;
    use crate::grant::PrincipalScope;

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Repr {
        principal_scope: PrincipalScope,
        principal_id: i64,
    }

    pub fn serialize<S: Serializer>(principal: &Principal, serializer: S) -> Result<S::Ok, S::Error> {
        Repr {
            principal_scope: principal.scope(),
            principal_id: principal.id(),
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Principal, D::Error> {
        let repr = Repr::deserialize(deserializer)?;
        Ok(match repr.principal_scope {
            PrincipalScope::User => Principal::User(repr.principal_id),
            PrincipalScope::Role => Principal::Role(repr.principal_id),
        })
    }
}
