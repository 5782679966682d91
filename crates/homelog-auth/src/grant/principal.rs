use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString, IntoStaticStr};

use crate::{Error, Result};

/// Whether a grant is bound to a user or to a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, EnumString, IntoStaticStr, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PrincipalScope {
    User,
    Role,
}

/// The subject a grant set belongs to.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Principal {
    /// A single user.
    #[display("user {_0}")]
    User(i64),
    /// Every member of a role.
    #[display("role {_0}")]
    Role(i64),
}

impl Principal {
    /// Returns the scope of this principal.
    #[must_use]
    pub const fn scope(self) -> PrincipalScope {
        match self {
            Self::User(_) => PrincipalScope::User,
            Self::Role(_) => PrincipalScope::Role,
        }
    }

    /// Returns the user or role identifier.
    #[must_use]
    pub const fn id(self) -> i64 {
        match self {
            Self::User(id) | Self::Role(id) => id,
        }
    }

    /// Returns the query parameter name and value used by the backend.
    #[must_use]
    pub fn query_pair(self) -> (&'static str, String) {
        match self {
            Self::User(id) => ("userId", id.to_string()),
            Self::Role(id) => ("roleId", id.to_string()),
        }
    }
}

/// An unvalidated principal selector, as it arrives from callers.
///
/// Exactly one of `user_id` and `role_id` must be set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<i64>,
}

impl PrincipalQuery {
    /// Selects the grants of a user.
    #[must_use]
    pub const fn user(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            role_id: None,
        }
    }

    /// Selects the grants of a role.
    #[must_use]
    pub const fn role(role_id: i64) -> Self {
        Self {
            user_id: None,
            role_id: Some(role_id),
        }
    }

    /// Validates the query into a [`Principal`].
    pub fn principal(self) -> Result<Principal> {
        Principal::try_from(self)
    }
}

impl TryFrom<PrincipalQuery> for Principal {
    type Error = Error;

    fn try_from(query: PrincipalQuery) -> Result<Self> {
        match (query.user_id, query.role_id) {
            (Some(user_id), None) => Ok(Self::User(user_id)),
            (None, Some(role_id)) => Ok(Self::Role(role_id)),
            (Some(_), Some(_)) => Err(Error::invalid_principal(
                "both userId and roleId were given",
            )),
            (None, None) => Err(Error::invalid_principal(
                "neither userId nor roleId was given",
            )),
        }
    }
}

impl From<Principal> for PrincipalQuery {
    fn from(principal: Principal) -> Self {
        match principal {
            Principal::User(id) => Self::user(id),
            Principal::Role(id) => Self::role(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_exactly_one_selector() {
        assert_eq!(PrincipalQuery::user(7).principal().unwrap(), Principal::User(7));
        assert_eq!(PrincipalQuery::role(3).principal().unwrap(), Principal::Role(3));
    }

    #[test]
    fn test_both_or_neither_rejected() {
        let both = PrincipalQuery {
            user_id: Some(1),
            role_id: Some(2),
        };
        assert_eq!(
            both.principal().unwrap_err().kind(),
            ErrorKind::InvalidPrincipal
        );
        assert_eq!(
            PrincipalQuery::default().principal().unwrap_err().kind(),
            ErrorKind::InvalidPrincipal
        );
    }

    #[test]
    fn test_query_pair_and_display() {
        assert_eq!(Principal::Role(9).query_pair(), ("roleId", "9".to_owned()));
        assert_eq!(Principal::User(4).to_string(), "user 4");
        assert_eq!(Principal::User(4).scope().as_ref(), "USER");
    }
}
