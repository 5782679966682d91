use serde::{Deserialize, Serialize};

use super::{PermissionGrant, Principal};
use crate::level::AccessLevel;

/// A `{ id, name }` definition joined onto a permission row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedDefinition {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
}

/// A permission row as the backend serializes it.
///
/// Foreign keys may carry the `adm` table prefix. The joined definitions are
/// optional: a row only becomes a [`PermissionGrant`] when every referenced
/// functionality and object can be named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRecord {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub role_id: Option<i64>,
    #[serde(default, alias = "admFunctionalityDefinitionId")]
    pub functionality_definition_id: Option<i64>,
    #[serde(default, alias = "admObjectDefinitionId")]
    pub object_definition_id: Option<i64>,
    #[serde(default, alias = "admAccessLevelDefinitionId")]
    pub access_level_definition_id: Option<i64>,
    #[serde(default)]
    pub functionality_definition: Option<NamedDefinition>,
    #[serde(default)]
    pub object_definition: Option<NamedDefinition>,
    #[serde(default)]
    pub access_level_definition: Option<AccessLevel>,
}

/// Why a [`PermissionRecord`] could not become a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UnresolvedRecord {
    #[error("permission {0} has neither userId nor roleId")]
    MissingPrincipal(i64),
    #[error("permission {record} references functionality {definition} without its name")]
    UnnamedFunctionality { record: i64, definition: i64 },
    #[error("permission {record} references object {definition} without its name")]
    UnnamedObject { record: i64, definition: i64 },
}

impl PermissionRecord {
    /// Converts the row into a grant.
    ///
    /// `fallback` supplies the principal for rows that carry neither
    /// `userId` nor `roleId`, such as grants embedded in a permission token.
    /// When both are set the user wins.
    pub fn into_grant(self, fallback: Option<Principal>) -> Result<PermissionGrant, UnresolvedRecord> {
        let principal = match (self.user_id, self.role_id) {
            (Some(user_id), _) => Principal::User(user_id),
            (None, Some(role_id)) => Principal::Role(role_id),
            (None, None) => fallback.ok_or(UnresolvedRecord::MissingPrincipal(self.id))?,
        };

        let functionality = resolve_name(self.functionality_definition, self.functionality_definition_id)
            .map_err(|definition| UnresolvedRecord::UnnamedFunctionality {
                record: self.id,
                definition,
            })?;
        let object = resolve_name(self.object_definition, self.object_definition_id).map_err(
            |definition| UnresolvedRecord::UnnamedObject {
                record: self.id,
                definition,
            },
        )?;

        Ok(PermissionGrant {
            id: self.id,
            principal,
            functionality,
            object,
            access_level: self.access_level_definition,
        })
    }
}

/// Resolves a joined definition to its name, failing with the dangling id.
fn resolve_name(
    definition: Option<NamedDefinition>,
    id: Option<i64>,
) -> Result<Option<String>, i64> {
    match (definition, id) {
        (Some(definition), _) => Ok(Some(definition.name)),
        (None, Some(id)) => Err(id),
        (None, None) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_prefixed_row() {
        let json = r#"{
            "id": 11,
            "userId": 42,
            "roleId": null,
            "admFunctionalityDefinitionId": 1,
            "admObjectDefinitionId": 2,
            "admAccessLevelDefinitionId": 3,
            "functionalityDefinition": {"id": 1, "name": "house"},
            "objectDefinition": {"id": 2, "name": "houseHouse"},
            "accessLevelDefinition": {"id": 3, "name": "WRITE", "accessLevel": 20}
        }"#;
        let record: PermissionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.functionality_definition_id, Some(1));

        let grant = record.into_grant(None).unwrap();
        assert_eq!(grant.principal, Principal::User(42));
        assert_eq!(grant.functionality.as_deref(), Some("house"));
        assert_eq!(grant.object.as_deref(), Some("houseHouse"));
        assert_eq!(grant.access_level.unwrap().rank, Some(20));
    }

    #[test]
    fn test_null_scopes_resolve_to_none() {
        let json = r#"{"id": -1, "accessLevelDefinition": {"id": 5, "name": "Admin", "accessLevel": 50}}"#;
        let record: PermissionRecord = serde_json::from_str(json).unwrap();
        let grant = record.into_grant(Some(Principal::User(1))).unwrap();
        assert_eq!(grant.principal, Principal::User(1));
        assert!(grant.functionality.is_none());
        assert!(grant.object.is_none());
    }

    #[test]
    fn test_missing_principal_is_unresolved() {
        let record: PermissionRecord = serde_json::from_str(r#"{"id": 5}"#).unwrap();
        assert_eq!(
            record.into_grant(None).unwrap_err(),
            UnresolvedRecord::MissingPrincipal(5)
        );
    }

    #[test]
    fn test_dangling_functionality_is_unresolved() {
        let json = r#"{"id": 6, "roleId": 2, "functionalityDefinitionId": 9}"#;
        let record: PermissionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(
            record.into_grant(None).unwrap_err(),
            UnresolvedRecord::UnnamedFunctionality {
                record: 6,
                definition: 9
            }
        );
    }

    #[test]
    fn test_missing_level_is_kept() {
        let json = r#"{"id": 7, "roleId": 2, "admAccessLevelDefinitionId": 3}"#;
        let record: PermissionRecord = serde_json::from_str(json).unwrap();
        let grant = record.into_grant(None).unwrap();
        assert_eq!(grant.principal, Principal::Role(2));
        assert!(grant.access_level.is_none());
    }
}
