use std::slice;

use super::{PermissionGrant, PermissionRecord, Principal, PrincipalQuery};
use crate::source::PermissionSource;
use crate::token::PermissionClaims;
use crate::{Result, TRACING_TARGET_STORE};

/// The grants held by one principal, verbatim and in backend order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionStore {
    principal: Principal,
    grants: Vec<PermissionGrant>,
}

impl PermissionStore {
    /// Creates a store from already resolved grants.
    pub fn new(principal: Principal, grants: Vec<PermissionGrant>) -> Self {
        Self { principal, grants }
    }

    /// Creates an empty store.
    pub fn empty(principal: Principal) -> Self {
        Self::new(principal, Vec::new())
    }

    /// Fetches the grants selected by `query`.
    ///
    /// # Errors
    ///
    /// Fails with an invalid principal error, without contacting `source`,
    /// when `query` names both or neither of user and role. Fails with a
    /// fetch error when the backend is unavailable.
    pub async fn load(source: &dyn PermissionSource, query: PrincipalQuery) -> Result<Self> {
        let principal = query.principal()?;
        let records = source.fetch_permissions(principal).await?;
        let store = Self::from_records(principal, records, None);

        tracing::debug!(
            target: TRACING_TARGET_STORE,
            principal = %principal,
            grants = store.len(),
            "permission store loaded"
        );

        Ok(store)
    }

    /// Builds the store of the token's user from its embedded grants.
    ///
    /// Embedded rows without a principal are attributed to the token's user.
    pub fn from_token(claims: &PermissionClaims) -> Self {
        let principal = Principal::User(claims.user.id);
        Self::from_records(principal, claims.permissions.clone(), Some(principal))
    }

    /// Converts backend rows, skipping the ones that cannot be resolved.
    pub fn from_records(
        principal: Principal,
        records: Vec<PermissionRecord>,
        fallback: Option<Principal>,
    ) -> Self {
        let mut grants = Vec::with_capacity(records.len());
        for record in records {
            match record.into_grant(fallback) {
                Ok(grant) => {
                    if !grant.is_well_formed() {
                        tracing::warn!(
                            target: TRACING_TARGET_STORE,
                            grant_id = grant.id,
                            object = ?grant.object,
                            "grant has an object scope but no functionality scope"
                        );
                    }
                    grants.push(grant);
                }
                Err(reason) => {
                    tracing::warn!(
                        target: TRACING_TARGET_STORE,
                        principal = %principal,
                        reason = %reason,
                        "skipping unresolvable permission record"
                    );
                }
            }
        }

        Self::new(principal, grants)
    }

    /// Returns the principal the grants were loaded for.
    #[inline]
    #[must_use]
    pub const fn principal(&self) -> Principal {
        self.principal
    }

    #[inline]
    #[must_use]
    pub fn grants(&self) -> &[PermissionGrant] {
        &self.grants
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, PermissionGrant> {
        self.grants.iter()
    }
}

impl<'a> IntoIterator for &'a PermissionStore {
    type IntoIter = slice::Iter<'a, PermissionGrant>;
    type Item = &'a PermissionGrant;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::source::testing::{StaticSource, standard_levels, user_record};

    fn records() -> Vec<PermissionRecord> {
        let levels = standard_levels();
        vec![
            user_record(1, 42, Some("house"), Some("houseHouse"), levels[1].clone()),
            user_record(2, 42, Some("logger"), None, levels[0].clone()),
        ]
    }

    #[tokio::test]
    async fn test_load_keeps_backend_order() {
        let source = StaticSource::new(records(), Vec::new());
        let store = PermissionStore::load(&source, PrincipalQuery::user(42))
            .await
            .unwrap();

        assert_eq!(store.principal(), Principal::User(42));
        let ids: Vec<_> = store.iter().map(|grant| grant.id).collect();
        assert_eq!(ids, [1, 2]);
    }

    #[tokio::test]
    async fn test_invalid_principal_fails_before_io() {
        let source = StaticSource::new(records(), Vec::new());
        let query = PrincipalQuery {
            user_id: Some(1),
            role_id: Some(2),
        };

        let error = PermissionStore::load(&source, query).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidPrincipal);
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_backend_is_fetch_error() {
        let source = StaticSource::unavailable();
        let error = PermissionStore::load(&source, PrincipalQuery::role(3))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Fetch);
    }

    #[test]
    fn test_unresolvable_records_are_skipped() {
        let mut rows = records();
        rows.push(PermissionRecord {
            functionality_definition: None,
            functionality_definition_id: Some(99),
            ..user_record(3, 42, None, None, standard_levels()[0].clone())
        });
        rows.push(PermissionRecord {
            user_id: None,
            ..user_record(4, 42, Some("house"), None, standard_levels()[0].clone())
        });

        let store = PermissionStore::from_records(Principal::User(42), rows, None);
        assert_eq!(store.len(), 2);
    }
}
