//! Shared holder of the currently loaded access state.

use std::sync::{Arc, PoisonError, RwLock};

use tokio_util::sync::CancellationToken;

use crate::grant::{PermissionStore, PrincipalQuery};
use crate::level::AccessLevelCatalog;
use crate::source::PermissionSource;
use crate::{Decision, PermissionEvaluator, Result, TRACING_TARGET_STORE};

#[derive(Debug, Default)]
struct AccessState {
    store: Option<Arc<PermissionStore>>,
    catalog: Option<Arc<AccessLevelCatalog>>,
}

/// The grant set and catalog in use, shared between the session and callers.
///
/// Cheap to clone. Checks read a snapshot of both values and deny while
/// either one is missing. Loads replace a value only after they complete.
#[derive(Debug, Clone, Default)]
pub struct AccessControl {
    inner: Arc<RwLock<AccessState>>,
}

impl AccessControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the loaded grant set.
    pub fn set_permissions(&self, store: PermissionStore) {
        self.write(|state| state.store = Some(Arc::new(store)));
    }

    /// Replaces the loaded catalog.
    pub fn set_catalog(&self, catalog: AccessLevelCatalog) {
        self.write(|state| state.catalog = Some(Arc::new(catalog)));
    }

    /// Drops the grant set, keeping the catalog.
    pub fn clear_permissions(&self) {
        self.write(|state| state.store = None);
    }

    /// Drops both the grant set and the catalog.
    pub fn clear(&self) {
        self.write(|state| *state = AccessState::default());
    }

    #[must_use]
    pub fn permissions(&self) -> Option<Arc<PermissionStore>> {
        self.read(|state| state.store.clone())
    }

    #[must_use]
    pub fn catalog(&self) -> Option<Arc<AccessLevelCatalog>> {
        self.read(|state| state.catalog.clone())
    }

    /// Returns true once both the grant set and the catalog are loaded.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.read(|state| state.store.is_some() && state.catalog.is_some())
    }

    /// Evaluates a request against the current snapshot.
    pub fn decide(&self, functionality: Option<&str>, object: Option<&str>, level: &str) -> Decision {
        let (store, catalog) = self.read(|state| (state.store.clone(), state.catalog.clone()));
        match (store, catalog) {
            (Some(store), Some(catalog)) => {
                PermissionEvaluator::new(&store, &catalog).decide(functionality, object, level)
            }
            _ => Decision::denied("access state is not loaded"),
        }
    }

    #[must_use]
    pub fn check(&self, functionality: Option<&str>, object: Option<&str>, level: &str) -> bool {
        self.decide(functionality, object, level).is_granted()
    }

    #[must_use]
    pub fn can_read(&self, functionality: Option<&str>, object: Option<&str>) -> bool {
        self.snapshot().is_some_and(|(store, catalog)| {
            PermissionEvaluator::new(&store, &catalog).can_read(functionality, object)
        })
    }

    #[must_use]
    pub fn can_write(&self, functionality: Option<&str>, object: Option<&str>) -> bool {
        self.snapshot().is_some_and(|(store, catalog)| {
            PermissionEvaluator::new(&store, &catalog).can_write(functionality, object)
        })
    }

    #[must_use]
    pub fn can_delete(&self, functionality: Option<&str>, object: Option<&str>) -> bool {
        self.snapshot().is_some_and(|(store, catalog)| {
            PermissionEvaluator::new(&store, &catalog).can_delete(functionality, object)
        })
    }

    /// Reloads the grant set for `query`.
    ///
    /// Returns `Ok(false)` if `cancel` fired first. On error or cancellation
    /// the previous grant set stays in place.
    pub async fn refresh_permissions(
        &self,
        source: &dyn PermissionSource,
        query: PrincipalQuery,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let store = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!(target: TRACING_TARGET_STORE, "permission refresh cancelled");
                return Ok(false);
            }
            store = PermissionStore::load(source, query) => store?,
        };

        self.set_permissions(store);
        Ok(true)
    }

    /// Reloads the catalog.
    ///
    /// Same cancellation and failure semantics as
    /// [`refresh_permissions`](Self::refresh_permissions).
    pub async fn refresh_catalog(
        &self,
        source: &dyn PermissionSource,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let catalog = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!(target: TRACING_TARGET_STORE, "catalog refresh cancelled");
                return Ok(false);
            }
            catalog = AccessLevelCatalog::load(source) => catalog?,
        };

        self.set_catalog(catalog);
        Ok(true)
    }

    fn snapshot(&self) -> Option<(Arc<PermissionStore>, Arc<AccessLevelCatalog>)> {
        self.read(|state| Some((state.store.clone()?, state.catalog.clone()?)))
    }

    fn read<T>(&self, f: impl FnOnce(&AccessState) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn write(&self, f: impl FnOnce(&mut AccessState)) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::grant::Principal;
    use crate::source::testing::{StaticSource, standard_levels, user_record};

    fn source() -> StaticSource {
        let levels = standard_levels();
        StaticSource::new(
            vec![user_record(1, 42, Some("house"), Some("houseHouse"), levels[1].clone())],
            levels,
        )
    }

    #[test]
    fn test_checks_deny_before_load() {
        let access = AccessControl::new();
        assert!(!access.is_ready());
        assert!(!access.can_read(Some("house"), Some("houseHouse")));

        access.set_catalog(AccessLevelCatalog::new(standard_levels()).unwrap());
        assert!(!access.can_read(Some("house"), Some("houseHouse")));
        assert!(!access.decide(Some("house"), None, "READ").is_granted());
    }

    #[tokio::test]
    async fn test_refresh_then_check() {
        let access = AccessControl::new();
        let source = source();
        let cancel = CancellationToken::new();

        assert!(access.refresh_catalog(&source, &cancel).await.unwrap());
        assert!(
            access
                .refresh_permissions(&source, PrincipalQuery::user(42), &cancel)
                .await
                .unwrap()
        );

        assert!(access.is_ready());
        assert!(access.can_write(Some("house"), Some("houseHouse")));
        assert!(access.can_read(Some("house"), Some("houseHouse")));
        assert!(!access.can_delete(Some("house"), Some("houseHouse")));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_state() {
        let access = AccessControl::new();
        let cancel = CancellationToken::new();
        access
            .refresh_permissions(&source(), PrincipalQuery::user(42), &cancel)
            .await
            .unwrap();

        let error = access
            .refresh_permissions(&StaticSource::unavailable(), PrincipalQuery::user(42), &cancel)
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Fetch);
        assert_eq!(access.permissions().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_refresh_keeps_previous_state() {
        let access = AccessControl::new();
        access.set_permissions(PermissionStore::empty(Principal::User(7)));

        let cancel = CancellationToken::new();
        cancel.cancel();
        let applied = access
            .refresh_permissions(&source(), PrincipalQuery::user(42), &cancel)
            .await
            .unwrap();

        assert!(!applied);
        assert_eq!(access.permissions().unwrap().principal(), Principal::User(7));
    }

    #[test]
    fn test_clear_permissions_keeps_catalog() {
        let access = AccessControl::new();
        access.set_catalog(AccessLevelCatalog::new(standard_levels()).unwrap());
        access.set_permissions(PermissionStore::empty(Principal::User(1)));

        access.clear_permissions();
        assert!(access.permissions().is_none());
        assert!(access.catalog().is_some());

        access.clear();
        assert!(access.catalog().is_none());
    }
}
