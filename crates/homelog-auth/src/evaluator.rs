//! Allow/deny decisions over a loaded grant set.

use std::borrow::Cow;

use crate::grant::PermissionStore;
use crate::level::{AccessLevelCatalog, StandardLevel};
use crate::TRACING_TARGET_EVALUATOR;

/// Outcome of a permission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub granted: bool,
    /// Identifier of the first grant that satisfied the request.
    pub grant_id: Option<i64>,
    /// Why the request was denied.
    pub reason: Option<Cow<'static, str>>,
}

impl Decision {
    /// Creates a granted decision backed by the given grant.
    pub const fn granted_by(grant_id: i64) -> Self {
        Self {
            granted: true,
            grant_id: Some(grant_id),
            reason: None,
        }
    }

    /// Creates a denied decision with a reason.
    pub fn denied(reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            granted: false,
            grant_id: None,
            reason: Some(reason.into()),
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_granted(&self) -> bool {
        self.granted
    }
}

/// Decides requests against an explicit grant set and catalog.
///
/// A request is granted iff some grant has a rank at least the requested
/// level's rank and matches the requested functionality and object exactly.
/// `None` matches only `None`: there is no wildcard expansion in either
/// direction. Evaluation is pure and never fails.
#[derive(Debug, Clone, Copy)]
pub struct PermissionEvaluator<'a> {
    store: &'a PermissionStore,
    catalog: &'a AccessLevelCatalog,
}

impl<'a> PermissionEvaluator<'a> {
    pub const fn new(store: &'a PermissionStore, catalog: &'a AccessLevelCatalog) -> Self {
        Self { store, catalog }
    }

    /// Returns true if `level` is allowed on the given scope.
    #[must_use]
    pub fn check(&self, functionality: Option<&str>, object: Option<&str>, level: &str) -> bool {
        self.decide(functionality, object, level).is_granted()
    }

    /// Like [`check`](Self::check), but reports why a request was denied.
    pub fn decide(&self, functionality: Option<&str>, object: Option<&str>, level: &str) -> Decision {
        let Some(min_rank) = self.catalog.rank_of(level) else {
            tracing::warn!(
                target: TRACING_TARGET_EVALUATOR,
                requested_level = level,
                "requested access level is unknown or has no rank"
            );
            return Decision::denied(format!("unknown access level '{level}'"));
        };

        if self.store.is_empty() {
            return Decision::denied(format!("no grants loaded for {}", self.store.principal()));
        }

        let decision = self
            .store
            .iter()
            .find(|grant| grant.satisfies(functionality, object, min_rank))
            .map_or_else(
                || {
                    Decision::denied(format!(
                        "no grant covers {level} on {}/{}",
                        functionality.unwrap_or("-"),
                        object.unwrap_or("-"),
                    ))
                },
                |grant| Decision::granted_by(grant.id),
            );

        tracing::debug!(
            target: TRACING_TARGET_EVALUATOR,
            principal = %self.store.principal(),
            functionality = ?functionality,
            object = ?object,
            requested_level = level,
            granted = decision.granted,
            "permission evaluated"
        );

        decision
    }

    /// Checks the `READ` level.
    #[must_use]
    pub fn can_read(&self, functionality: Option<&str>, object: Option<&str>) -> bool {
        self.check(functionality, object, StandardLevel::Read.as_ref())
    }

    /// Checks the `WRITE` level.
    #[must_use]
    pub fn can_write(&self, functionality: Option<&str>, object: Option<&str>) -> bool {
        self.check(functionality, object, StandardLevel::Write.as_ref())
    }

    /// Checks the `DELETE` level.
    #[must_use]
    pub fn can_delete(&self, functionality: Option<&str>, object: Option<&str>) -> bool {
        self.check(functionality, object, StandardLevel::Delete.as_ref())
    }
}
