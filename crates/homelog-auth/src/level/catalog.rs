use std::collections::HashSet;
use std::slice;

use super::AccessLevel;
use crate::source::PermissionSource;
use crate::{Error, Result, TRACING_TARGET_CATALOG};

/// The set of access levels known to the backend, ranked.
///
/// Loaded once per session and immutable afterwards; a refresh replaces the
/// whole catalog. Level names are unique and compared case-sensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessLevelCatalog {
    levels: Vec<AccessLevel>,
}

impl AccessLevelCatalog {
    /// Builds a catalog, rejecting duplicate level names.
    pub fn new(levels: Vec<AccessLevel>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(levels.len());
        for level in &levels {
            if !seen.insert(level.name.as_str()) {
                return Err(Error::invalid_catalog(format!(
                    "duplicate access level name '{}'",
                    level.name
                )));
            }
        }

        Ok(Self { levels })
    }

    /// Fetches the catalog from `source`.
    ///
    /// # Errors
    ///
    /// Returns a fetch error if the backend is unreachable and an invalid
    /// catalog error if the returned levels share a name.
    pub async fn load(source: &dyn PermissionSource) -> Result<Self> {
        let levels = source.fetch_access_levels().await?;
        let catalog = Self::new(levels)?;

        tracing::debug!(
            target: TRACING_TARGET_CATALOG,
            levels = catalog.len(),
            "access level catalog loaded"
        );

        Ok(catalog)
    }

    /// Returns the level with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AccessLevel> {
        self.levels.iter().find(|level| level.name == name)
    }

    /// Returns the rank of the named level.
    ///
    /// `None` for unknown names and for levels delivered without a rank.
    #[must_use]
    pub fn rank_of(&self, name: &str) -> Option<i32> {
        self.get(name).and_then(|level| level.rank)
    }

    /// Returns the number of levels.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Returns true if no levels are known.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Iterates over the levels in backend order.
    pub fn iter(&self) -> slice::Iter<'_, AccessLevel> {
        self.levels.iter()
    }
}

impl<'a> IntoIterator for &'a AccessLevelCatalog {
    type IntoIter = slice::Iter<'a, AccessLevel>;
    type Item = &'a AccessLevel;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
