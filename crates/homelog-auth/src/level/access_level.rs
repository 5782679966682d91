use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// A named clearance tier with its numeric rank.
///
/// The backend serializes the rank as `accessLevel`. A level without a rank is
/// kept as delivered but can neither satisfy nor be requested.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessLevel {
    /// Backend identifier of the definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Unique level name, e.g. `READ`.
    pub name: String,
    /// Rank of the level; higher ranks subsume lower ones.
    #[serde(rename = "accessLevel", default)]
    pub rank: Option<i32>,
}

impl AccessLevel {
    /// Creates a ranked access level without a backend identifier.
    pub fn new(name: impl Into<String>, rank: i32) -> Self {
        Self {
            id: None,
            name: name.into(),
            rank: Some(rank),
        }
    }

    /// Sets the backend identifier.
    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Returns true if this level's rank is at least `required`.
    #[inline]
    #[must_use]
    pub fn covers(&self, required: i32) -> bool {
        self.rank.is_some_and(|rank| rank >= required)
    }
}

/// Conventional level names used by the `can_*` shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum StandardLevel {
    /// View data.
    Read,
    /// Create and update data.
    Write,
    /// Remove data.
    Delete,
}
