use std::fmt;

use strum::EnumString;

/// What changed on a channel.
///
/// Actions the backend may add later are kept verbatim in [`SyncAction::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum SyncAction {
    Add,
    Update,
    Delete,
    FloorAdd,
    FloorUpdate,
    FloorDelete,
    LoggerAdd,
    LoggerUpdate,
    LoggerDelete,
    #[strum(default)]
    Other(String),
}

impl SyncAction {
    /// Returns the wire name of the action.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Add => "add",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::FloorAdd => "floorAdd",
            Self::FloorUpdate => "floorUpdate",
            Self::FloorDelete => "floorDelete",
            Self::LoggerAdd => "loggerAdd",
            Self::LoggerUpdate => "loggerUpdate",
            Self::LoggerDelete => "loggerDelete",
            Self::Other(action) => action,
        }
    }

    /// Parses a wire name; never fails.
    #[must_use]
    pub fn parse(action: &str) -> Self {
        action
            .parse()
            .unwrap_or_else(|_| Self::Other(action.to_owned()))
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_actions() {
        assert_eq!(SyncAction::parse("add"), SyncAction::Add);
        assert_eq!(SyncAction::parse("floorDelete"), SyncAction::FloorDelete);
        assert_eq!(SyncAction::parse("loggerUpdate"), SyncAction::LoggerUpdate);
        assert_eq!(SyncAction::LoggerAdd.to_string(), "loggerAdd");
    }

    #[test]
    fn test_unknown_action_is_kept() {
        let action = SyncAction::parse("sensorCalibrate");
        assert_eq!(action, SyncAction::Other("sensorCalibrate".into()));
        assert_eq!(action.as_str(), "sensorCalibrate");
    }
}
