use std::fmt;
use std::str::FromStr;

/// A push notification channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncChannel {
    /// `house`: the list of houses.
    Houses,
    /// `house-{id}`: one house with its floors and loggers.
    House(i64),
    /// `loggerData_{id}`: readings of one logger.
    LoggerData(i64),
    /// `logger_{id}`: last-seen state of one logger.
    Logger(i64),
}

/// A channel name that does not match any known channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sync channel '{0}'")]
pub struct ChannelParseError(pub String);

impl fmt::Display for SyncChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Houses => f.write_str("house"),
            Self::House(id) => write!(f, "house-{id}"),
            Self::LoggerData(id) => write!(f, "loggerData_{id}"),
            Self::Logger(id) => write!(f, "logger_{id}"),
        }
    }
}

impl FromStr for SyncChannel {
    type Err = ChannelParseError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        if name == "house" {
            return Ok(Self::Houses);
        }

        let numbered: [(&str, fn(i64) -> Self); 3] = [
            ("house-", Self::House),
            ("loggerData_", Self::LoggerData),
            ("logger_", Self::Logger),
        ];

        let parsed = numbered.into_iter().find_map(|(prefix, make)| {
            let id = name.strip_prefix(prefix)?.parse().ok()?;
            Some(make(id))
        });

        parsed.ok_or_else(|| ChannelParseError(name.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_channels() {
        assert_eq!("house".parse(), Ok(SyncChannel::Houses));
        assert_eq!("house-12".parse(), Ok(SyncChannel::House(12)));
        assert_eq!("loggerData_5".parse(), Ok(SyncChannel::LoggerData(5)));
        assert_eq!("logger_5".parse(), Ok(SyncChannel::Logger(5)));
    }

    #[test]
    fn test_display_matches_backend_names() {
        assert_eq!(SyncChannel::Houses.to_string(), "house");
        assert_eq!(SyncChannel::House(3).to_string(), "house-3");
        assert_eq!(SyncChannel::LoggerData(9).to_string(), "loggerData_9");
        assert_eq!(SyncChannel::Logger(9).to_string(), "logger_9");
    }

    #[test]
    fn test_reject_unknown_channels() {
        for name in ["houses", "house-", "house-x", "loggerData_", "pcb-1", "logger-1", ""] {
            assert!(name.parse::<SyncChannel>().is_err(), "{name}");
        }
    }
}
