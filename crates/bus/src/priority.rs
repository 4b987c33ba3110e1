//! Subscription priorities

use pulse_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

/// Delivery priority; higher priorities are invoked first for each event
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low = 0,
    #[default]
    Normal = 1,
    High = 2,
    Critical = 3,
}

impl Priority {
    /// All priorities, lowest first
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Normal,
        Priority::High,
        Priority::Critical,
    ];
}

impl TryFrom<u8> for Priority {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Priority::Low),
            1 => Ok(Priority::Normal),
            2 => Ok(Priority::High),
            3 => Ok(Priority::Critical),
            other => {
                warn!(priority = other, "Rejecting unknown subscription priority");
                Err(Error::unknown_priority(other))
            }
        }
    }
}

impl FromStr for Priority {
    type Err = Error;

    /// Accepts names (`low`, `normal`, `high`, `critical`, any case) or ordinals
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Ok(ordinal) = trimmed.parse::<u8>() {
            return Priority::try_from(ordinal);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "normal" => Ok(Priority::Normal),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            _ => {
                warn!(priority = %trimmed, "Rejecting unknown subscription priority");
                Err(Error::unknown_priority(trimmed))
            }
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "LOW"),
            Priority::Normal => write!(f, "NORMAL"),
            Priority::High => write!(f, "HIGH"),
            Priority::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_is_ordinal() {
        assert!(Priority::Critical > Priority::High);
        assert!(Priority::High > Priority::Normal);
        assert!(Priority::Normal > Priority::Low);
        assert_eq!(Priority::default(), Priority::Normal);
    }

    #[test]
    fn test_try_from_ordinal() {
        for (ordinal, expected) in Priority::ALL.iter().enumerate() {
            assert_eq!(Priority::try_from(ordinal as u8).unwrap(), *expected);
        }
        let err = Priority::try_from(9).unwrap_err();
        assert!(matches!(err, Error::UnknownPriority { ref value } if value == "9"));
    }

    #[test]
    fn test_parse_names_and_ordinals() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(" critical ".parse::<Priority>().unwrap(), Priority::Critical);
        assert_eq!("0".parse::<Priority>().unwrap(), Priority::Low);
        assert!("urgent".parse::<Priority>().is_err());
        assert!("4".parse::<Priority>().is_err());
    }
}
