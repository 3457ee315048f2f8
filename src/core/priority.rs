use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ticket priority
///
/// Every ticket that has gone through import or creation carries one of these
/// three values; free-form strings are normalized before they get here.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// All priorities, highest first
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    /// Lowercase canonical name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Map any spelling to a priority, falling back to `Medium`
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }

    /// Whether `raw` names one of the three priorities
    #[must_use]
    pub fn is_recognized(raw: &str) -> bool {
        raw.parse::<Self>().is_ok()
    }

    /// Column title used by the priority board
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::High => "High Priority",
            Self::Medium => "Medium Priority",
            Self::Low => "Low Priority",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(format!("unknown priority '{other}'")),
        }
    }
}
