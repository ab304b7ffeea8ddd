//! Access privilege flags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named capability flag grantable per user.
///
/// A grant with this flag is an open/closed time interval in the access
/// store; a user may hold both variants at once (the store enforces no
/// mutual exclusion).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Privilege {
    /// Bypasses the daily usage quota.
    Advanced,

    /// Excluded from using the bot entirely.
    Blocked,
}

impl Privilege {
    /// Get the privilege name as stored in the database.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Advanced => "advanced",
            Self::Blocked => "blocked",
        }
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown privilege name.
#[derive(Debug, thiserror::Error)]
#[error("unknown privilege: {0:?}")]
pub struct PrivilegeParseError(pub String);

impl FromStr for Privilege {
    type Err = PrivilegeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "advanced" => Ok(Self::Advanced),
            "blocked" => Ok(Self::Blocked),
            other => Err(PrivilegeParseError(other.to_string())),
        }
    }
}
