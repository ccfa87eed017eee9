//! ID types for Sleeper fantasy data.

use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sleeper ids are numeric snowflakes transported as strings.
fn is_snowflake(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Type-safe wrapper for Sleeper league IDs.
///
/// League IDs are numeric strings too long for a `u32` and are kept as text
/// end to end. Parsing rejects anything that is not a non-empty run of digits.
///
/// # Examples
///
/// ```rust
/// use sleeper_sync::LeagueId;
///
/// let league_id: LeagueId = "1260107285024219136".parse().unwrap();
/// assert_eq!(league_id.as_str(), "1260107285024219136");
/// assert!("abc".parse::<LeagueId>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LeagueId(String);

impl LeagueId {
    /// Create a LeagueId, validating the external identifier format.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if is_snowflake(&id) {
            Ok(Self(id))
        } else {
            Err(SyncError::InvalidLeagueId { value: id })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LeagueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LeagueId {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s.trim())
    }
}

/// Type-safe wrapper for Sleeper user IDs
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if is_snowflake(&id) {
            Ok(Self(id))
        } else {
            Err(SyncError::InvalidUserId { value: id })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UserId {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s.trim())
    }
}

/// Type-safe wrapper for Player IDs.
///
/// Not numeric in general: team defenses use their abbreviation (`"DET"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Roster slot number within a league (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RosterId(pub u32);

impl RosterId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for RosterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
