//! Time-related types for NFL seasons and weeks.

use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type-safe wrapper for Season years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Season(pub u16);

impl Season {
    pub fn new(year: u16) -> Self {
        Self(year)
    }

    pub fn as_u16(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Season {
    type Err = SyncError;

    // Sleeper sends seasons as strings ("2024").
    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u16>()
            .ok()
            .filter(|year| (1900..=2999).contains(year))
            .map(Self)
            .ok_or_else(|| SyncError::InvalidSeason {
                value: s.to_string(),
            })
    }
}

/// Type-safe wrapper for Week numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Week(pub u16);

impl Week {
    /// Last scoring period of an NFL season, playoffs included.
    pub const MAX: u16 = 18;

    pub fn new(week: u16) -> Self {
        Self(week)
    }

    /// Build a week, rejecting anything outside `1..=Week::MAX`.
    pub fn checked(week: u16) -> Result<Self> {
        let week = Self(week);
        week.validate()?;
        Ok(week)
    }

    pub fn validate(&self) -> Result<()> {
        if (1..=Self::MAX).contains(&self.0) {
            Ok(())
        } else {
            Err(SyncError::InvalidWeek {
                week: self.0,
                max: Self::MAX,
            })
        }
    }

    pub fn as_u16(&self) -> u16 {
        self.0
    }
}

impl Default for Week {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for Week {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Week {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        let week = s.trim().parse::<u16>().map_err(|_| SyncError::InvalidWeek {
            week: 0,
            max: Self::MAX,
        })?;
        Self::checked(week)
    }
}
