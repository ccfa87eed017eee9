//! Error types for the Sleeper sync service

use std::fmt;
use std::time::Duration;

use thiserror::Error;


pub type Result<T> = std::result::Result<T, SyncError>;

/// Entity kinds used to give errors and reports enough context to diagnose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    League,
    LeagueMember,
    Player,
    Roster,
    RosterMember,
    Matchup,
    WeeklyRosterEntry,
    Stat,
    Transaction,
    NflState,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::User => "user",
            EntityKind::League => "league",
            EntityKind::LeagueMember => "league member",
            EntityKind::Player => "player",
            EntityKind::Roster => "roster",
            EntityKind::RosterMember => "roster member",
            EntityKind::Matchup => "matchup",
            EntityKind::WeeklyRosterEntry => "weekly roster entry",
            EntityKind::Stat => "stat",
            EntityKind::Transaction => "transaction",
            EntityKind::NflState => "nfl state",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: String,
        status: u16,
        retry_after: Option<Duration>,
    },

    #[error("rate limit exceeded for {endpoint} after {attempts} attempts")]
    RateLimitExceeded { endpoint: String, attempts: u32 },

    #[error("malformed response from {endpoint}: {source}")]
    MalformedResponse {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed {entity} {id}: {reason}")]
    MalformedData {
        entity: EntityKind,
        id: String,
        reason: String,
    },

    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: String },

    #[error("constraint violation writing {entity} {id}: {source}")]
    Constraint {
        entity: EntityKind,
        id: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("League ID not provided and {env_var} environment variable not set")]
    MissingLeagueId { env_var: String },

    #[error("Invalid league ID: {value:?}")]
    InvalidLeagueId { value: String },

    #[error("Invalid user ID: {value:?}")]
    InvalidUserId { value: String },

    #[error("Week {week} is outside the season range 1-{max}")]
    InvalidWeek { week: u16, max: u16 },

    #[error("Invalid season: {value:?}")]
    InvalidSeason { value: String },

    #[error("Missing configuration: {env_var} is not set")]
    MissingConfig { env_var: String },

    #[error("Invalid configuration for {key}: {value:?}")]
    InvalidConfig { key: String, value: String },
}

impl SyncError {
    /// Transport failures, 429 and 5xx responses are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Http(err) => err.is_timeout() || err.is_connect() || err.is_body(),
            SyncError::Status { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }

    /// Server-requested delay before the next attempt, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            SyncError::Status { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, SyncError::Status { status: 429, .. })
    }

    pub fn malformed(entity: EntityKind, id: impl Into<String>, reason: impl Into<String>) -> Self {
        SyncError::MalformedData {
            entity,
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Attach entity context to a store error. Constraint violations become
    /// [`SyncError::Constraint`]; anything else stays a plain database error.
    pub fn from_db(entity: EntityKind, id: impl Into<String>, err: rusqlite::Error) -> Self {
        if err.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation) {
            SyncError::Constraint {
                entity,
                id: id.into(),
                source: err,
            }
        } else {
            SyncError::Database(err)
        }
    }
}
