//! Explicit configuration for the sync service.
//!
//! Everything the service needs from the environment is read once into a
//! [`SyncConfig`] and handed to [`SyncService`](crate::sync::SyncService) at
//! construction. Nothing below reads process state after that point.

use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

use crate::{
    cli::types::time::Season,
    core::retry::RetryPolicy,
    error::{Result, SyncError},
};

pub const DATABASE_URL_ENV_VAR: &str = "DATABASE_URL";
pub const API_BASE_URL_ENV_VAR: &str = "SLEEPER_API_BASE_URL";
pub const RATE_LIMIT_ENV_VAR: &str = "SLEEPER_RATE_LIMIT";
pub const TIMEOUT_ENV_VAR: &str = "SLEEPER_TIMEOUT_SECS";
pub const MAX_RETRIES_ENV_VAR: &str = "SLEEPER_MAX_RETRIES";
pub const SPORT_ENV_VAR: &str = "SLEEPER_SPORT";
pub const SEASON_ENV_VAR: &str = "SLEEPER_SEASON";

/// Base path for the Sleeper v1 API.
pub const SLEEPER_BASE_URL: &str = "https://api.sleeper.app/v1";

/// Where the SQLite store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    File(PathBuf),
    Memory,
}

impl DatabaseLocation {
    /// Parse a connection string: `sqlite::memory:`, `sqlite://path`,
    /// `sqlite:path`, or a bare file path.
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() {
            return Err(SyncError::InvalidConfig {
                key: DATABASE_URL_ENV_VAR.to_string(),
                value: url.to_string(),
            });
        }
        if url == "sqlite::memory:" || url == ":memory:" {
            return Ok(Self::Memory);
        }
        if let Some(scheme_end) = url.find("://") {
            let (scheme, rest) = url.split_at(scheme_end);
            if scheme != "sqlite" {
                return Err(SyncError::InvalidConfig {
                    key: DATABASE_URL_ENV_VAR.to_string(),
                    value: url.to_string(),
                });
            }
            let path = &rest[3..];
            if path.is_empty() {
                return Err(SyncError::InvalidConfig {
                    key: DATABASE_URL_ENV_VAR.to_string(),
                    value: url.to_string(),
                });
            }
            return Ok(Self::File(PathBuf::from(path)));
        }
        let path = url.strip_prefix("sqlite:").unwrap_or(url);
        Ok(Self::File(PathBuf::from(path)))
    }
}

/// Configuration for the Sleeper client and the sync service.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub database: DatabaseLocation,
    pub api_base_url: String,
    pub requests_per_minute: NonZeroU32,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub sport: String,
    /// Season to enumerate leagues for; `None` asks Sleeper for the current one.
    pub season: Option<Season>,
}

impl SyncConfig {
    /// Configuration with defaults for everything except the database.
    pub fn new(database: DatabaseLocation) -> Self {
        Self {
            database,
            api_base_url: SLEEPER_BASE_URL.to_string(),
            requests_per_minute: NonZeroU32::new(60).unwrap_or(NonZeroU32::MIN),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            sport: "nfl".to_string(),
            season: None,
        }
    }

    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// `DATABASE_URL` is required; the rest fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup(DATABASE_URL_ENV_VAR).ok_or_else(|| SyncError::MissingConfig {
            env_var: DATABASE_URL_ENV_VAR.to_string(),
        })?;
        let mut config = Self::new(DatabaseLocation::parse(&database_url)?);

        if let Some(url) = lookup(API_BASE_URL_ENV_VAR) {
            config = config.with_base_url(url);
        }
        if let Some(raw) = lookup(RATE_LIMIT_ENV_VAR) {
            let per_minute = raw
                .trim()
                .parse::<u32>()
                .ok()
                .and_then(NonZeroU32::new)
                .ok_or_else(|| invalid(RATE_LIMIT_ENV_VAR, &raw))?;
            config.requests_per_minute = per_minute;
        }
        if let Some(raw) = lookup(TIMEOUT_ENV_VAR) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| invalid(TIMEOUT_ENV_VAR, &raw))?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = lookup(MAX_RETRIES_ENV_VAR) {
            config.retry.max_retries = raw
                .trim()
                .parse::<u32>()
                .map_err(|_| invalid(MAX_RETRIES_ENV_VAR, &raw))?;
        }
        if let Some(sport) = lookup(SPORT_ENV_VAR) {
            if sport.trim().is_empty() {
                return Err(invalid(SPORT_ENV_VAR, &sport));
            }
            config.sport = sport.trim().to_lowercase();
        }
        if let Some(raw) = lookup(SEASON_ENV_VAR) {
            let season = raw
                .parse::<Season>()
                .map_err(|_| invalid(SEASON_ENV_VAR, &raw))?;
            config.season = Some(season);
        }

        Ok(config)
    }

    /// Sets the API base URL, dropping any trailing slash.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_rate_limit(mut self, requests_per_minute: NonZeroU32) -> Self {
        self.requests_per_minute = requests_per_minute;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_season(mut self, season: Option<Season>) -> Self {
        self.season = season;
        self
    }
}

fn invalid(key: &str, value: &str) -> SyncError {
    SyncError::InvalidConfig {
        key: key.to_string(),
        value: value.to_string(),
    }
}
