//! Sleeper Fantasy Football Sync Library
//!
//! Pulls league data from the Sleeper public API and keeps a local SQLite
//! database in step with it: leagues, users, rosters, weekly matchups,
//! per-player weekly points, transactions, and the player catalog.
//!
//! ## Features
//!
//! - **Idempotent Sync**: Re-running a sync with unchanged remote data writes nothing
//! - **All-or-nothing Units**: Each league, week, or catalog sync commits in one transaction
//! - **Partial Failure Isolation**: One failing league does not stop the others
//! - **Polite Client**: Client-side rate limiting with backoff on 429 and 5xx responses
//! - **Referential Integrity**: Player points only ever reference that week's roster snapshot
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sleeper_sync::{LeagueId, SyncConfig, SyncService, Week};
//!
//! # async fn example() -> sleeper_sync::Result<()> {
//! let config = SyncConfig::from_env()?;
//! let mut service = SyncService::new(config)?;
//!
//! let league_id = LeagueId::new("1260107285024219136")?;
//! service.sync_league(&league_id).await?;
//! service.sync_week(&league_id, Week::new(1)).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Configuration
//!
//! `DATABASE_URL` is required. Set your league ID to avoid passing it in every command:
//! ```bash
//! export DATABASE_URL=sqlite://sleeper.db
//! export SLEEPER_LEAGUE_ID=1260107285024219136
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod error;
pub mod sleeper;
pub mod storage;
pub mod sync;

// Re-export commonly used types
pub use cli::types::ids::{LeagueId, PlayerId, RosterId, UserId};
pub use cli::types::time::{Season, Week};
pub use config::{DatabaseLocation, SyncConfig};
pub use error::{EntityKind, Result, SyncError};
pub use storage::LeagueDatabase;
pub use sync::SyncService;

pub const LEAGUE_ID_ENV_VAR: &str = "SLEEPER_LEAGUE_ID";
