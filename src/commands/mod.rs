//! Command implementations for the sleeper-sync CLI
//!
//! Handlers take an already constructed [`SyncService`](crate::sync::SyncService)
//! so they run the same against the live API and an in-memory source.

pub mod all_leagues;
pub mod catalog;
pub mod league;
pub mod transactions;
pub mod week;


use crate::{error::SyncError, LeagueId, Result, LEAGUE_ID_ENV_VAR};

/// Resolve league ID from option or environment variable
pub fn resolve_league_id(league_id: Option<LeagueId>) -> Result<LeagueId> {
    resolve_league_id_with(league_id, |key| std::env::var(key).ok())
}

fn resolve_league_id_with<F>(league_id: Option<LeagueId>, lookup: F) -> Result<LeagueId>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(id) = league_id {
        return Ok(id);
    }
    match lookup(LEAGUE_ID_ENV_VAR) {
        Some(raw) => raw.parse::<LeagueId>(),
        None => Err(SyncError::MissingLeagueId {
            env_var: LEAGUE_ID_ENV_VAR.to_string(),
        }),
    }
}
