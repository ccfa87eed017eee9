//! Sleeper API access: wire types, the HTTP client, and the [`RemoteSource`]
//! seam the sync service is written against.

pub mod http;
pub mod types;

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::{
    cli::types::{ids::UserId, time::Season},
    LeagueId, Result, Week,
};
use types::{
    NflState, RemoteLeague, RemoteLeagueUser, RemoteMatchup, RemotePlayer, RemoteRoster,
    RemoteTransaction, RemoteTrendingPlayer, RemoteUser, Trend,
};

pub use http::SleeperClient;

/// Read-only view of the remote fantasy platform.
///
/// `Ok(None)` means the platform answered but has no such record; transport
/// and decoding problems are errors. List endpoints answering `null` yield an
/// empty list.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Look a user up by username or user id.
    async fn get_user(&self, username_or_id: &str) -> Result<Option<RemoteUser>>;

    async fn get_user_leagues(&self, user_id: &UserId, season: Season) -> Result<Vec<RemoteLeague>>;

    async fn get_league(&self, league_id: &LeagueId) -> Result<Option<RemoteLeague>>;

    async fn get_league_users(&self, league_id: &LeagueId) -> Result<Vec<RemoteLeagueUser>>;

    async fn get_league_rosters(&self, league_id: &LeagueId) -> Result<Vec<RemoteRoster>>;

    async fn get_matchups(&self, league_id: &LeagueId, week: Week) -> Result<Vec<RemoteMatchup>>;

    async fn get_transactions(
        &self,
        league_id: &LeagueId,
        week: Week,
    ) -> Result<Vec<RemoteTransaction>>;

    /// Full player catalog keyed by player id.
    async fn get_players(&self) -> Result<BTreeMap<String, RemotePlayer>>;

    /// Most added or dropped players over the last `lookback_hours`.
    async fn get_trending_players(
        &self,
        trend: Trend,
        lookback_hours: u32,
        limit: u32,
    ) -> Result<Vec<RemoteTrendingPlayer>>;

    async fn get_nfl_state(&self) -> Result<NflState>;
}
