//! Wire types for Sleeper API payloads.
//!
//! These mirror the JSON Sleeper returns and stay deliberately loose: almost
//! everything is optional because Sleeper omits or nulls fields freely. The
//! [`sync::transform`](crate::sync::transform) module turns them into storage
//! models and rejects what cannot be stored.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;


/// `GET user/{username_or_id}`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RemoteUser {
    pub user_id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// `GET league/{league_id}` and entries of `GET user/{id}/leagues/{sport}/{season}`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RemoteLeague {
    pub league_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub sport: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub season_type: Option<String>,
    #[serde(default)]
    pub total_rosters: Option<u32>,
    #[serde(default)]
    pub previous_league_id: Option<String>,
    #[serde(default)]
    pub settings: Option<Value>,
    #[serde(default)]
    pub scoring_settings: Option<Value>,
    #[serde(default)]
    pub roster_positions: Option<Value>,
}

/// Entry of `GET league/{league_id}/users`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RemoteLeagueUser {
    pub user_id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub is_owner: Option<bool>,
    #[serde(default)]
    pub metadata: Option<RemoteUserMetadata>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct RemoteUserMetadata {
    #[serde(default)]
    pub team_name: Option<String>,
}

/// Entry of `GET league/{league_id}/rosters`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RemoteRoster {
    pub roster_id: u32,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub co_owners: Option<Vec<String>>,
    #[serde(default)]
    pub players: Option<Vec<String>>,
    #[serde(default)]
    pub starters: Option<Vec<String>>,
    #[serde(default)]
    pub reserve: Option<Vec<String>>,
    /// Sleeper sends `null` for rosters that have never played.
    #[serde(default)]
    pub settings: Option<RemoteRosterSettings>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct RemoteRosterSettings {
    #[serde(default)]
    pub wins: Option<u32>,
    #[serde(default)]
    pub losses: Option<u32>,
    #[serde(default)]
    pub ties: Option<u32>,
    #[serde(default)]
    pub fpts: Option<i64>,
    #[serde(default)]
    pub fpts_decimal: Option<i64>,
    #[serde(default)]
    pub waiver_position: Option<u32>,
    #[serde(default)]
    pub waiver_budget_used: Option<u32>,
    #[serde(default)]
    pub total_moves: Option<u32>,
}

/// Entry of `GET league/{league_id}/matchups/{week}`; one per roster.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RemoteMatchup {
    pub roster_id: u32,
    #[serde(default)]
    pub matchup_id: Option<u32>,
    #[serde(default)]
    pub points: Option<f64>,
    #[serde(default)]
    pub custom_points: Option<f64>,
    #[serde(default)]
    pub starters: Option<Vec<String>>,
    #[serde(default)]
    pub players: Option<Vec<String>>,
    #[serde(default)]
    pub players_points: Option<BTreeMap<String, f64>>,
}

/// Value of the `GET players/{sport}` map, keyed by player id.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RemotePlayer {
    #[serde(default)]
    pub player_id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub years_exp: Option<u32>,
    #[serde(default)]
    pub college: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub injury_status: Option<String>,
}

/// Entry of `GET league/{league_id}/transactions/{round}`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RemoteTransaction {
    pub transaction_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub status_updated: Option<i64>,
    #[serde(default)]
    pub leg: Option<u16>,
    #[serde(default)]
    pub roster_ids: Option<Vec<u32>>,
    #[serde(default)]
    pub adds: Option<BTreeMap<String, u32>>,
    #[serde(default)]
    pub drops: Option<BTreeMap<String, u32>>,
    #[serde(default)]
    pub draft_picks: Option<Value>,
    #[serde(default)]
    pub settings: Option<RemoteTransactionSettings>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct RemoteTransactionSettings {
    #[serde(default)]
    pub waiver_bid: Option<u32>,
}

/// Direction of a trending list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Add,
    Drop,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Add => "add",
            Trend::Drop => "drop",
        }
    }
}

/// Entry of `GET players/{sport}/trending/{add|drop}`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RemoteTrendingPlayer {
    pub player_id: String,
    #[serde(default)]
    pub count: u32,
}

/// `GET state/{sport}`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NflState {
    pub season: String,
    #[serde(default)]
    pub week: u16,
    #[serde(default)]
    pub season_type: Option<String>,
    #[serde(default)]
    pub display_week: Option<u16>,
    #[serde(default)]
    pub leg: Option<u16>,
}
