//! Data models for the storage layer
//!
//! Models carry only the synced values. Bookkeeping columns (`created_at`,
//! `updated_at`) live in the database and never take part in comparisons, so
//! "same remote data" means "equal model".

use crate::cli::types::{
    ids::{PlayerId, RosterId, UserId},
    time::{Season, Week},
};
use crate::LeagueId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct League {
    pub league_id: LeagueId,
    pub name: String,
    pub season: Season,
    pub sport: String,
    pub status: Option<String>,
    pub season_type: Option<String>,
    pub total_rosters: Option<u32>,
    pub previous_league_id: Option<String>,
    pub settings: Value,
    pub scoring_settings: Value,
    pub roster_positions: Value,
}

/// A user's seat in a league.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueMember {
    pub league_id: LeagueId,
    pub user_id: UserId,
    pub team_name: Option<String>,
    pub is_owner: bool,
}

/// Player catalog entry. Everything but the id is absent on a stub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: PlayerId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub position: Option<String>,
    pub team: Option<String>,
    pub age: Option<u32>,
    pub years_exp: Option<u32>,
    pub college: Option<String>,
    pub active: Option<bool>,
    pub status: Option<String>,
    pub injury_status: Option<String>,
}

impl Player {
    pub fn stub(player_id: PlayerId) -> Self {
        Self {
            player_id,
            first_name: None,
            last_name: None,
            full_name: None,
            position: None,
            team: None,
            age: None,
            years_exp: None,
            college: None,
            active: None,
            status: None,
            injury_status: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub league_id: LeagueId,
    pub roster_id: RosterId,
    pub owner_id: Option<UserId>,
    pub co_owners: Vec<UserId>,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    /// Season points for, `fpts + fpts_decimal / 100`.
    pub points_for: f64,
    pub waiver_position: Option<u32>,
    pub waiver_budget_used: u32,
    pub total_moves: u32,
}

/// Current roster membership of one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterMember {
    pub league_id: LeagueId,
    pub roster_id: RosterId,
    pub player_id: PlayerId,
    pub is_starter: bool,
    pub is_reserve: bool,
}

/// One roster's side of a weekly matchup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub league_id: LeagueId,
    pub season: Season,
    pub week: Week,
    pub roster_id: RosterId,
    /// Rosters sharing a matchup id play each other; `None` is a bye.
    pub matchup_id: Option<u32>,
    pub opponent_roster_id: Option<RosterId>,
    pub points: f64,
    pub points_against: Option<f64>,
    pub custom_points: Option<f64>,
    pub starters: Vec<PlayerId>,
}

/// A player on a roster in one scoring period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyRosterEntry {
    pub league_id: LeagueId,
    pub season: Season,
    pub week: Week,
    pub roster_id: RosterId,
    pub player_id: PlayerId,
    pub is_starter: bool,
}

/// Fantasy points scored by a player in one week of one league.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerWeekStat {
    pub league_id: LeagueId,
    pub season: Season,
    pub week: Week,
    pub player_id: PlayerId,
    pub roster_id: RosterId,
    pub points: f64,
    pub is_starter: bool,
}

/// A roster-modifying league event (trade, waiver, free agent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueTransaction {
    pub transaction_id: String,
    pub league_id: LeagueId,
    pub kind: String,
    pub status: Option<String>,
    pub creator: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub created_ms: Option<i64>,
    pub status_updated_ms: Option<i64>,
    pub week: Option<Week>,
    pub roster_ids: Vec<u32>,
    pub adds: BTreeMap<String, u32>,
    pub drops: BTreeMap<String, u32>,
    pub waiver_bid: Option<u32>,
    pub draft_picks: Value,
}

/// Row counts per table, used for idempotence checks and summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCounts {
    pub users: u64,
    pub leagues: u64,
    pub league_members: u64,
    pub players: u64,
    pub rosters: u64,
    pub roster_members: u64,
    pub matchups: u64,
    pub weekly_roster_entries: u64,
    pub player_week_stats: u64,
    pub transactions: u64,
}

/// A roster as shown in a league summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterSummary {
    pub roster_id: RosterId,
    pub owner_display_name: Option<String>,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points_for: f64,
    pub player_count: u32,
}
