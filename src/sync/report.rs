//! Outcome reports returned by the sync operations.

use crate::cli::types::{
    ids::{PlayerId, UserId},
    time::{Season, Week},
};
use crate::error::SyncError;
use crate::storage::{EntityCounts, League, Player, RosterSummary, UpsertOutcome};
use crate::LeagueId;

#[derive(Debug, Clone, PartialEq)]
pub struct LeagueSyncReport {
    pub league_id: LeagueId,
    pub name: String,
    pub season: Season,
    pub league: Option<UpsertOutcome>,
    pub users: EntityCounts,
    pub members: EntityCounts,
    pub rosters: EntityCounts,
    pub roster_members: EntityCounts,
    /// Id-only rows created so roster references resolve.
    pub stub_users: u32,
    pub stub_players: u32,
}

impl LeagueSyncReport {
    pub fn new(league_id: LeagueId, name: String, season: Season) -> Self {
        Self {
            league_id,
            name,
            season,
            league: None,
            users: EntityCounts::default(),
            members: EntityCounts::default(),
            rosters: EntityCounts::default(),
            roster_members: EntityCounts::default(),
            stub_users: 0,
            stub_players: 0,
        }
    }

    /// True when the run found nothing to write.
    pub fn is_noop(&self) -> bool {
        self.league == Some(UpsertOutcome::Unchanged)
            && self.users.is_noop()
            && self.members.is_noop()
            && self.rosters.is_noop()
            && self.roster_members.is_noop()
            && self.stub_users == 0
            && self.stub_players == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeekSyncReport {
    pub league_id: LeagueId,
    pub season: Season,
    pub week: Week,
    pub matchups: EntityCounts,
    pub entries: EntityCounts,
    pub stats: EntityCounts,
    pub stub_players: u32,
    pub skipped_points: u32,
}

impl WeekSyncReport {
    pub fn new(league_id: LeagueId, season: Season, week: Week) -> Self {
        Self {
            league_id,
            season,
            week,
            matchups: EntityCounts::default(),
            entries: EntityCounts::default(),
            stats: EntityCounts::default(),
            stub_players: 0,
            skipped_points: 0,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.matchups.is_noop() && self.entries.is_noop() && self.stats.is_noop() && self.stub_players == 0
    }
}

/// A league that could not be synced during a multi-league run.
#[derive(Debug)]
pub struct LeagueFailure {
    pub league_id: String,
    pub name: Option<String>,
    pub error: SyncError,
}

#[derive(Debug)]
pub struct AllLeaguesReport {
    pub user_id: UserId,
    pub season: Season,
    pub successes: Vec<LeagueSyncReport>,
    pub failures: Vec<LeagueFailure>,
}

impl AllLeaguesReport {
    pub fn new(user_id: UserId, season: Season) -> Self {
        Self {
            user_id,
            season,
            successes: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn attempted(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayersSyncReport {
    pub players: EntityCounts,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionsSyncReport {
    pub league_id: LeagueId,
    pub week: Week,
    pub transactions: EntityCounts,
}

#[derive(Debug)]
pub struct WeekFailure {
    pub week: Week,
    pub error: SyncError,
}

#[derive(Debug)]
pub struct SeasonSyncReport {
    pub league_id: LeagueId,
    pub season: Season,
    pub weeks: Vec<WeekSyncReport>,
    pub failures: Vec<WeekFailure>,
}

impl SeasonSyncReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A league whose current week could not be synced during a full run.
#[derive(Debug)]
pub struct LeagueWeekFailure {
    pub league_id: LeagueId,
    pub week: Week,
    pub error: SyncError,
}

/// Catalog, every league, then each league's current week.
#[derive(Debug)]
pub struct FullSyncReport {
    pub players: PlayersSyncReport,
    pub leagues: AllLeaguesReport,
    /// `None` when the platform reports a week outside the regular range
    /// (preseason week 0, for instance) and no week was synced.
    pub week: Option<Week>,
    pub weeks: Vec<WeekSyncReport>,
    pub week_failures: Vec<LeagueWeekFailure>,
}

impl FullSyncReport {
    pub fn failure_count(&self) -> usize {
        self.leagues.failures.len() + self.week_failures.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failure_count() == 0
    }
}

/// A trending player joined with whatever the local catalog knows about it.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendingPlayer {
    pub player_id: PlayerId,
    pub count: u32,
    pub player: Option<Player>,
}

/// Read-only view of a stored league.
#[derive(Debug, Clone, PartialEq)]
pub struct LeagueSummary {
    pub league: League,
    pub member_count: usize,
    pub rosters: Vec<RosterSummary>,
    pub transaction_count: usize,
    pub stats_outside_snapshot: u64,
}
