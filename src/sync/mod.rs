//! Sync service: fetch → transform → upsert.
//!
//! Each operation fetches everything it needs from the [`RemoteSource`] first,
//! converts it with [`transform`], and only then opens a [`SyncUnit`] on the
//! store. A unit commits as a whole or not at all. Independent units (leagues
//! in [`SyncService::sync_all_leagues`], weeks in [`SyncService::sync_season`])
//! fail independently and are reported together.
//!
//! [`SyncUnit`]: crate::storage::SyncUnit

pub mod report;
pub mod transform;

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use crate::cli::types::{
    ids::PlayerId,
    time::{Season, Week},
};
use crate::config::SyncConfig;
use crate::error::{EntityKind, SyncError};
use crate::sleeper::{
    types::{NflState, Trend},
    RemoteSource, SleeperClient,
};
use crate::storage::{LeagueDatabase, User};
use crate::{LeagueId, Result};

pub use report::{
    AllLeaguesReport, FullSyncReport, LeagueFailure, LeagueSummary, LeagueSyncReport,
    LeagueWeekFailure, PlayersSyncReport, SeasonSyncReport, TransactionsSyncReport,
    TrendingPlayer, WeekFailure, WeekSyncReport,
};

pub struct SyncService<S: RemoteSource> {
    source: S,
    db: LeagueDatabase,
    config: SyncConfig,
}

impl SyncService<SleeperClient> {
    /// Build the HTTP client and open the database named by `config`.
    pub fn new(config: SyncConfig) -> Result<Self> {
        let source = SleeperClient::new(&config)?;
        let db = LeagueDatabase::open(&config.database)?;
        Ok(Self::with_parts(source, db, config))
    }
}

impl<S: RemoteSource> SyncService<S> {
    pub fn with_parts(source: S, db: LeagueDatabase, config: SyncConfig) -> Self {
        Self { source, db, config }
    }

    pub fn database(&self) -> &LeagueDatabase {
        &self.db
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Current season and week as the platform reports them.
    pub async fn nfl_state(&self) -> Result<NflState> {
        self.source.get_nfl_state().await
    }

    /// Configured season, or the platform's current one.
    pub async fn current_season(&self) -> Result<Season> {
        if let Some(season) = self.config.season {
            return Ok(season);
        }
        let state = self.nfl_state().await?;
        state.season.parse()
    }

    /// Look a user up by username or id and store the profile.
    pub async fn resolve_user(&mut self, name_or_id: &str) -> Result<User> {
        let name_or_id = name_or_id.trim();
        if name_or_id.is_empty() {
            return Err(SyncError::InvalidUserId {
                value: name_or_id.to_string(),
            });
        }

        let remote = self
            .source
            .get_user(name_or_id)
            .await?
            .ok_or_else(|| SyncError::NotFound {
                entity: EntityKind::User,
                id: name_or_id.to_string(),
            })?;
        let user = transform::user(&remote)?;

        let unit = self.db.begin_unit()?;
        let outcome = unit.upsert_user(&user)?;
        unit.commit()?;

        debug!(user_id = %user.user_id, ?outcome, "resolved user");
        Ok(user)
    }

    /// Sync league metadata, members, and rosters as one unit.
    pub async fn sync_league(&mut self, league_id: &LeagueId) -> Result<LeagueSyncReport> {
        info!(league_id = %league_id, "syncing league");

        let remote_league = self
            .source
            .get_league(league_id)
            .await?
            .ok_or_else(|| SyncError::NotFound {
                entity: EntityKind::League,
                id: league_id.to_string(),
            })?;
        let remote_users = self.source.get_league_users(league_id).await?;
        let remote_rosters = self.source.get_league_rosters(league_id).await?;

        let league = transform::league(&remote_league, &self.config.sport)?;
        if league.league_id != *league_id {
            return Err(SyncError::malformed(
                EntityKind::League,
                league_id.as_str(),
                format!("remote answered for league {}", league.league_id),
            ));
        }
        let members = remote_users
            .iter()
            .map(|u| transform::league_member(league_id, u))
            .collect::<Result<Vec<_>>>()?;
        let rosters = remote_rosters
            .iter()
            .map(|r| transform::roster(league_id, r))
            .collect::<Result<Vec<_>>>()?;

        let mut roster_ids = BTreeSet::new();
        for (roster, _) in &rosters {
            if !roster_ids.insert(roster.roster_id) {
                return Err(SyncError::malformed(
                    EntityKind::Roster,
                    format!("{}/{}", league_id, roster.roster_id),
                    "roster listed twice",
                ));
            }
        }

        let mut report = LeagueSyncReport::new(league_id.clone(), league.name.clone(), league.season);
        let unit = self.db.begin_unit()?;

        report.league = Some(unit.upsert_league(&league)?);

        let mut member_keep = BTreeSet::new();
        for (user, member) in &members {
            report.users.record(unit.upsert_user(user)?);
            report.members.record(unit.upsert_league_member(member)?);
            member_keep.insert(member.user_id.clone());
        }
        report.members.removed = unit.retain_league_members(league_id, &member_keep)?;

        let mut roster_member_keep = BTreeSet::new();
        for (roster, roster_members) in &rosters {
            for owner in roster.owner_id.iter().chain(&roster.co_owners) {
                if unit.ensure_user(owner)? {
                    report.stub_users += 1;
                }
            }
            report.rosters.record(unit.upsert_roster(roster)?);

            for member in roster_members {
                if unit.ensure_player(&member.player_id)? {
                    report.stub_players += 1;
                }
                report.roster_members.record(unit.upsert_roster_member(member)?);
                roster_member_keep.insert((member.roster_id, member.player_id.clone()));
            }
        }
        report.roster_members.removed = unit.retain_roster_members(league_id, &roster_member_keep)?;

        unit.commit()?;

        info!(
            league_id = %league_id,
            members = report.members.total(),
            rosters = report.rosters.total(),
            noop = report.is_noop(),
            "league synced"
        );
        Ok(report)
    }

    /// Sync one week's matchups, roster snapshot, and player points as one unit.
    pub async fn sync_week(&mut self, league_id: &LeagueId, week: Week) -> Result<WeekSyncReport> {
        week.validate()?;
        let league = self.db.get_league(league_id)?.ok_or_else(|| SyncError::NotFound {
            entity: EntityKind::League,
            id: league_id.to_string(),
        })?;
        let season = league.season;

        info!(league_id = %league_id, week = week.as_u16(), "syncing week");
        let remote = self.source.get_matchups(league_id, week).await?;
        let snapshot = transform::week_snapshot(league_id, season, week, &remote)?;

        let mut report = WeekSyncReport::new(league_id.clone(), season, week);
        report.skipped_points = snapshot.skipped_points;

        let unit = self.db.begin_unit()?;

        for matchup in &snapshot.matchups {
            report.matchups.record(unit.upsert_matchup(matchup)?);
        }

        let stat_keep: BTreeSet<_> = snapshot.stats.iter().map(|s| s.player_id.clone()).collect();
        report.stats.removed = unit.retain_week_stats(league_id, season, week, &stat_keep)?;
        let entry_keep: BTreeSet<_> = snapshot
            .entries
            .iter()
            .map(|e| (e.roster_id, e.player_id.clone()))
            .collect();
        report.entries.removed = unit.retain_weekly_entries(league_id, season, week, &entry_keep)?;
        let matchup_keep: BTreeSet<_> = snapshot.matchups.iter().map(|m| m.roster_id).collect();
        report.matchups.removed = unit.retain_week_matchups(league_id, season, week, &matchup_keep)?;

        for entry in &snapshot.entries {
            if unit.ensure_player(&entry.player_id)? {
                report.stub_players += 1;
            }
            report.entries.record(unit.upsert_weekly_entry(entry)?);
        }
        for stat in &snapshot.stats {
            report.stats.record(unit.upsert_stat(stat)?);
        }

        unit.commit()?;

        info!(
            league_id = %league_id,
            week = week.as_u16(),
            matchups = report.matchups.total(),
            stats = report.stats.total(),
            noop = report.is_noop(),
            "week synced"
        );
        Ok(report)
    }

    /// Sync weeks `1..=through_week`, each as its own unit.
    pub async fn sync_season(&mut self, league_id: &LeagueId, through_week: Week) -> Result<SeasonSyncReport> {
        through_week.validate()?;
        let league = self.db.get_league(league_id)?.ok_or_else(|| SyncError::NotFound {
            entity: EntityKind::League,
            id: league_id.to_string(),
        })?;

        let mut report = SeasonSyncReport {
            league_id: league_id.clone(),
            season: league.season,
            weeks: Vec::new(),
            failures: Vec::new(),
        };
        for week in 1..=through_week.as_u16() {
            let week = Week::new(week);
            match self.sync_week(league_id, week).await {
                Ok(week_report) => report.weeks.push(week_report),
                Err(error) => {
                    warn!(league_id = %league_id, week = week.as_u16(), error = %error, "week sync failed");
                    report.failures.push(WeekFailure { week, error });
                }
            }
        }
        Ok(report)
    }

    /// Sync every league the user is in for the season.
    ///
    /// Failing to resolve the user or list the leagues is an error; a league
    /// that fails to sync is recorded and the rest carry on.
    pub async fn sync_all_leagues(&mut self, user: &str) -> Result<AllLeaguesReport> {
        let user = self.resolve_user(user).await?;
        let season = self.current_season().await?;
        let remote_leagues = self.source.get_user_leagues(&user.user_id, season).await?;

        info!(
            user_id = %user.user_id,
            season = season.as_u16(),
            leagues = remote_leagues.len(),
            "syncing all leagues"
        );

        let mut report = AllLeaguesReport::new(user.user_id.clone(), season);
        for remote in remote_leagues {
            let result = match LeagueId::new(remote.league_id.as_str()) {
                Ok(league_id) => self.sync_league(&league_id).await,
                Err(err) => Err(err),
            };
            match result {
                Ok(league_report) => report.successes.push(league_report),
                Err(error) => {
                    warn!(league_id = %remote.league_id, error = %error, "league sync failed");
                    report.failures.push(LeagueFailure {
                        league_id: remote.league_id,
                        name: remote.name,
                        error,
                    });
                }
            }
        }

        info!(
            succeeded = report.successes.len(),
            failed = report.failures.len(),
            "all leagues synced"
        );
        Ok(report)
    }

    /// One-shot sync for a user: the player catalog, every league, then each
    /// synced league's current week.
    ///
    /// The catalog and the platform state must load; league and week failures
    /// are collected like in [`Self::sync_all_leagues`] and [`Self::sync_season`].
    /// No week is synced when the platform's week is outside `1..=Week::MAX` or
    /// the leagues belong to another season than the current one.
    pub async fn sync_full(&mut self, user: &str) -> Result<FullSyncReport> {
        let players = self.sync_players().await?;
        let state = self.nfl_state().await?;
        let leagues = self.sync_all_leagues(user).await?;

        // The platform's current week only means something for the current season.
        let week = Week::new(state.week);
        let in_season = state.season.parse::<Season>().ok() == Some(leagues.season);
        let week = if in_season && week.validate().is_ok() {
            Some(week)
        } else {
            info!(
                season = leagues.season.as_u16(),
                week = state.week,
                "no current week to sync"
            );
            None
        };

        let league_ids: Vec<LeagueId> = leagues
            .successes
            .iter()
            .map(|l| l.league_id.clone())
            .collect();
        let mut report = FullSyncReport {
            players,
            leagues,
            week,
            weeks: Vec::new(),
            week_failures: Vec::new(),
        };

        if let Some(week) = week {
            for league_id in league_ids {
                match self.sync_week(&league_id, week).await {
                    Ok(week_report) => report.weeks.push(week_report),
                    Err(error) => {
                        warn!(league_id = %league_id, week = week.as_u16(), error = %error, "week sync failed");
                        report.week_failures.push(LeagueWeekFailure {
                            league_id,
                            week,
                            error,
                        });
                    }
                }
            }
        }

        info!(
            leagues = report.leagues.successes.len(),
            weeks = report.weeks.len(),
            failed = report.failure_count(),
            "full sync finished"
        );
        Ok(report)
    }

    /// Trending adds or drops, joined with the stored player catalog.
    pub async fn trending_players(
        &self,
        trend: Trend,
        lookback_hours: u32,
        limit: u32,
    ) -> Result<Vec<TrendingPlayer>> {
        let remote = self
            .source
            .get_trending_players(trend, lookback_hours, limit)
            .await?;
        remote
            .into_iter()
            .map(|entry| {
                let player_id = PlayerId::new(entry.player_id);
                let player = self.db.get_player(&player_id)?;
                Ok(TrendingPlayer {
                    player_id,
                    count: entry.count,
                    player,
                })
            })
            .collect()
    }

    /// Sync the full player catalog as one unit.
    pub async fn sync_players(&mut self) -> Result<PlayersSyncReport> {
        info!(sport = %self.config.sport, "syncing player catalog");
        let remote: BTreeMap<_, _> = self.source.get_players().await?;
        let players: Vec<_> = remote
            .iter()
            .map(|(key, player)| transform::player(key, player))
            .collect();

        let mut report = PlayersSyncReport::default();
        let unit = self.db.begin_unit()?;
        for player in &players {
            report.players.record(unit.upsert_player(player)?);
        }
        unit.commit()?;

        info!(
            total = report.players.total(),
            inserted = report.players.inserted,
            updated = report.players.updated,
            "player catalog synced"
        );
        Ok(report)
    }

    /// Sync one leg of league transactions as one unit.
    pub async fn sync_transactions(&mut self, league_id: &LeagueId, week: Week) -> Result<TransactionsSyncReport> {
        week.validate()?;
        if self.db.get_league(league_id)?.is_none() {
            return Err(SyncError::NotFound {
                entity: EntityKind::League,
                id: league_id.to_string(),
            });
        }

        info!(league_id = %league_id, week = week.as_u16(), "syncing transactions");
        let remote = self.source.get_transactions(league_id, week).await?;
        let transactions = remote
            .iter()
            .map(|t| transform::transaction(league_id, t))
            .collect::<Result<Vec<_>>>()?;

        let mut report = TransactionsSyncReport {
            league_id: league_id.clone(),
            week,
            transactions: Default::default(),
        };
        let unit = self.db.begin_unit()?;
        for txn in &transactions {
            report.transactions.record(unit.upsert_transaction(txn)?);
        }
        unit.commit()?;

        Ok(report)
    }

    /// Read-only report of what is stored for a league.
    pub fn league_summary(&self, league_id: &LeagueId) -> Result<LeagueSummary> {
        let league = self.db.get_league(league_id)?.ok_or_else(|| SyncError::NotFound {
            entity: EntityKind::League,
            id: league_id.to_string(),
        })?;
        Ok(LeagueSummary {
            league,
            member_count: self.db.get_league_members(league_id)?.len(),
            rosters: self.db.roster_summaries(league_id)?,
            transaction_count: self.db.get_league_transactions(league_id)?.len(),
            stats_outside_snapshot: self.db.count_stats_outside_snapshot(league_id)?,
        })
    }
}
