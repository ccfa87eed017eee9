//! Transactional write scope for one sync unit.
//!
//! A [`SyncUnit`] wraps a single SQLite transaction. Dropping it without
//! calling [`SyncUnit::commit`] rolls every write back, so a league or week
//! lands in full or not at all.

use super::merge::{decide, MergeDecision, Reconcile, UpsertOutcome};
use super::models::*;
use super::queries::{self, json_text};
use super::schema::LeagueDatabase;
use crate::cli::types::{
    ids::{PlayerId, RosterId, UserId},
    time::{Season, Week},
};
use crate::error::{EntityKind, SyncError};
use crate::{LeagueId, Result};
use rusqlite::{params, Connection, Transaction};
use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};

type Writer<T> = fn(&Connection, &T, i64) -> rusqlite::Result<usize>;

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

impl LeagueDatabase {
    /// Start a sync unit. Nothing is visible to other readers until commit.
    pub fn begin_unit(&mut self) -> Result<SyncUnit<'_>> {
        Ok(SyncUnit {
            tx: self.conn.transaction()?,
            now: unix_now(),
        })
    }
}

pub struct SyncUnit<'db> {
    tx: Transaction<'db>,
    now: i64,
}

impl<'db> SyncUnit<'db> {
    pub fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }

    fn apply<T: Reconcile>(
        &self,
        entity: EntityKind,
        key: &str,
        existing: rusqlite::Result<Option<T>>,
        incoming: &T,
        write: Writer<T>,
    ) -> Result<UpsertOutcome> {
        let existing = existing.map_err(|e| SyncError::from_db(entity, key, e))?;
        let decision = decide(existing.as_ref(), incoming.clone());
        match &decision {
            MergeDecision::Insert(record) | MergeDecision::Update(record) => {
                write(&self.tx, record, self.now).map_err(|e| SyncError::from_db(entity, key, e))?;
            }
            MergeDecision::Keep => {}
        }
        Ok(decision.outcome())
    }

    pub fn upsert_user(&self, user: &User) -> Result<UpsertOutcome> {
        self.apply(
            EntityKind::User,
            user.user_id.as_str(),
            queries::find_user(&self.tx, &user.user_id),
            user,
            write_user,
        )
    }

    pub fn upsert_league(&self, league: &League) -> Result<UpsertOutcome> {
        self.apply(
            EntityKind::League,
            league.league_id.as_str(),
            queries::find_league(&self.tx, &league.league_id),
            league,
            write_league,
        )
    }

    pub fn upsert_league_member(&self, member: &LeagueMember) -> Result<UpsertOutcome> {
        self.apply(
            EntityKind::LeagueMember,
            &format!("{}/{}", member.league_id, member.user_id),
            queries::find_league_member(&self.tx, &member.league_id, &member.user_id),
            member,
            write_league_member,
        )
    }

    pub fn upsert_player(&self, player: &Player) -> Result<UpsertOutcome> {
        self.apply(
            EntityKind::Player,
            player.player_id.as_str(),
            queries::find_player(&self.tx, &player.player_id),
            player,
            write_player,
        )
    }

    pub fn upsert_roster(&self, roster: &Roster) -> Result<UpsertOutcome> {
        self.apply(
            EntityKind::Roster,
            &format!("{}/{}", roster.league_id, roster.roster_id),
            queries::find_roster(&self.tx, &roster.league_id, roster.roster_id),
            roster,
            write_roster,
        )
    }

    pub fn upsert_roster_member(&self, member: &RosterMember) -> Result<UpsertOutcome> {
        self.apply(
            EntityKind::RosterMember,
            &format!("{}/{}/{}", member.league_id, member.roster_id, member.player_id),
            queries::find_roster_member(&self.tx, member),
            member,
            write_roster_member,
        )
    }

    pub fn upsert_matchup(&self, matchup: &Matchup) -> Result<UpsertOutcome> {
        self.apply(
            EntityKind::Matchup,
            &format!(
                "{}/{}/{}/{}",
                matchup.league_id, matchup.season, matchup.week, matchup.roster_id
            ),
            queries::find_matchup(&self.tx, matchup),
            matchup,
            write_matchup,
        )
    }

    pub fn upsert_weekly_entry(&self, entry: &WeeklyRosterEntry) -> Result<UpsertOutcome> {
        self.apply(
            EntityKind::WeeklyRosterEntry,
            &format!(
                "{}/{}/{}/{}/{}",
                entry.league_id, entry.season, entry.week, entry.roster_id, entry.player_id
            ),
            queries::find_weekly_entry(&self.tx, entry),
            entry,
            write_weekly_entry,
        )
    }

    pub fn upsert_stat(&self, stat: &PlayerWeekStat) -> Result<UpsertOutcome> {
        self.apply(
            EntityKind::Stat,
            &format!(
                "{}/{}/{}/{}",
                stat.league_id, stat.season, stat.week, stat.player_id
            ),
            queries::find_stat(&self.tx, stat),
            stat,
            write_stat,
        )
    }

    pub fn upsert_transaction(&self, txn: &LeagueTransaction) -> Result<UpsertOutcome> {
        self.apply(
            EntityKind::Transaction,
            &txn.transaction_id,
            queries::find_transaction(&self.tx, &txn.transaction_id),
            txn,
            write_transaction,
        )
    }

    /// Insert an id-only user row if none exists. Returns true when inserted.
    pub fn ensure_user(&self, user_id: &UserId) -> Result<bool> {
        let inserted = self
            .tx
            .execute(
                "INSERT OR IGNORE INTO users (user_id, created_at, updated_at) VALUES (?1, ?2, ?2)",
                params![user_id.as_str(), self.now],
            )
            .map_err(|e| SyncError::from_db(EntityKind::User, user_id.as_str(), e))?;
        Ok(inserted > 0)
    }

    /// Insert an id-only player row if none exists. Returns true when inserted.
    pub fn ensure_player(&self, player_id: &PlayerId) -> Result<bool> {
        let inserted = self
            .tx
            .execute(
                "INSERT OR IGNORE INTO players (player_id, created_at, updated_at) VALUES (?1, ?2, ?2)",
                params![player_id.as_str(), self.now],
            )
            .map_err(|e| SyncError::from_db(EntityKind::Player, player_id.as_str(), e))?;
        Ok(inserted > 0)
    }

    /// Drop league members the remote no longer lists.
    pub fn retain_league_members(&self, league_id: &LeagueId, keep: &BTreeSet<UserId>) -> Result<u32> {
        let stale: Vec<UserId> = queries::list_league_members(&self.tx, league_id)?
            .into_iter()
            .map(|m| m.user_id)
            .filter(|id| !keep.contains(id))
            .collect();

        for user_id in &stale {
            self.tx
                .execute(
                    "DELETE FROM league_members WHERE league_id = ?1 AND user_id = ?2",
                    params![league_id.as_str(), user_id.as_str()],
                )
                .map_err(|e| SyncError::from_db(EntityKind::LeagueMember, user_id.as_str(), e))?;
        }
        Ok(stale.len() as u32)
    }

    /// Drop roster memberships the remote no longer lists.
    pub fn retain_roster_members(
        &self,
        league_id: &LeagueId,
        keep: &BTreeSet<(RosterId, PlayerId)>,
    ) -> Result<u32> {
        let stale: Vec<(RosterId, PlayerId)> = queries::list_roster_members(&self.tx, league_id)?
            .into_iter()
            .map(|m| (m.roster_id, m.player_id))
            .filter(|key| !keep.contains(key))
            .collect();

        for (roster_id, player_id) in &stale {
            self.tx
                .execute(
                    "DELETE FROM roster_members
                     WHERE league_id = ?1 AND roster_id = ?2 AND player_id = ?3",
                    params![league_id.as_str(), roster_id.as_u32(), player_id.as_str()],
                )
                .map_err(|e| SyncError::from_db(EntityKind::RosterMember, player_id.as_str(), e))?;
        }
        Ok(stale.len() as u32)
    }

    /// Drop stats for players the week's payload no longer scores.
    pub fn retain_week_stats(
        &self,
        league_id: &LeagueId,
        season: Season,
        week: Week,
        keep: &BTreeSet<PlayerId>,
    ) -> Result<u32> {
        let stale: Vec<PlayerId> = queries::list_week_stats(&self.tx, league_id, season, week)?
            .into_iter()
            .map(|s| s.player_id)
            .filter(|id| !keep.contains(id))
            .collect();

        for player_id in &stale {
            self.tx
                .execute(
                    "DELETE FROM player_week_stats
                     WHERE league_id = ?1 AND season = ?2 AND week = ?3 AND player_id = ?4",
                    params![league_id.as_str(), season.as_u16(), week.as_u16(), player_id.as_str()],
                )
                .map_err(|e| SyncError::from_db(EntityKind::Stat, player_id.as_str(), e))?;
        }
        Ok(stale.len() as u32)
    }

    /// Drop weekly roster entries outside the new snapshot, together with any
    /// stat still pointing at them.
    pub fn retain_weekly_entries(
        &self,
        league_id: &LeagueId,
        season: Season,
        week: Week,
        keep: &BTreeSet<(RosterId, PlayerId)>,
    ) -> Result<u32> {
        let stale: Vec<(RosterId, PlayerId)> =
            queries::list_weekly_entries(&self.tx, league_id, season, week)?
                .into_iter()
                .map(|e| (e.roster_id, e.player_id))
                .filter(|key| !keep.contains(key))
                .collect();

        for (roster_id, player_id) in &stale {
            let scope = (
                league_id.as_str(),
                season.as_u16(),
                week.as_u16(),
                roster_id.as_u32(),
                player_id.as_str(),
            );
            self.tx
                .execute(
                    "DELETE FROM player_week_stats
                     WHERE league_id = ?1 AND season = ?2 AND week = ?3
                       AND roster_id = ?4 AND player_id = ?5",
                    scope,
                )
                .map_err(|e| SyncError::from_db(EntityKind::Stat, player_id.as_str(), e))?;
            self.tx
                .execute(
                    "DELETE FROM weekly_roster_entries
                     WHERE league_id = ?1 AND season = ?2 AND week = ?3
                       AND roster_id = ?4 AND player_id = ?5",
                    scope,
                )
                .map_err(|e| {
                    SyncError::from_db(EntityKind::WeeklyRosterEntry, player_id.as_str(), e)
                })?;
        }
        Ok(stale.len() as u32)
    }

    /// Drop matchup rows for rosters missing from the week's payload, with
    /// the entries and stats hanging off them.
    pub fn retain_week_matchups(
        &self,
        league_id: &LeagueId,
        season: Season,
        week: Week,
        keep: &BTreeSet<RosterId>,
    ) -> Result<u32> {
        let stale: Vec<RosterId> = queries::list_matchups(&self.tx, league_id, season, week)?
            .into_iter()
            .map(|m| m.roster_id)
            .filter(|id| !keep.contains(id))
            .collect();

        for roster_id in &stale {
            let scope = (
                league_id.as_str(),
                season.as_u16(),
                week.as_u16(),
                roster_id.as_u32(),
            );
            let id = format!("{}/{}", league_id, roster_id);
            for (table, entity) in [
                ("player_week_stats", EntityKind::Stat),
                ("weekly_roster_entries", EntityKind::WeeklyRosterEntry),
                ("matchups", EntityKind::Matchup),
            ] {
                self.tx
                    .execute(
                        &format!(
                            "DELETE FROM {table}
                             WHERE league_id = ?1 AND season = ?2 AND week = ?3 AND roster_id = ?4"
                        ),
                        scope,
                    )
                    .map_err(|e| SyncError::from_db(entity, id.as_str(), e))?;
            }
        }
        Ok(stale.len() as u32)
    }
}

// ---- row writers -------------------------------------------------------------
//
// Each writer is an upsert keyed on the natural key. `created_at` is only set on
// first insert; `updated_at` moves with every write the merge decided on.

fn write_user(conn: &Connection, u: &User, now: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO users (user_id, username, display_name, avatar, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)
         ON CONFLICT(user_id) DO UPDATE SET
            username = excluded.username,
            display_name = excluded.display_name,
            avatar = excluded.avatar,
            updated_at = excluded.updated_at",
        params![u.user_id.as_str(), u.username, u.display_name, u.avatar, now],
    )
}

fn write_league(conn: &Connection, l: &League, now: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO leagues (league_id, name, season, sport, status, season_type, total_rosters,
                              previous_league_id, settings, scoring_settings, roster_positions,
                              created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
         ON CONFLICT(league_id) DO UPDATE SET
            name = excluded.name,
            season = excluded.season,
            sport = excluded.sport,
            status = excluded.status,
            season_type = excluded.season_type,
            total_rosters = excluded.total_rosters,
            previous_league_id = excluded.previous_league_id,
            settings = excluded.settings,
            scoring_settings = excluded.scoring_settings,
            roster_positions = excluded.roster_positions,
            updated_at = excluded.updated_at",
        params![
            l.league_id.as_str(),
            l.name,
            l.season.as_u16(),
            l.sport,
            l.status,
            l.season_type,
            l.total_rosters,
            l.previous_league_id,
            json_text(&l.settings)?,
            json_text(&l.scoring_settings)?,
            json_text(&l.roster_positions)?,
            now
        ],
    )
}

fn write_league_member(conn: &Connection, m: &LeagueMember, now: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO league_members (league_id, user_id, team_name, is_owner, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)
         ON CONFLICT(league_id, user_id) DO UPDATE SET
            team_name = excluded.team_name,
            is_owner = excluded.is_owner,
            updated_at = excluded.updated_at",
        params![m.league_id.as_str(), m.user_id.as_str(), m.team_name, m.is_owner, now],
    )
}

fn write_player(conn: &Connection, p: &Player, now: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO players (player_id, first_name, last_name, full_name, position, team, age,
                              years_exp, college, active, status, injury_status,
                              created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)
         ON CONFLICT(player_id) DO UPDATE SET
            first_name = excluded.first_name,
            last_name = excluded.last_name,
            full_name = excluded.full_name,
            position = excluded.position,
            team = excluded.team,
            age = excluded.age,
            years_exp = excluded.years_exp,
            college = excluded.college,
            active = excluded.active,
            status = excluded.status,
            injury_status = excluded.injury_status,
            updated_at = excluded.updated_at",
        params![
            p.player_id.as_str(),
            p.first_name,
            p.last_name,
            p.full_name,
            p.position,
            p.team,
            p.age,
            p.years_exp,
            p.college,
            p.active,
            p.status,
            p.injury_status,
            now
        ],
    )
}

fn write_roster(conn: &Connection, r: &Roster, now: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO rosters (league_id, roster_id, owner_id, co_owners, wins, losses, ties,
                              points_for, waiver_position, waiver_budget_used, total_moves,
                              created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
         ON CONFLICT(league_id, roster_id) DO UPDATE SET
            owner_id = excluded.owner_id,
            co_owners = excluded.co_owners,
            wins = excluded.wins,
            losses = excluded.losses,
            ties = excluded.ties,
            points_for = excluded.points_for,
            waiver_position = excluded.waiver_position,
            waiver_budget_used = excluded.waiver_budget_used,
            total_moves = excluded.total_moves,
            updated_at = excluded.updated_at",
        params![
            r.league_id.as_str(),
            r.roster_id.as_u32(),
            r.owner_id.as_ref().map(UserId::as_str),
            json_text(&r.co_owners)?,
            r.wins,
            r.losses,
            r.ties,
            r.points_for,
            r.waiver_position,
            r.waiver_budget_used,
            r.total_moves,
            now
        ],
    )
}

fn write_roster_member(conn: &Connection, m: &RosterMember, now: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO roster_members (league_id, roster_id, player_id, is_starter, is_reserve,
                                     created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
         ON CONFLICT(league_id, roster_id, player_id) DO UPDATE SET
            is_starter = excluded.is_starter,
            is_reserve = excluded.is_reserve,
            updated_at = excluded.updated_at",
        params![
            m.league_id.as_str(),
            m.roster_id.as_u32(),
            m.player_id.as_str(),
            m.is_starter,
            m.is_reserve,
            now
        ],
    )
}

fn write_matchup(conn: &Connection, m: &Matchup, now: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO matchups (league_id, season, week, roster_id, matchup_id, opponent_roster_id,
                               points, points_against, custom_points, starters,
                               created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
         ON CONFLICT(league_id, season, week, roster_id) DO UPDATE SET
            matchup_id = excluded.matchup_id,
            opponent_roster_id = excluded.opponent_roster_id,
            points = excluded.points,
            points_against = excluded.points_against,
            custom_points = excluded.custom_points,
            starters = excluded.starters,
            updated_at = excluded.updated_at",
        params![
            m.league_id.as_str(),
            m.season.as_u16(),
            m.week.as_u16(),
            m.roster_id.as_u32(),
            m.matchup_id,
            m.opponent_roster_id.map(|r| r.as_u32()),
            m.points,
            m.points_against,
            m.custom_points,
            json_text(&m.starters)?,
            now
        ],
    )
}

fn write_weekly_entry(conn: &Connection, e: &WeeklyRosterEntry, now: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO weekly_roster_entries (league_id, season, week, roster_id, player_id,
                                            is_starter, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
         ON CONFLICT(league_id, season, week, roster_id, player_id) DO UPDATE SET
            is_starter = excluded.is_starter,
            updated_at = excluded.updated_at",
        params![
            e.league_id.as_str(),
            e.season.as_u16(),
            e.week.as_u16(),
            e.roster_id.as_u32(),
            e.player_id.as_str(),
            e.is_starter,
            now
        ],
    )
}

fn write_stat(conn: &Connection, s: &PlayerWeekStat, now: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO player_week_stats (league_id, season, week, player_id, roster_id, points,
                                        is_starter, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
         ON CONFLICT(league_id, season, week, player_id) DO UPDATE SET
            roster_id = excluded.roster_id,
            points = excluded.points,
            is_starter = excluded.is_starter,
            updated_at = excluded.updated_at",
        params![
            s.league_id.as_str(),
            s.season.as_u16(),
            s.week.as_u16(),
            s.player_id.as_str(),
            s.roster_id.as_u32(),
            s.points,
            s.is_starter,
            now
        ],
    )
}

fn write_transaction(conn: &Connection, t: &LeagueTransaction, now: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO transactions (transaction_id, league_id, kind, status, creator, created_ms,
                                   status_updated_ms, week, roster_ids, adds, drops, waiver_bid,
                                   draft_picks, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)
         ON CONFLICT(transaction_id) DO UPDATE SET
            league_id = excluded.league_id,
            kind = excluded.kind,
            status = excluded.status,
            creator = excluded.creator,
            created_ms = excluded.created_ms,
            status_updated_ms = excluded.status_updated_ms,
            week = excluded.week,
            roster_ids = excluded.roster_ids,
            adds = excluded.adds,
            drops = excluded.drops,
            waiver_bid = excluded.waiver_bid,
            draft_picks = excluded.draft_picks,
            updated_at = excluded.updated_at",
        params![
            t.transaction_id,
            t.league_id.as_str(),
            t.kind,
            t.status,
            t.creator,
            t.created_ms,
            t.status_updated_ms,
            t.week.map(|w| w.as_u16()),
            json_text(&t.roster_ids)?,
            json_text(&t.adds)?,
            json_text(&t.drops)?,
            t.waiver_bid,
            json_text(&t.draft_picks)?,
            now
        ],
    )
}
