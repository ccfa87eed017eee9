//! Read queries and row mapping for the league database

use super::{models::*, schema::LeagueDatabase};
use crate::cli::types::{
    ids::{PlayerId, RosterId, UserId},
    time::{Season, Week},
};
use crate::error::SyncError;
use crate::{LeagueId, Result};
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};
use serde::{de::DeserializeOwned, Serialize};
use std::str::FromStr;

// ---- column helpers --------------------------------------------------------

pub(super) fn json_text<T: Serialize + ?Sized>(value: &T) -> rusqlite::Result<String> {
    serde_json::to_string(value).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

fn json_col<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn id_col<T: FromStr<Err = SyncError>>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn opt_id_col<T: FromStr<Err = SyncError>>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|r| {
        r.parse::<T>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

// ---- row mappers -----------------------------------------------------------

const USER_COLUMNS: &str = "user_id, username, display_name, avatar";

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        user_id: id_col(row, 0)?,
        username: row.get(1)?,
        display_name: row.get(2)?,
        avatar: row.get(3)?,
    })
}

const LEAGUE_COLUMNS: &str = "league_id, name, season, sport, status, season_type, total_rosters,
     previous_league_id, settings, scoring_settings, roster_positions";

fn row_to_league(row: &Row<'_>) -> rusqlite::Result<League> {
    Ok(League {
        league_id: id_col(row, 0)?,
        name: row.get(1)?,
        season: Season::new(row.get(2)?),
        sport: row.get(3)?,
        status: row.get(4)?,
        season_type: row.get(5)?,
        total_rosters: row.get(6)?,
        previous_league_id: row.get(7)?,
        settings: json_col(row, 8)?,
        scoring_settings: json_col(row, 9)?,
        roster_positions: json_col(row, 10)?,
    })
}

const MEMBER_COLUMNS: &str = "league_id, user_id, team_name, is_owner";

fn row_to_league_member(row: &Row<'_>) -> rusqlite::Result<LeagueMember> {
    Ok(LeagueMember {
        league_id: id_col(row, 0)?,
        user_id: id_col(row, 1)?,
        team_name: row.get(2)?,
        is_owner: row.get(3)?,
    })
}

const PLAYER_COLUMNS: &str = "player_id, first_name, last_name, full_name, position, team, age,
     years_exp, college, active, status, injury_status";

fn row_to_player(row: &Row<'_>) -> rusqlite::Result<Player> {
    Ok(Player {
        player_id: PlayerId::new(row.get::<_, String>(0)?),
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        full_name: row.get(3)?,
        position: row.get(4)?,
        team: row.get(5)?,
        age: row.get(6)?,
        years_exp: row.get(7)?,
        college: row.get(8)?,
        active: row.get(9)?,
        status: row.get(10)?,
        injury_status: row.get(11)?,
    })
}

const ROSTER_COLUMNS: &str = "league_id, roster_id, owner_id, co_owners, wins, losses, ties,
     points_for, waiver_position, waiver_budget_used, total_moves";

fn row_to_roster(row: &Row<'_>) -> rusqlite::Result<Roster> {
    Ok(Roster {
        league_id: id_col(row, 0)?,
        roster_id: RosterId(row.get(1)?),
        owner_id: opt_id_col(row, 2)?,
        co_owners: json_col(row, 3)?,
        wins: row.get(4)?,
        losses: row.get(5)?,
        ties: row.get(6)?,
        points_for: row.get(7)?,
        waiver_position: row.get(8)?,
        waiver_budget_used: row.get(9)?,
        total_moves: row.get(10)?,
    })
}

const ROSTER_MEMBER_COLUMNS: &str = "league_id, roster_id, player_id, is_starter, is_reserve";

fn row_to_roster_member(row: &Row<'_>) -> rusqlite::Result<RosterMember> {
    Ok(RosterMember {
        league_id: id_col(row, 0)?,
        roster_id: RosterId(row.get(1)?),
        player_id: PlayerId::new(row.get::<_, String>(2)?),
        is_starter: row.get(3)?,
        is_reserve: row.get(4)?,
    })
}

const MATCHUP_COLUMNS: &str = "league_id, season, week, roster_id, matchup_id, opponent_roster_id,
     points, points_against, custom_points, starters";

fn row_to_matchup(row: &Row<'_>) -> rusqlite::Result<Matchup> {
    Ok(Matchup {
        league_id: id_col(row, 0)?,
        season: Season::new(row.get(1)?),
        week: Week::new(row.get(2)?),
        roster_id: RosterId(row.get(3)?),
        matchup_id: row.get(4)?,
        opponent_roster_id: row.get::<_, Option<u32>>(5)?.map(RosterId),
        points: row.get(6)?,
        points_against: row.get(7)?,
        custom_points: row.get(8)?,
        starters: json_col(row, 9)?,
    })
}

const ENTRY_COLUMNS: &str = "league_id, season, week, roster_id, player_id, is_starter";

fn row_to_weekly_entry(row: &Row<'_>) -> rusqlite::Result<WeeklyRosterEntry> {
    Ok(WeeklyRosterEntry {
        league_id: id_col(row, 0)?,
        season: Season::new(row.get(1)?),
        week: Week::new(row.get(2)?),
        roster_id: RosterId(row.get(3)?),
        player_id: PlayerId::new(row.get::<_, String>(4)?),
        is_starter: row.get(5)?,
    })
}

const STAT_COLUMNS: &str = "league_id, season, week, player_id, roster_id, points, is_starter";

fn row_to_stat(row: &Row<'_>) -> rusqlite::Result<PlayerWeekStat> {
    Ok(PlayerWeekStat {
        league_id: id_col(row, 0)?,
        season: Season::new(row.get(1)?),
        week: Week::new(row.get(2)?),
        player_id: PlayerId::new(row.get::<_, String>(3)?),
        roster_id: RosterId(row.get(4)?),
        points: row.get(5)?,
        is_starter: row.get(6)?,
    })
}

const TRANSACTION_COLUMNS: &str = "transaction_id, league_id, kind, status, creator, created_ms,
     status_updated_ms, week, roster_ids, adds, drops, waiver_bid, draft_picks";

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<LeagueTransaction> {
    Ok(LeagueTransaction {
        transaction_id: row.get(0)?,
        league_id: id_col(row, 1)?,
        kind: row.get(2)?,
        status: row.get(3)?,
        creator: row.get(4)?,
        created_ms: row.get(5)?,
        status_updated_ms: row.get(6)?,
        week: row.get::<_, Option<u16>>(7)?.map(Week::new),
        roster_ids: json_col(row, 8)?,
        adds: json_col(row, 9)?,
        drops: json_col(row, 10)?,
        waiver_bid: row.get(11)?,
        draft_picks: json_col(row, 12)?,
    })
}

// ---- lookups by natural key (shared with SyncUnit) -------------------------

pub(super) fn find_user(conn: &Connection, user_id: &UserId) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
        params![user_id.as_str()],
        row_to_user,
    )
    .optional()
}

pub(super) fn find_league(conn: &Connection, league_id: &LeagueId) -> rusqlite::Result<Option<League>> {
    conn.query_row(
        &format!("SELECT {LEAGUE_COLUMNS} FROM leagues WHERE league_id = ?1"),
        params![league_id.as_str()],
        row_to_league,
    )
    .optional()
}

pub(super) fn find_league_member(
    conn: &Connection,
    league_id: &LeagueId,
    user_id: &UserId,
) -> rusqlite::Result<Option<LeagueMember>> {
    conn.query_row(
        &format!("SELECT {MEMBER_COLUMNS} FROM league_members WHERE league_id = ?1 AND user_id = ?2"),
        params![league_id.as_str(), user_id.as_str()],
        row_to_league_member,
    )
    .optional()
}

pub(super) fn find_player(conn: &Connection, player_id: &PlayerId) -> rusqlite::Result<Option<Player>> {
    conn.query_row(
        &format!("SELECT {PLAYER_COLUMNS} FROM players WHERE player_id = ?1"),
        params![player_id.as_str()],
        row_to_player,
    )
    .optional()
}

pub(super) fn find_roster(
    conn: &Connection,
    league_id: &LeagueId,
    roster_id: RosterId,
) -> rusqlite::Result<Option<Roster>> {
    conn.query_row(
        &format!("SELECT {ROSTER_COLUMNS} FROM rosters WHERE league_id = ?1 AND roster_id = ?2"),
        params![league_id.as_str(), roster_id.as_u32()],
        row_to_roster,
    )
    .optional()
}

pub(super) fn find_roster_member(
    conn: &Connection,
    member: &RosterMember,
) -> rusqlite::Result<Option<RosterMember>> {
    conn.query_row(
        &format!(
            "SELECT {ROSTER_MEMBER_COLUMNS} FROM roster_members
             WHERE league_id = ?1 AND roster_id = ?2 AND player_id = ?3"
        ),
        params![
            member.league_id.as_str(),
            member.roster_id.as_u32(),
            member.player_id.as_str()
        ],
        row_to_roster_member,
    )
    .optional()
}

pub(super) fn find_matchup(conn: &Connection, matchup: &Matchup) -> rusqlite::Result<Option<Matchup>> {
    conn.query_row(
        &format!(
            "SELECT {MATCHUP_COLUMNS} FROM matchups
             WHERE league_id = ?1 AND season = ?2 AND week = ?3 AND roster_id = ?4"
        ),
        params![
            matchup.league_id.as_str(),
            matchup.season.as_u16(),
            matchup.week.as_u16(),
            matchup.roster_id.as_u32()
        ],
        row_to_matchup,
    )
    .optional()
}

pub(super) fn find_weekly_entry(
    conn: &Connection,
    entry: &WeeklyRosterEntry,
) -> rusqlite::Result<Option<WeeklyRosterEntry>> {
    conn.query_row(
        &format!(
            "SELECT {ENTRY_COLUMNS} FROM weekly_roster_entries
             WHERE league_id = ?1 AND season = ?2 AND week = ?3 AND roster_id = ?4 AND player_id = ?5"
        ),
        params![
            entry.league_id.as_str(),
            entry.season.as_u16(),
            entry.week.as_u16(),
            entry.roster_id.as_u32(),
            entry.player_id.as_str()
        ],
        row_to_weekly_entry,
    )
    .optional()
}

pub(super) fn find_stat(conn: &Connection, stat: &PlayerWeekStat) -> rusqlite::Result<Option<PlayerWeekStat>> {
    conn.query_row(
        &format!(
            "SELECT {STAT_COLUMNS} FROM player_week_stats
             WHERE league_id = ?1 AND season = ?2 AND week = ?3 AND player_id = ?4"
        ),
        params![
            stat.league_id.as_str(),
            stat.season.as_u16(),
            stat.week.as_u16(),
            stat.player_id.as_str()
        ],
        row_to_stat,
    )
    .optional()
}

pub(super) fn find_transaction(
    conn: &Connection,
    transaction_id: &str,
) -> rusqlite::Result<Option<LeagueTransaction>> {
    conn.query_row(
        &format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE transaction_id = ?1"),
        params![transaction_id],
        row_to_transaction,
    )
    .optional()
}

pub(super) fn list_matchups(
    conn: &Connection,
    league_id: &LeagueId,
    season: Season,
    week: Week,
) -> rusqlite::Result<Vec<Matchup>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MATCHUP_COLUMNS} FROM matchups
         WHERE league_id = ?1 AND season = ?2 AND week = ?3
         ORDER BY roster_id"
    ))?;
    let rows = stmt.query_map(
        params![league_id.as_str(), season.as_u16(), week.as_u16()],
        row_to_matchup,
    )?;
    rows.collect()
}

pub(super) fn list_weekly_entries(
    conn: &Connection,
    league_id: &LeagueId,
    season: Season,
    week: Week,
) -> rusqlite::Result<Vec<WeeklyRosterEntry>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ENTRY_COLUMNS} FROM weekly_roster_entries
         WHERE league_id = ?1 AND season = ?2 AND week = ?3
         ORDER BY roster_id, player_id"
    ))?;
    let rows = stmt.query_map(
        params![league_id.as_str(), season.as_u16(), week.as_u16()],
        row_to_weekly_entry,
    )?;
    rows.collect()
}

pub(super) fn list_week_stats(
    conn: &Connection,
    league_id: &LeagueId,
    season: Season,
    week: Week,
) -> rusqlite::Result<Vec<PlayerWeekStat>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {STAT_COLUMNS} FROM player_week_stats
         WHERE league_id = ?1 AND season = ?2 AND week = ?3
         ORDER BY player_id"
    ))?;
    let rows = stmt.query_map(
        params![league_id.as_str(), season.as_u16(), week.as_u16()],
        row_to_stat,
    )?;
    rows.collect()
}

pub(super) fn list_league_members(
    conn: &Connection,
    league_id: &LeagueId,
) -> rusqlite::Result<Vec<LeagueMember>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MEMBER_COLUMNS} FROM league_members WHERE league_id = ?1 ORDER BY user_id"
    ))?;
    let rows = stmt.query_map(params![league_id.as_str()], row_to_league_member)?;
    rows.collect()
}

pub(super) fn list_roster_members(
    conn: &Connection,
    league_id: &LeagueId,
) -> rusqlite::Result<Vec<RosterMember>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ROSTER_MEMBER_COLUMNS} FROM roster_members
         WHERE league_id = ?1 ORDER BY roster_id, player_id"
    ))?;
    let rows = stmt.query_map(params![league_id.as_str()], row_to_roster_member)?;
    rows.collect()
}

fn count(conn: &Connection, table: &str) -> rusqlite::Result<u64> {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
}

impl LeagueDatabase {
    pub fn get_user(&self, user_id: &UserId) -> Result<Option<User>> {
        Ok(find_user(&self.conn, user_id)?)
    }

    pub fn get_league(&self, league_id: &LeagueId) -> Result<Option<League>> {
        Ok(find_league(&self.conn, league_id)?)
    }

    pub fn get_player(&self, player_id: &PlayerId) -> Result<Option<Player>> {
        Ok(find_player(&self.conn, player_id)?)
    }

    pub fn get_roster(&self, league_id: &LeagueId, roster_id: RosterId) -> Result<Option<Roster>> {
        Ok(find_roster(&self.conn, league_id, roster_id)?)
    }

    pub fn get_transaction(&self, transaction_id: &str) -> Result<Option<LeagueTransaction>> {
        Ok(find_transaction(&self.conn, transaction_id)?)
    }

    /// All rosters of a league ordered by roster id
    pub fn get_rosters(&self, league_id: &LeagueId) -> Result<Vec<Roster>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ROSTER_COLUMNS} FROM rosters WHERE league_id = ?1 ORDER BY roster_id"
        ))?;
        let rows = stmt.query_map(params![league_id.as_str()], row_to_roster)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn get_league_members(&self, league_id: &LeagueId) -> Result<Vec<LeagueMember>> {
        Ok(list_league_members(&self.conn, league_id)?)
    }

    pub fn get_roster_members(&self, league_id: &LeagueId) -> Result<Vec<RosterMember>> {
        Ok(list_roster_members(&self.conn, league_id)?)
    }

    /// Leagues a user holds a seat in
    pub fn get_user_leagues(&self, user_id: &UserId) -> Result<Vec<League>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM leagues l
             JOIN league_members m ON m.league_id = l.league_id
             WHERE m.user_id = ?1
             ORDER BY l.season DESC, l.name",
            LEAGUE_COLUMNS
                .split(',')
                .map(|c| format!("l.{}", c.trim()))
                .collect::<Vec<_>>()
                .join(", ")
        ))?;
        let rows = stmt.query_map(params![user_id.as_str()], row_to_league)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn get_matchups(&self, league_id: &LeagueId, season: Season, week: Week) -> Result<Vec<Matchup>> {
        Ok(list_matchups(&self.conn, league_id, season, week)?)
    }

    pub fn get_weekly_entries(
        &self,
        league_id: &LeagueId,
        season: Season,
        week: Week,
    ) -> Result<Vec<WeeklyRosterEntry>> {
        Ok(list_weekly_entries(&self.conn, league_id, season, week)?)
    }

    pub fn get_week_stats(&self, league_id: &LeagueId, season: Season, week: Week) -> Result<Vec<PlayerWeekStat>> {
        Ok(list_week_stats(&self.conn, league_id, season, week)?)
    }

    pub fn get_league_transactions(&self, league_id: &LeagueId) -> Result<Vec<LeagueTransaction>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions
             WHERE league_id = ?1
             ORDER BY created_ms, transaction_id"
        ))?;
        let rows = stmt.query_map(params![league_id.as_str()], row_to_transaction)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Row counts for every synced table
    pub fn table_counts(&self) -> Result<TableCounts> {
        Ok(TableCounts {
            users: count(&self.conn, "users")?,
            leagues: count(&self.conn, "leagues")?,
            league_members: count(&self.conn, "league_members")?,
            players: count(&self.conn, "players")?,
            rosters: count(&self.conn, "rosters")?,
            roster_members: count(&self.conn, "roster_members")?,
            matchups: count(&self.conn, "matchups")?,
            weekly_roster_entries: count(&self.conn, "weekly_roster_entries")?,
            player_week_stats: count(&self.conn, "player_week_stats")?,
            transactions: count(&self.conn, "transactions")?,
        })
    }

    /// Rosters with their owner's display name, for league summaries
    pub fn roster_summaries(&self, league_id: &LeagueId) -> Result<Vec<RosterSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT r.roster_id, u.display_name, r.wins, r.losses, r.ties, r.points_for,
                    (SELECT COUNT(*) FROM roster_members m
                     WHERE m.league_id = r.league_id AND m.roster_id = r.roster_id)
             FROM rosters r
             LEFT JOIN users u ON u.user_id = r.owner_id
             WHERE r.league_id = ?1
             ORDER BY r.roster_id",
        )?;
        let rows = stmt.query_map(params![league_id.as_str()], |row| {
            Ok(RosterSummary {
                roster_id: RosterId(row.get(0)?),
                owner_display_name: row.get(1)?,
                wins: row.get(2)?,
                losses: row.get(3)?,
                ties: row.get(4)?,
                points_for: row.get(5)?,
                player_count: row.get(6)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Stats whose player is missing from that week's roster snapshot.
    ///
    /// Always zero while foreign keys are enforced; reported by the summary
    /// command as an integrity check on databases written by older builds.
    pub fn count_stats_outside_snapshot(&self, league_id: &LeagueId) -> Result<u64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM player_week_stats s
             WHERE s.league_id = ?1 AND NOT EXISTS (
                 SELECT 1 FROM weekly_roster_entries e
                 WHERE e.league_id = s.league_id AND e.season = s.season AND e.week = s.week
                   AND e.roster_id = s.roster_id AND e.player_id = s.player_id)",
            params![league_id.as_str()],
            |row| row.get(0),
        )?)
    }
}
