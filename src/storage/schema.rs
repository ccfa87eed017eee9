//! Database schema and connection management

use crate::config::DatabaseLocation;
use crate::Result;
use rusqlite::Connection;
use std::path::Path;

/// Database connection manager for synced league data
pub struct LeagueDatabase {
    pub(crate) conn: Connection,
}

impl LeagueDatabase {
    /// Open (or create) the database and ensure tables exist
    pub fn open(location: &DatabaseLocation) -> Result<Self> {
        match location {
            DatabaseLocation::File(path) => Self::open_path(path),
            DatabaseLocation::Memory => Self::new_in_memory(),
        }
    }

    pub fn open_path(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::from_connection(Connection::open(path)?)
    }

    /// Create an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let mut db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Initialize the database schema
    pub(crate) fn initialize_schema(&mut self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                user_id TEXT PRIMARY KEY,
                username TEXT,
                display_name TEXT,
                avatar TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS leagues (
                league_id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                season INTEGER NOT NULL,
                sport TEXT NOT NULL,
                status TEXT,
                season_type TEXT,
                total_rosters INTEGER,
                previous_league_id TEXT,
                settings TEXT NOT NULL,
                scoring_settings TEXT NOT NULL,
                roster_positions TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS league_members (
                league_id TEXT NOT NULL REFERENCES leagues(league_id),
                user_id TEXT NOT NULL REFERENCES users(user_id),
                team_name TEXT,
                is_owner INTEGER NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (league_id, user_id)
            );

            CREATE TABLE IF NOT EXISTS players (
                player_id TEXT PRIMARY KEY,
                first_name TEXT,
                last_name TEXT,
                full_name TEXT,
                position TEXT,
                team TEXT,
                age INTEGER,
                years_exp INTEGER,
                college TEXT,
                active INTEGER,
                status TEXT,
                injury_status TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS rosters (
                league_id TEXT NOT NULL REFERENCES leagues(league_id),
                roster_id INTEGER NOT NULL,
                owner_id TEXT REFERENCES users(user_id),
                co_owners TEXT NOT NULL,
                wins INTEGER NOT NULL,
                losses INTEGER NOT NULL,
                ties INTEGER NOT NULL,
                points_for REAL NOT NULL,
                waiver_position INTEGER,
                waiver_budget_used INTEGER NOT NULL,
                total_moves INTEGER NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (league_id, roster_id)
            );

            CREATE TABLE IF NOT EXISTS roster_members (
                league_id TEXT NOT NULL,
                roster_id INTEGER NOT NULL,
                player_id TEXT NOT NULL REFERENCES players(player_id),
                is_starter INTEGER NOT NULL,
                is_reserve INTEGER NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (league_id, roster_id, player_id),
                FOREIGN KEY (league_id, roster_id) REFERENCES rosters(league_id, roster_id)
            );

            CREATE TABLE IF NOT EXISTS matchups (
                league_id TEXT NOT NULL REFERENCES leagues(league_id),
                season INTEGER NOT NULL,
                week INTEGER NOT NULL CHECK (week BETWEEN 1 AND 18),
                roster_id INTEGER NOT NULL,
                matchup_id INTEGER,
                opponent_roster_id INTEGER,
                points REAL NOT NULL,
                points_against REAL,
                custom_points REAL,
                starters TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (league_id, season, week, roster_id),
                FOREIGN KEY (league_id, roster_id) REFERENCES rosters(league_id, roster_id)
            );

            CREATE TABLE IF NOT EXISTS weekly_roster_entries (
                league_id TEXT NOT NULL,
                season INTEGER NOT NULL,
                week INTEGER NOT NULL,
                roster_id INTEGER NOT NULL,
                player_id TEXT NOT NULL REFERENCES players(player_id),
                is_starter INTEGER NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (league_id, season, week, roster_id, player_id),
                FOREIGN KEY (league_id, season, week, roster_id)
                    REFERENCES matchups(league_id, season, week, roster_id)
            );

            CREATE TABLE IF NOT EXISTS player_week_stats (
                league_id TEXT NOT NULL,
                season INTEGER NOT NULL,
                week INTEGER NOT NULL,
                player_id TEXT NOT NULL,
                roster_id INTEGER NOT NULL,
                points REAL NOT NULL,
                is_starter INTEGER NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (league_id, season, week, player_id),
                FOREIGN KEY (league_id, season, week, roster_id, player_id)
                    REFERENCES weekly_roster_entries(league_id, season, week, roster_id, player_id)
            );

            CREATE TABLE IF NOT EXISTS transactions (
                transaction_id TEXT PRIMARY KEY,
                league_id TEXT NOT NULL REFERENCES leagues(league_id),
                kind TEXT NOT NULL,
                status TEXT,
                creator TEXT,
                created_ms INTEGER,
                status_updated_ms INTEGER,
                week INTEGER,
                roster_ids TEXT NOT NULL,
                adds TEXT NOT NULL,
                drops TEXT NOT NULL,
                waiver_bid INTEGER,
                draft_picks TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_stats_player
                ON player_week_stats(player_id, season, week);

            CREATE INDEX IF NOT EXISTS idx_transactions_league_week
                ON transactions(league_id, week);",
        )?;

        Ok(())
    }
}
