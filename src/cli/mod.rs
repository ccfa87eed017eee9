//! CLI argument definitions and parsing.

pub mod types;

use clap::{Args, Parser, Subcommand};
use types::{
    ids::LeagueId,
    time::{Season, Week},
};

/// League selection shared between commands
#[derive(Debug, Args)]
pub struct LeagueArg {
    /// League ID (or set `SLEEPER_LEAGUE_ID` env var).
    #[clap(long, short)]
    pub league_id: Option<LeagueId>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sync league metadata, members, and rosters.
    League {
        #[clap(flatten)]
        league: LeagueArg,
    },

    /// Sync one week's matchups, lineups, and player points.
    ///
    /// The league must have been synced first.
    Week {
        #[clap(flatten)]
        league: LeagueArg,

        /// Week number (1-18).
        #[clap(long, short)]
        week: Week,
    },

    /// Sync weeks 1 through `--through-week`, each week on its own.
    Season {
        #[clap(flatten)]
        league: LeagueArg,

        /// Last week to sync (1-18).
        #[clap(long, short = 't')]
        through_week: Week,
    },

    /// Sync every league a user belongs to.
    All {
        /// Sleeper username or user ID.
        #[clap(long, short)]
        user: String,

        /// Season year (defaults to `SLEEPER_SEASON`, then the current NFL season).
        #[clap(long, short)]
        season: Option<Season>,
    },

    /// Player catalog, every league of a user, then each league's current week.
    Full {
        /// Sleeper username or user ID.
        #[clap(long, short)]
        user: String,

        /// Season year (defaults to `SLEEPER_SEASON`, then the current NFL season).
        #[clap(long, short)]
        season: Option<Season>,
    },

    /// Sync the full NFL player catalog.
    Players,

    /// Show the most added (or dropped) players. Reads only.
    Trending {
        /// List drops instead of adds.
        #[clap(long)]
        drops: bool,

        /// Lookback window in hours.
        #[clap(long, default_value_t = 24)]
        hours: u32,

        /// Number of players to show.
        #[clap(long, short = 'n', default_value_t = 25)]
        limit: u32,
    },

    /// Sync league transactions for one week.
    Transactions {
        #[clap(flatten)]
        league: LeagueArg,

        /// Week (transaction leg) number (1-18).
        #[clap(long, short)]
        week: Week,
    },

    /// Show the current NFL season and week.
    State {
        /// Output as JSON instead of text lines.
        #[clap(long)]
        json: bool,
    },

    /// Summarize what is stored for a league.
    Summary {
        #[clap(flatten)]
        league: LeagueArg,
    },
}

#[derive(Debug, Parser)]
#[clap(
    name = "sleeper-sync",
    version,
    about = "Sync Sleeper fantasy football leagues into SQLite"
)]
pub struct SleeperSync {
    /// Database location: `sqlite://path`, `sqlite::memory:`, or a file path.
    #[clap(long, env = "DATABASE_URL", global = true)]
    pub database_url: Option<String>,

    /// Sleeper API base URL.
    #[clap(long, env = "SLEEPER_API_BASE_URL", global = true)]
    pub api_base_url: Option<String>,

    /// Log debug output (`RUST_LOG` takes precedence).
    #[clap(long, short, global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Commands,
}
