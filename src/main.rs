//! Entry point: parse CLI, build the sync service, and dispatch to command handlers.

use anyhow::Context;
use clap::Parser;
use sleeper_sync::{
    cli::{Commands, SleeperSync},
    commands::{
        all_leagues::{handle_all_leagues, handle_full_sync},
        catalog::{handle_players, handle_state, handle_trending},
        league::{handle_league_sync, handle_summary},
        transactions::handle_transactions,
        week::{handle_season_sync, handle_week_sync},
    },
    config::{API_BASE_URL_ENV_VAR, DATABASE_URL_ENV_VAR},
    sleeper::types::Trend,
    SyncConfig, SyncService,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "sleeper_sync=debug,info" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Environment first, with command-line flags (already merged with their env
/// vars by clap) taking precedence.
fn load_config(app: &SleeperSync) -> anyhow::Result<SyncConfig> {
    let config = SyncConfig::from_lookup(|key| match key {
        DATABASE_URL_ENV_VAR if app.database_url.is_some() => app.database_url.clone(),
        API_BASE_URL_ENV_VAR if app.api_base_url.is_some() => app.api_base_url.clone(),
        _ => std::env::var(key).ok(),
    })
    .context("invalid configuration")?;
    Ok(config)
}

/// Run the CLI.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app = SleeperSync::parse();
    init_tracing(app.verbose);

    let mut config = load_config(&app)?;
    if let Commands::All {
        season: Some(season),
        ..
    }
    | Commands::Full {
        season: Some(season),
        ..
    } = &app.command
    {
        config = config.with_season(Some(*season));
    }
    debug!(database = ?config.database, api = %config.api_base_url, "configuration loaded");

    let mut service = SyncService::new(config).context("failed to start sync service")?;

    match app.command {
        Commands::League { league } => handle_league_sync(&mut service, league.league_id).await?,
        Commands::Week { league, week } => {
            handle_week_sync(&mut service, league.league_id, week).await?
        }
        Commands::Season {
            league,
            through_week,
        } => handle_season_sync(&mut service, league.league_id, through_week).await?,
        Commands::All { user, .. } => {
            let failed = handle_all_leagues(&mut service, &user).await?;
            if failed > 0 {
                anyhow::bail!("{} league(s) failed to sync", failed);
            }
        }
        Commands::Full { user, .. } => {
            let failed = handle_full_sync(&mut service, &user).await?;
            if failed > 0 {
                anyhow::bail!("{} league or week sync(s) failed", failed);
            }
        }
        Commands::Players => handle_players(&mut service).await?,
        Commands::Trending {
            drops,
            hours,
            limit,
        } => {
            let trend = if drops { Trend::Drop } else { Trend::Add };
            handle_trending(&service, trend, hours, limit).await?
        }
        Commands::Transactions { league, week } => {
            handle_transactions(&mut service, league.league_id, week).await?
        }
        Commands::State { json } => handle_state(&service, json).await?,
        Commands::Summary { league } => handle_summary(&service, league.league_id)?,
    }

    Ok(())
}
