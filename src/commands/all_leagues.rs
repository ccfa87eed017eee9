//! Multi-league sync commands

use crate::{sleeper::RemoteSource, sync::SyncService, Result};

/// Handle the all command. Returns the number of leagues that failed.
pub async fn handle_all_leagues<S: RemoteSource>(
    service: &mut SyncService<S>,
    user: &str,
) -> Result<usize> {
    println!("Syncing every league for {}...", user);

    let report = service.sync_all_leagues(user).await?;

    if report.attempted() == 0 {
        println!("No leagues found for season {}", report.season);
        return Ok(0);
    }

    for league in &report.successes {
        let state = if league.is_noop() { "up to date" } else { "synced" };
        println!("✓ {} ({}) {}", league.name, league.league_id, state);
    }
    for failure in &report.failures {
        eprintln!(
            "✗ {} ({}): {}",
            failure.name.as_deref().unwrap_or("unnamed league"),
            failure.league_id,
            failure.error
        );
    }
    println!(
        "{} of {} leagues synced for season {}",
        report.successes.len(),
        report.attempted(),
        report.season
    );
    Ok(report.failures.len())
}

/// Handle the full command. Returns the number of leagues and weeks that failed.
pub async fn handle_full_sync<S: RemoteSource>(
    service: &mut SyncService<S>,
    user: &str,
) -> Result<usize> {
    println!("Full sync for {}: players, leagues, current week...", user);

    let report = service.sync_full(user).await?;

    println!("✓ Players: {}", report.players.players);
    for league in &report.leagues.successes {
        println!("✓ {} ({}) rosters: {}", league.name, league.league_id, league.rosters);
    }
    for failure in &report.leagues.failures {
        eprintln!(
            "✗ {} ({}): {}",
            failure.name.as_deref().unwrap_or("unnamed league"),
            failure.league_id,
            failure.error
        );
    }
    match report.week {
        Some(week) => {
            for week_report in &report.weeks {
                println!(
                    "✓ League {} week {} stats: {}",
                    week_report.league_id, week, week_report.stats
                );
            }
            for failure in &report.week_failures {
                eprintln!(
                    "✗ League {} week {}: {}",
                    failure.league_id, failure.week, failure.error
                );
            }
        }
        None => println!("No current week to sync for season {}", report.leagues.season),
    }
    Ok(report.failure_count())
}
