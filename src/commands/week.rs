//! Weekly matchup sync commands

use crate::{sleeper::RemoteSource, sync::SyncService, LeagueId, Result, Week};

use super::resolve_league_id;

/// Handle the week command
pub async fn handle_week_sync<S: RemoteSource>(
    service: &mut SyncService<S>,
    league_id: Option<LeagueId>,
    week: Week,
) -> Result<()> {
    let league_id = resolve_league_id(league_id)?;
    let report = service.sync_week(&league_id, week).await?;

    println!("✓ League {} week {} synced", league_id, report.week);
    println!("  matchups: {}", report.matchups);
    println!("  lineups:  {}", report.entries);
    println!("  stats:    {}", report.stats);
    if report.skipped_points > 0 {
        println!(
            "  {} scored players were not on their roster and were skipped",
            report.skipped_points
        );
    }
    Ok(())
}

/// Handle the season command: every week up to `through_week`.
///
/// Failed weeks are listed and do not stop later weeks.
pub async fn handle_season_sync<S: RemoteSource>(
    service: &mut SyncService<S>,
    league_id: Option<LeagueId>,
    through_week: Week,
) -> Result<()> {
    let league_id = resolve_league_id(league_id)?;
    println!(
        "Syncing weeks 1-{} for league {}...",
        through_week, league_id
    );

    let report = service.sync_season(&league_id, through_week).await?;

    for week in &report.weeks {
        println!("  week {:>2}: {} stats", week.week, week.stats);
    }
    for failure in &report.failures {
        eprintln!("  week {:>2}: failed: {}", failure.week, failure.error);
    }
    if report.is_complete() {
        println!("✓ {} weeks synced", report.weeks.len());
    } else {
        println!(
            "{} weeks synced, {} failed",
            report.weeks.len(),
            report.failures.len()
        );
    }
    Ok(())
}
