//! League sync and summary commands

use crate::{sleeper::RemoteSource, sync::SyncService, LeagueId, Result};

use super::resolve_league_id;

/// Handle the league command
pub async fn handle_league_sync<S: RemoteSource>(
    service: &mut SyncService<S>,
    league_id: Option<LeagueId>,
) -> Result<()> {
    let league_id = resolve_league_id(league_id)?;
    println!("Syncing league {} from Sleeper...", league_id);

    let report = service.sync_league(&league_id).await?;

    if report.is_noop() {
        println!("✓ {} ({}) already up to date", report.name, report.season);
        return Ok(());
    }
    println!("✓ {} ({}) synced", report.name, report.season);
    println!("  members:        {}", report.members);
    println!("  rosters:        {}", report.rosters);
    println!("  roster players: {}", report.roster_members);
    if report.stub_players > 0 {
        println!(
            "  {} players stored by id only; run `sleeper-sync players` to fill them in",
            report.stub_players
        );
    }
    Ok(())
}

/// Handle the summary command
pub fn handle_summary<S: RemoteSource>(
    service: &SyncService<S>,
    league_id: Option<LeagueId>,
) -> Result<()> {
    let league_id = resolve_league_id(league_id)?;
    let summary = service.league_summary(&league_id)?;
    let league = &summary.league;

    println!("{} ({} {})", league.name, league.sport, league.season);
    if let Some(status) = &league.status {
        println!("Status: {}", status);
    }
    println!(
        "Members: {}  Transactions: {}",
        summary.member_count, summary.transaction_count
    );
    println!();
    println!("{:>4}  {:<24} {:>7} {:>9} {:>7}", "ID", "Owner", "W-L-T", "PF", "Players");
    for roster in &summary.rosters {
        println!(
            "{:>4}  {:<24} {:>7} {:>9.2} {:>7}",
            roster.roster_id,
            roster.owner_display_name.as_deref().unwrap_or("-"),
            format!("{}-{}-{}", roster.wins, roster.losses, roster.ties),
            roster.points_for,
            roster.player_count
        );
    }
    if summary.stats_outside_snapshot > 0 {
        println!(
            "\nwarning: {} stats reference players outside their weekly roster",
            summary.stats_outside_snapshot
        );
    }
    Ok(())
}
