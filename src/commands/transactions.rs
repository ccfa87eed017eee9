//! League transaction sync command

use crate::{sleeper::RemoteSource, sync::SyncService, LeagueId, Result, Week};

use super::resolve_league_id;

/// Handle the transactions command
pub async fn handle_transactions<S: RemoteSource>(
    service: &mut SyncService<S>,
    league_id: Option<LeagueId>,
    week: Week,
) -> Result<()> {
    let league_id = resolve_league_id(league_id)?;
    let report = service.sync_transactions(&league_id, week).await?;
    println!(
        "✓ League {} week {} transactions: {}",
        report.league_id, report.week, report.transactions
    );
    Ok(())
}
