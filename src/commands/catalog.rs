//! Player catalog and platform state commands

use crate::{
    sleeper::{types::Trend, RemoteSource},
    sync::SyncService,
    Result,
};

/// Handle the players command
pub async fn handle_players<S: RemoteSource>(service: &mut SyncService<S>) -> Result<()> {
    println!("Fetching the player catalog (this is a large download)...");
    let report = service.sync_players().await?;
    println!("✓ Players: {}", report.players);
    Ok(())
}

/// Handle the state command
pub async fn handle_state<S: RemoteSource>(service: &SyncService<S>, as_json: bool) -> Result<()> {
    let state = service.nfl_state().await?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&state)?);
        return Ok(());
    }

    println!("Season: {}", state.season);
    println!("Week:   {}", state.week);
    if let Some(season_type) = &state.season_type {
        println!("Type:   {}", season_type);
    }
    Ok(())
}

/// Handle the trending command
pub async fn handle_trending<S: RemoteSource>(
    service: &SyncService<S>,
    trend: Trend,
    lookback_hours: u32,
    limit: u32,
) -> Result<()> {
    let trending = service
        .trending_players(trend, lookback_hours, limit)
        .await?;

    println!(
        "Most {} players, last {} hours:",
        match trend {
            Trend::Add => "added",
            Trend::Drop => "dropped",
        },
        lookback_hours
    );
    println!("{:>8}  {:<26} {:<4} {:<4}", "Count", "Player", "Pos", "Team");
    for entry in &trending {
        let player = entry.player.as_ref();
        println!(
            "{:>8}  {:<26} {:<4} {:<4}",
            entry.count,
            player
                .and_then(|p| p.full_name.as_deref())
                .unwrap_or(entry.player_id.as_str()),
            player.and_then(|p| p.position.as_deref()).unwrap_or("-"),
            player.and_then(|p| p.team.as_deref()).unwrap_or("-"),
        );
    }
    if trending.iter().any(|e| e.player.is_none()) {
        println!("Run `sleeper-sync players` to show names for every player.");
    }
    Ok(())
}
