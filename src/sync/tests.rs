//! Sync service tests against an in-memory remote

use super::*;
use crate::config::DatabaseLocation;
use crate::sleeper::types::{
    RemoteLeague, RemoteLeagueUser, RemoteMatchup, RemotePlayer, RemoteRoster, RemoteTransaction,
    RemoteTrendingPlayer, RemoteUser,
};
use crate::storage::UpsertOutcome;
use crate::cli::types::ids::{PlayerId, RosterId, UserId};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

const LEAGUE: &str = "1001";
const OTHER_LEAGUE: &str = "2002";

#[derive(Default)]
struct FakeState {
    users: HashMap<String, RemoteUser>,
    user_leagues: Vec<RemoteLeague>,
    leagues: HashMap<String, RemoteLeague>,
    league_users: HashMap<String, Vec<RemoteLeagueUser>>,
    rosters: HashMap<String, Vec<RemoteRoster>>,
    matchups: HashMap<(String, u16), Vec<RemoteMatchup>>,
    transactions: HashMap<(String, u16), Vec<RemoteTransaction>>,
    players: BTreeMap<String, RemotePlayer>,
    trending: Vec<RemoteTrendingPlayer>,
    nfl_state: Option<NflState>,
    /// Endpoints that answer HTTP 500.
    failing: HashSet<String>,
    calls: Vec<String>,
}

#[derive(Clone, Default)]
struct FakeSource {
    state: Arc<Mutex<FakeState>>,
}

impl FakeSource {
    fn hit(&self, endpoint: String) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(endpoint.clone());
        if state.failing.contains(&endpoint) {
            return Err(SyncError::Status {
                endpoint,
                status: 500,
                retry_after: None,
            });
        }
        Ok(())
    }

    fn edit(&self, f: impl FnOnce(&mut FakeState)) {
        f(&mut self.state.lock().unwrap());
    }

    fn fail(&self, endpoint: &str) {
        self.edit(|s| {
            s.failing.insert(endpoint.to_string());
        });
    }

    fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl RemoteSource for FakeSource {
    async fn get_user(&self, username_or_id: &str) -> Result<Option<RemoteUser>> {
        self.hit(format!("user/{username_or_id}"))?;
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .values()
            .find(|u| u.user_id == username_or_id || u.username.as_deref() == Some(username_or_id))
            .cloned())
    }

    async fn get_user_leagues(&self, user_id: &UserId, season: Season) -> Result<Vec<RemoteLeague>> {
        self.hit(format!("user/{user_id}/leagues/nfl/{season}"))?;
        Ok(self.state.lock().unwrap().user_leagues.clone())
    }

    async fn get_league(&self, league_id: &LeagueId) -> Result<Option<RemoteLeague>> {
        self.hit(format!("league/{league_id}"))?;
        Ok(self.state.lock().unwrap().leagues.get(league_id.as_str()).cloned())
    }

    async fn get_league_users(&self, league_id: &LeagueId) -> Result<Vec<RemoteLeagueUser>> {
        self.hit(format!("league/{league_id}/users"))?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .league_users
            .get(league_id.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn get_league_rosters(&self, league_id: &LeagueId) -> Result<Vec<RemoteRoster>> {
        self.hit(format!("league/{league_id}/rosters"))?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .rosters
            .get(league_id.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn get_matchups(&self, league_id: &LeagueId, week: Week) -> Result<Vec<RemoteMatchup>> {
        self.hit(format!("league/{league_id}/matchups/{week}"))?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .matchups
            .get(&(league_id.to_string(), week.as_u16()))
            .cloned()
            .unwrap_or_default())
    }

    async fn get_transactions(&self, league_id: &LeagueId, week: Week) -> Result<Vec<RemoteTransaction>> {
        self.hit(format!("league/{league_id}/transactions/{week}"))?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .transactions
            .get(&(league_id.to_string(), week.as_u16()))
            .cloned()
            .unwrap_or_default())
    }

    async fn get_players(&self) -> Result<BTreeMap<String, RemotePlayer>> {
        self.hit("players/nfl".to_string())?;
        Ok(self.state.lock().unwrap().players.clone())
    }

    async fn get_trending_players(
        &self,
        trend: Trend,
        lookback_hours: u32,
        limit: u32,
    ) -> Result<Vec<RemoteTrendingPlayer>> {
        self.hit(format!(
            "players/nfl/trending/{}?lookback_hours={lookback_hours}&limit={limit}",
            trend.as_str()
        ))?;
        let state = self.state.lock().unwrap();
        Ok(state.trending.iter().take(limit as usize).cloned().collect())
    }

    async fn get_nfl_state(&self) -> Result<NflState> {
        self.hit("state/nfl".to_string())?;
        self.state
            .lock()
            .unwrap()
            .nfl_state
            .clone()
            .ok_or(SyncError::NotFound {
                entity: EntityKind::NflState,
                id: "nfl".to_string(),
            })
    }
}

// ---- fixtures ----------------------------------------------------------------

fn from_json<T: DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).unwrap()
}

fn remote_league(id: &str, name: &str) -> RemoteLeague {
    from_json(json!({
        "league_id": id,
        "name": name,
        "season": "2025",
        "sport": "nfl",
        "status": "in_season",
        "total_rosters": 2,
        "settings": { "playoff_week_start": 15 },
        "scoring_settings": { "rec": 1.0 },
        "roster_positions": ["QB", "RB", "WR", "BN"]
    }))
}

fn remote_roster(roster_id: u32, owner: &str, players: &[&str], starters: &[&str]) -> RemoteRoster {
    from_json(json!({
        "roster_id": roster_id,
        "owner_id": owner,
        "players": players,
        "starters": starters,
        "settings": { "wins": 3, "losses": 2, "fpts": 512, "fpts_decimal": 46 }
    }))
}

fn remote_matchup(roster_id: u32, matchup_id: u32, players: &[&str], points: Value) -> RemoteMatchup {
    from_json(json!({
        "roster_id": roster_id,
        "matchup_id": matchup_id,
        "points": 100.0 + roster_id as f64,
        "players": players,
        "starters": [players[0]],
        "players_points": points
    }))
}

/// One two-team league with a scored week 1.
fn seed_league(source: &FakeSource, league: &str) {
    source.edit(|s| {
        s.leagues.insert(league.to_string(), remote_league(league, "Dynasty Bros"));
        s.league_users.insert(
            league.to_string(),
            vec![
                from_json(json!({
                    "user_id": "11",
                    "display_name": "Alice",
                    "is_owner": true,
                    "metadata": { "team_name": "Alice's Aces" }
                })),
                from_json(json!({ "user_id": "12", "display_name": "Bob" })),
            ],
        );
        s.rosters.insert(
            league.to_string(),
            vec![
                remote_roster(1, "11", &["a1", "a2", "a3"], &["a1", "a2"]),
                remote_roster(2, "12", &["b1", "b2"], &["b1"]),
            ],
        );
        s.matchups.insert(
            (league.to_string(), 1),
            vec![
                remote_matchup(1, 1, &["a1", "a2", "a3"], json!({ "a1": 10.5, "a2": 7.0, "a3": 0.0 })),
                remote_matchup(2, 1, &["b1", "b2"], json!({ "b1": 12.0, "b2": 3.0, "zz": 1.0 })),
            ],
        );
    });
}

fn seed_user(source: &FakeSource) {
    source.edit(|s| {
        s.users.insert(
            "11".to_string(),
            from_json(json!({ "user_id": "11", "username": "alice", "display_name": "Alice" })),
        );
        s.nfl_state = Some(from_json(json!({ "season": "2025", "week": 4 })));
    });
}

fn service(source: &FakeSource) -> SyncService<FakeSource> {
    SyncService::with_parts(
        source.clone(),
        LeagueDatabase::new_in_memory().unwrap(),
        SyncConfig::new(DatabaseLocation::Memory),
    )
}

fn league_id() -> LeagueId {
    LeagueId::new(LEAGUE).unwrap()
}

// ---- sync_league ---------------------------------------------------------------

#[tokio::test]
async fn test_sync_league_writes_all_rows() {
    let source = FakeSource::default();
    seed_league(&source, LEAGUE);
    let mut service = service(&source);

    let report = service.sync_league(&league_id()).await.unwrap();

    assert_eq!(report.league, Some(UpsertOutcome::Inserted));
    assert_eq!(report.members.inserted, 2);
    assert_eq!(report.rosters.inserted, 2);
    assert_eq!(report.roster_members.inserted, 5);
    assert_eq!(report.stub_players, 5);

    let db = service.database();
    let league = db.get_league(&league_id()).unwrap().unwrap();
    assert_eq!(league.name, "Dynasty Bros");
    assert_eq!(league.season, Season::new(2025));

    let roster = db.get_roster(&league_id(), RosterId::new(1)).unwrap().unwrap();
    assert_eq!(roster.owner_id, Some(UserId::new("11").unwrap()));
    assert!((roster.points_for - 512.46).abs() < 1e-9);

    let members = db.get_league_members(&league_id()).unwrap();
    assert_eq!(members[0].team_name.as_deref(), Some("Alice's Aces"));
    assert!(members[0].is_owner);
}

#[tokio::test]
async fn test_sync_league_twice_is_noop() {
    let source = FakeSource::default();
    seed_league(&source, LEAGUE);
    let mut service = service(&source);

    service.sync_league(&league_id()).await.unwrap();
    let before = service.database().table_counts().unwrap();

    let second = service.sync_league(&league_id()).await.unwrap();

    assert!(second.is_noop());
    assert_eq!(second.league, Some(UpsertOutcome::Unchanged));
    assert_eq!(second.roster_members.unchanged, 5);
    assert_eq!(service.database().table_counts().unwrap(), before);
}

#[tokio::test]
async fn test_sync_league_null_league_is_not_found() {
    let source = FakeSource::default();
    let mut service = service(&source);

    let err = service.sync_league(&league_id()).await.unwrap_err();
    assert!(matches!(
        err,
        SyncError::NotFound {
            entity: EntityKind::League,
            ..
        }
    ));
}

#[tokio::test]
async fn test_sync_league_fetch_failure_commits_nothing() {
    let source = FakeSource::default();
    seed_league(&source, LEAGUE);
    source.fail("league/1001/rosters");
    let mut service = service(&source);

    let err = service.sync_league(&league_id()).await.unwrap_err();

    assert!(matches!(err, SyncError::Status { status: 500, .. }));
    assert_eq!(service.database().table_counts().unwrap(), Default::default());
}

#[tokio::test]
async fn test_sync_league_malformed_roster_commits_nothing() {
    let source = FakeSource::default();
    seed_league(&source, LEAGUE);
    source.edit(|s| {
        s.rosters
            .get_mut(LEAGUE)
            .unwrap()
            .push(remote_roster(2, "12", &["c1"], &[]));
    });
    let mut service = service(&source);

    let err = service.sync_league(&league_id()).await.unwrap_err();

    match err {
        SyncError::MalformedData { entity, id, .. } => {
            assert_eq!(entity, EntityKind::Roster);
            assert_eq!(id, "1001/2");
        }
        other => panic!("Expected MalformedData, got {:?}", other),
    }
    assert!(service.database().get_league(&league_id()).unwrap().is_none());
}

#[tokio::test]
async fn test_sync_league_reconciles_roster_membership() {
    let source = FakeSource::default();
    seed_league(&source, LEAGUE);
    let mut service = service(&source);
    service.sync_league(&league_id()).await.unwrap();

    source.edit(|s| {
        s.rosters.get_mut(LEAGUE).unwrap()[1] = remote_roster(2, "12", &["b1", "c9"], &["b1"]);
        s.league_users.get_mut(LEAGUE).unwrap().truncate(1);
    });
    let report = service.sync_league(&league_id()).await.unwrap();

    assert_eq!(report.roster_members.inserted, 1);
    assert_eq!(report.roster_members.removed, 1);
    assert_eq!(report.members.removed, 1);

    let members: Vec<_> = service
        .database()
        .get_roster_members(&league_id())
        .unwrap()
        .into_iter()
        .filter(|m| m.roster_id == RosterId::new(2))
        .map(|m| m.player_id)
        .collect();
    assert_eq!(members, vec![PlayerId::new("b1"), PlayerId::new("c9")]);

    // Entities outlive their links.
    let db = service.database();
    assert!(db.get_player(&PlayerId::new("b2")).unwrap().is_some());
    assert!(db.get_user(&UserId::new("12").unwrap()).unwrap().is_some());
}

#[tokio::test]
async fn test_sync_league_roster_with_null_settings() {
    let source = FakeSource::default();
    seed_league(&source, LEAGUE);
    source.edit(|s| {
        s.rosters.get_mut(LEAGUE).unwrap()[1] = from_json(json!({
            "roster_id": 2,
            "owner_id": "12",
            "players": ["b1"],
            "settings": null
        }));
    });
    let mut service = service(&source);

    service.sync_league(&league_id()).await.unwrap();

    let roster = service
        .database()
        .get_roster(&league_id(), RosterId::new(2))
        .unwrap()
        .unwrap();
    assert_eq!((roster.wins, roster.losses, roster.ties), (0, 0, 0));
    assert_eq!(roster.points_for, 0.0);
}

// ---- sync_week -----------------------------------------------------------------

#[tokio::test]
async fn test_sync_week_requires_synced_league() {
    let source = FakeSource::default();
    seed_league(&source, LEAGUE);
    let mut service = service(&source);

    let err = service.sync_week(&league_id(), Week::new(1)).await.unwrap_err();

    assert!(matches!(err, SyncError::NotFound { .. }));
    assert!(source.calls().is_empty());
}

#[tokio::test]
async fn test_sync_week_rejects_out_of_range_week() {
    let source = FakeSource::default();
    let mut service = service(&source);

    for week in [0, Week::MAX + 1] {
        let err = service.sync_week(&league_id(), Week::new(week)).await.unwrap_err();
        assert!(matches!(err, SyncError::InvalidWeek { .. }), "week {week}");
    }
}

#[tokio::test]
async fn test_sync_week_stats_only_for_snapshot_players() {
    let source = FakeSource::default();
    seed_league(&source, LEAGUE);
    let mut service = service(&source);
    service.sync_league(&league_id()).await.unwrap();

    let report = service.sync_week(&league_id(), Week::new(1)).await.unwrap();

    assert_eq!(report.matchups.inserted, 2);
    assert_eq!(report.entries.inserted, 5);
    assert_eq!(report.stats.inserted, 5);
    assert_eq!(report.skipped_points, 1);

    let db = service.database();
    let season = Season::new(2025);
    let entries = db.get_weekly_entries(&league_id(), season, Week::new(1)).unwrap();
    let stats = db.get_week_stats(&league_id(), season, Week::new(1)).unwrap();
    for stat in &stats {
        assert!(entries
            .iter()
            .any(|e| e.player_id == stat.player_id && e.roster_id == stat.roster_id));
    }
    assert!(!stats.iter().any(|s| s.player_id == PlayerId::new("zz")));
    assert_eq!(db.count_stats_outside_snapshot(&league_id()).unwrap(), 0);

    let matchups = db.get_matchups(&league_id(), season, Week::new(1)).unwrap();
    assert_eq!(matchups[0].opponent_roster_id, Some(RosterId::new(2)));
    assert_eq!(matchups[0].points_against, Some(102.0));
    assert_eq!(matchups[1].opponent_roster_id, Some(RosterId::new(1)));
}

#[tokio::test]
async fn test_sync_week_twice_is_noop() {
    let source = FakeSource::default();
    seed_league(&source, LEAGUE);
    let mut service = service(&source);
    service.sync_league(&league_id()).await.unwrap();
    service.sync_week(&league_id(), Week::new(1)).await.unwrap();
    let before = service.database().table_counts().unwrap();

    let second = service.sync_week(&league_id(), Week::new(1)).await.unwrap();

    assert!(second.is_noop());
    assert_eq!(second.stats.unchanged, 5);
    assert_eq!(service.database().table_counts().unwrap(), before);
}

#[tokio::test]
async fn test_sync_week_replaces_changed_snapshot() {
    let source = FakeSource::default();
    seed_league(&source, LEAGUE);
    let mut service = service(&source);
    service.sync_league(&league_id()).await.unwrap();
    service.sync_week(&league_id(), Week::new(1)).await.unwrap();

    // a3 moves to roster 2 and a1 gets a stat correction
    source.edit(|s| {
        s.matchups.insert(
            (LEAGUE.to_string(), 1),
            vec![
                remote_matchup(1, 1, &["a1", "a2"], json!({ "a1": 11.5, "a2": 7.0 })),
                remote_matchup(2, 1, &["b1", "b2", "a3"], json!({ "b1": 12.0, "b2": 3.0, "a3": 4.0 })),
            ],
        );
    });
    let report = service.sync_week(&league_id(), Week::new(1)).await.unwrap();

    assert_eq!(report.entries.removed, 1);
    assert_eq!(report.entries.inserted, 1);
    assert_eq!(report.stats.updated, 1);

    let db = service.database();
    let stats = db.get_week_stats(&league_id(), Season::new(2025), Week::new(1)).unwrap();
    let a3 = stats.iter().find(|s| s.player_id == PlayerId::new("a3")).unwrap();
    assert_eq!(a3.roster_id, RosterId::new(2));
    assert_eq!(a3.points, 4.0);
    assert_eq!(db.count_stats_outside_snapshot(&league_id()).unwrap(), 0);
}

#[tokio::test]
async fn test_sync_week_drops_roster_missing_from_payload() {
    let source = FakeSource::default();
    seed_league(&source, LEAGUE);
    let mut service = service(&source);
    service.sync_league(&league_id()).await.unwrap();
    service.sync_week(&league_id(), Week::new(1)).await.unwrap();

    source.edit(|s| {
        s.matchups.get_mut(&(LEAGUE.to_string(), 1)).unwrap().truncate(1);
    });
    let report = service.sync_week(&league_id(), Week::new(1)).await.unwrap();

    assert_eq!(report.matchups.removed, 1);
    assert_eq!(report.entries.removed, 2);
    assert_eq!(report.stats.removed, 2);

    let db = service.database();
    let season = Season::new(2025);
    let matchups = db.get_matchups(&league_id(), season, Week::new(1)).unwrap();
    assert_eq!(matchups.len(), 1);
    assert_eq!(matchups[0].roster_id, RosterId::new(1));
    assert_eq!(matchups[0].opponent_roster_id, None);
    let entries = db.get_weekly_entries(&league_id(), season, Week::new(1)).unwrap();
    assert!(entries.iter().all(|e| e.roster_id == RosterId::new(1)));
    assert_eq!(db.count_stats_outside_snapshot(&league_id()).unwrap(), 0);
}

#[tokio::test]
async fn test_sync_week_empty_payload_clears_week() {
    let source = FakeSource::default();
    seed_league(&source, LEAGUE);
    let mut service = service(&source);
    service.sync_league(&league_id()).await.unwrap();
    service.sync_week(&league_id(), Week::new(1)).await.unwrap();

    source.edit(|s| {
        s.matchups.insert((LEAGUE.to_string(), 1), vec![]);
    });
    let report = service.sync_week(&league_id(), Week::new(1)).await.unwrap();

    assert_eq!(report.matchups.removed, 2);
    assert_eq!(report.entries.removed, 5);
    assert_eq!(report.stats.removed, 5);
    let counts = service.database().table_counts().unwrap();
    assert_eq!(counts.matchups, 0);
    assert_eq!(counts.weekly_roster_entries, 0);
    assert_eq!(counts.player_week_stats, 0);
    // The roster itself is an entity and stays.
    assert_eq!(counts.rosters, 2);
}

#[tokio::test]
async fn test_sync_week_player_on_two_rosters_is_malformed() {
    let source = FakeSource::default();
    seed_league(&source, LEAGUE);
    let mut service = service(&source);
    service.sync_league(&league_id()).await.unwrap();
    source.edit(|s| {
        s.matchups.insert(
            (LEAGUE.to_string(), 2),
            vec![
                remote_matchup(1, 1, &["a1"], json!({})),
                remote_matchup(2, 1, &["a1"], json!({})),
            ],
        );
    });

    let err = service.sync_week(&league_id(), Week::new(2)).await.unwrap_err();

    assert!(matches!(
        err,
        SyncError::MalformedData {
            entity: EntityKind::WeeklyRosterEntry,
            ..
        }
    ));
    let matchups = service
        .database()
        .get_matchups(&league_id(), Season::new(2025), Week::new(2))
        .unwrap();
    assert!(matchups.is_empty());
}

// ---- sync_season ---------------------------------------------------------------

#[tokio::test]
async fn test_sync_season_collects_week_failures() {
    let source = FakeSource::default();
    seed_league(&source, LEAGUE);
    source.fail("league/1001/matchups/2");
    let mut service = service(&source);
    service.sync_league(&league_id()).await.unwrap();

    let report = service.sync_season(&league_id(), Week::new(3)).await.unwrap();

    assert_eq!(report.weeks.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].week, Week::new(2));
    assert!(!report.is_complete());
}

// ---- sync_all_leagues ------------------------------------------------------------

#[tokio::test]
async fn test_sync_all_leagues_isolates_failures() {
    let source = FakeSource::default();
    seed_user(&source);
    seed_league(&source, LEAGUE);
    seed_league(&source, OTHER_LEAGUE);
    source.edit(|s| {
        s.user_leagues = vec![
            remote_league(LEAGUE, "First"),
            remote_league(OTHER_LEAGUE, "Second"),
        ];
    });
    source.fail("league/1001");
    let mut service = service(&source);

    let report = service.sync_all_leagues("alice").await.unwrap();

    assert_eq!(report.attempted(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].league_id, LEAGUE);
    assert!(matches!(
        report.failures[0].error,
        SyncError::Status { status: 500, .. }
    ));
    assert_eq!(report.successes.len(), 1);
    assert_eq!(report.successes[0].league_id.as_str(), OTHER_LEAGUE);

    let db = service.database();
    assert!(db.get_league(&league_id()).unwrap().is_none());
    assert!(db
        .get_league(&LeagueId::new(OTHER_LEAGUE).unwrap())
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_sync_all_leagues_uses_current_season_when_unset() {
    let source = FakeSource::default();
    seed_user(&source);
    let mut service = service(&source);

    let report = service.sync_all_leagues("11").await.unwrap();

    assert_eq!(report.season, Season::new(2025));
    assert_eq!(report.attempted(), 0);
    assert!(source.calls().contains(&"user/11/leagues/nfl/2025".to_string()));
}

#[tokio::test]
async fn test_sync_all_leagues_prefers_configured_season() {
    let source = FakeSource::default();
    seed_user(&source);
    let mut service = SyncService::with_parts(
        source.clone(),
        LeagueDatabase::new_in_memory().unwrap(),
        SyncConfig::new(DatabaseLocation::Memory).with_season(Some(Season::new(2023))),
    );

    service.sync_all_leagues("alice").await.unwrap();

    let calls = source.calls();
    assert!(calls.contains(&"user/11/leagues/nfl/2023".to_string()));
    assert!(!calls.contains(&"state/nfl".to_string()));
}

#[tokio::test]
async fn test_sync_all_leagues_unknown_user_is_fatal() {
    let source = FakeSource::default();
    let mut service = service(&source);

    let err = service.sync_all_leagues("nobody").await.unwrap_err();
    assert!(matches!(
        err,
        SyncError::NotFound {
            entity: EntityKind::User,
            ..
        }
    ));
}

// ---- sync_full -----------------------------------------------------------------

fn seed_full(source: &FakeSource, state_week: u16) {
    seed_user(source);
    seed_league(source, LEAGUE);
    seed_league(source, OTHER_LEAGUE);
    source.edit(|s| {
        s.user_leagues = vec![
            remote_league(LEAGUE, "First"),
            remote_league(OTHER_LEAGUE, "Second"),
        ];
        s.players.insert(
            "a1".to_string(),
            from_json(json!({ "first_name": "Josh", "last_name": "Allen" })),
        );
        s.nfl_state = Some(from_json(json!({ "season": "2025", "week": state_week })));
    });
}

#[tokio::test]
async fn test_sync_full_runs_catalog_leagues_and_current_week() {
    let source = FakeSource::default();
    seed_full(&source, 1);
    let mut service = service(&source);

    let report = service.sync_full("alice").await.unwrap();

    assert!(report.is_complete());
    assert_eq!(report.players.players.inserted, 1);
    assert_eq!(report.leagues.successes.len(), 2);
    assert_eq!(report.week, Some(Week::new(1)));
    assert_eq!(report.weeks.len(), 2);

    let calls = source.calls();
    let catalog = calls.iter().position(|c| c == "players/nfl").unwrap();
    let first_league = calls.iter().position(|c| c == "league/1001").unwrap();
    let first_week = calls.iter().position(|c| c == "league/1001/matchups/1").unwrap();
    assert!(catalog < first_league && first_league < first_week);

    let stats = service
        .database()
        .get_week_stats(&LeagueId::new(OTHER_LEAGUE).unwrap(), Season::new(2025), Week::new(1))
        .unwrap();
    assert_eq!(stats.len(), 5);
}

#[tokio::test]
async fn test_sync_full_collects_league_and_week_failures() {
    let source = FakeSource::default();
    seed_full(&source, 1);
    source.fail("league/1001");
    source.fail("league/2002/matchups/1");
    let mut service = service(&source);

    let report = service.sync_full("alice").await.unwrap();

    assert_eq!(report.leagues.failures.len(), 1);
    assert_eq!(report.week_failures.len(), 1);
    assert_eq!(report.week_failures[0].league_id.as_str(), OTHER_LEAGUE);
    assert_eq!(report.week_failures[0].week, Week::new(1));
    assert_eq!(report.failure_count(), 2);
    assert!(report.weeks.is_empty());
    // A failed league is never asked for its week
    assert!(!source.calls().contains(&"league/1001/matchups/1".to_string()));
}

#[tokio::test]
async fn test_sync_full_skips_week_in_preseason() {
    let source = FakeSource::default();
    seed_full(&source, 0);
    let mut service = service(&source);

    let report = service.sync_full("alice").await.unwrap();

    assert_eq!(report.week, None);
    assert!(report.weeks.is_empty());
    assert_eq!(report.leagues.successes.len(), 2);
    assert!(!source.calls().iter().any(|c| c.contains("/matchups/")));
}

#[tokio::test]
async fn test_sync_full_skips_week_for_past_season() {
    let source = FakeSource::default();
    seed_full(&source, 5);
    let mut service = SyncService::with_parts(
        source.clone(),
        LeagueDatabase::new_in_memory().unwrap(),
        SyncConfig::new(DatabaseLocation::Memory).with_season(Some(Season::new(2024))),
    );

    let report = service.sync_full("alice").await.unwrap();

    assert_eq!(report.leagues.season, Season::new(2024));
    assert_eq!(report.week, None);
}

#[tokio::test]
async fn test_sync_full_catalog_failure_is_fatal() {
    let source = FakeSource::default();
    seed_full(&source, 1);
    source.fail("players/nfl");
    let mut service = service(&source);

    let err = service.sync_full("alice").await.unwrap_err();

    assert!(matches!(err, SyncError::Status { status: 500, .. }));
    assert!(service.database().get_league(&league_id()).unwrap().is_none());
}

// ---- players, transactions, summary ---------------------------------------------

#[tokio::test]
async fn test_sync_players_fills_stubs() {
    let source = FakeSource::default();
    seed_league(&source, LEAGUE);
    source.edit(|s| {
        s.players.insert(
            "a1".to_string(),
            from_json(json!({
                "player_id": "a1",
                "first_name": "Josh",
                "last_name": "Allen",
                "position": "QB",
                "team": "BUF",
                "active": true
            })),
        );
        s.players.insert(
            "x9".to_string(),
            from_json(json!({ "first_name": "Free", "last_name": "Agent" })),
        );
    });
    let mut service = service(&source);
    service.sync_league(&league_id()).await.unwrap();

    let report = service.sync_players().await.unwrap();

    assert_eq!(report.players.updated, 1);
    assert_eq!(report.players.inserted, 1);
    let a1 = service.database().get_player(&PlayerId::new("a1")).unwrap().unwrap();
    assert_eq!(a1.full_name.as_deref(), Some("Josh Allen"));
    assert_eq!(a1.team.as_deref(), Some("BUF"));

    let again = service.sync_players().await.unwrap();
    assert_eq!(again.players.unchanged, 2);
}

#[tokio::test]
async fn test_sync_transactions_updates_status() {
    let source = FakeSource::default();
    seed_league(&source, LEAGUE);
    let waiver = |status: &str| -> RemoteTransaction {
        from_json(json!({
            "transaction_id": "900",
            "type": "waiver",
            "status": status,
            "creator": "11",
            "created": 1_700_000_000_000i64,
            "leg": 3,
            "roster_ids": [1],
            "adds": { "c1": 1 },
            "drops": { "a3": 1 },
            "settings": { "waiver_bid": 14 }
        }))
    };
    source.edit(|s| {
        s.transactions
            .insert((LEAGUE.to_string(), 3), vec![waiver("processing")]);
    });
    let mut service = service(&source);
    service.sync_league(&league_id()).await.unwrap();

    let first = service.sync_transactions(&league_id(), Week::new(3)).await.unwrap();
    assert_eq!(first.transactions.inserted, 1);

    source.edit(|s| {
        s.transactions
            .insert((LEAGUE.to_string(), 3), vec![waiver("complete")]);
    });
    let second = service.sync_transactions(&league_id(), Week::new(3)).await.unwrap();
    assert_eq!(second.transactions.updated, 1);

    let stored = service.database().get_transaction("900").unwrap().unwrap();
    assert_eq!(stored.status.as_deref(), Some("complete"));
    assert_eq!(stored.week, Some(Week::new(3)));
    assert_eq!(stored.waiver_bid, Some(14));
}

#[tokio::test]
async fn test_league_summary_lists_rosters_with_owners() {
    let source = FakeSource::default();
    seed_league(&source, LEAGUE);
    let mut service = service(&source);
    service.sync_league(&league_id()).await.unwrap();

    let summary = service.league_summary(&league_id()).unwrap();

    assert_eq!(summary.league.name, "Dynasty Bros");
    assert_eq!(summary.member_count, 2);
    assert_eq!(summary.rosters.len(), 2);
    assert_eq!(summary.rosters[0].owner_display_name.as_deref(), Some("Alice"));
    assert_eq!(summary.rosters[1].player_count, 2);
    assert_eq!(summary.stats_outside_snapshot, 0);
}

#[tokio::test]
async fn test_resolve_user_by_username() {
    let source = FakeSource::default();
    seed_user(&source);
    let mut service = service(&source);

    let user = service.resolve_user(" alice ").await.unwrap();

    assert_eq!(user.user_id, UserId::new("11").unwrap());
    assert!(service.database().get_user(&user.user_id).unwrap().is_some());
}

#[tokio::test]
async fn test_trending_players_joined_with_catalog() {
    let source = FakeSource::default();
    source.edit(|s| {
        s.players.insert(
            "4046".to_string(),
            from_json(json!({ "first_name": "Patrick", "last_name": "Mahomes" })),
        );
        s.trending = vec![
            from_json(json!({ "player_id": "4046", "count": 900 })),
            from_json(json!({ "player_id": "9999", "count": 400 })),
            from_json(json!({ "player_id": "DET", "count": 10 })),
        ];
    });
    let mut service = service(&source);
    service.sync_players().await.unwrap();

    let trending = service.trending_players(Trend::Add, 24, 2).await.unwrap();

    assert_eq!(trending.len(), 2);
    assert_eq!(trending[0].count, 900);
    assert_eq!(
        trending[0].player.as_ref().and_then(|p| p.full_name.as_deref()),
        Some("Patrick Mahomes")
    );
    assert!(trending[1].player.is_none());
    assert!(source
        .calls()
        .contains(&"players/nfl/trending/add?lookback_hours=24&limit=2".to_string()));
}
