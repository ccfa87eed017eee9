//! Unit tests for the Sleeper HTTP client against a mock server

use super::*;
use crate::config::DatabaseLocation;
use serde_json::json;
use std::time::Instant;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn test_client(server: &MockServer, max_retries: u32) -> SleeperClient {
    let config = SyncConfig::new(DatabaseLocation::Memory)
        .with_base_url(format!("{}/v1", server.uri()))
        .with_rate_limit(NonZeroU32::new(600_000).unwrap())
        .with_retry(RetryPolicy::new(max_retries, 1, 5, 2.0, 0.0));
    SleeperClient::new(&config).unwrap()
}

fn league_id() -> LeagueId {
    LeagueId::new("1260107285024219136").unwrap()
}

#[tokio::test]
async fn test_get_league_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/league/1260107285024219136"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "league_id": "1260107285024219136",
            "name": "Test League",
            "season": "2025",
            "total_rosters": 10
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server, 0);
    let league = client.get_league(&league_id()).await.unwrap().unwrap();

    assert_eq!(league.name.as_deref(), Some("Test League"));
    assert_eq!(league.total_rosters, Some(10));
}

#[tokio::test]
async fn test_get_league_null_body_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/league/1260107285024219136"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let client = test_client(&server, 0);
    assert!(client.get_league(&league_id()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_endpoint_null_body_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/league/1260107285024219136/rosters"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let client = test_client(&server, 0);
    let rosters = client.get_league_rosters(&league_id()).await.unwrap();
    assert!(rosters.is_empty());
}

#[tokio::test]
async fn test_server_error_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/state/nfl"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/state/nfl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "season": "2025",
            "week": 6,
            "season_type": "regular"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server, 3);
    let state = client.get_nfl_state().await.unwrap();

    assert_eq!(state.season, "2025");
    assert_eq!(state.week, 6);
}

#[tokio::test]
async fn test_server_error_exhausts_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/league/1260107285024219136"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server, 2);
    let err = client.get_league(&league_id()).await.unwrap_err();

    match err {
        SyncError::Status { status, endpoint, .. } => {
            assert_eq!(status, 500);
            assert_eq!(endpoint, "league/1260107285024219136");
        }
        other => panic!("Expected Status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rate_limited_reports_rate_limit_exceeded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/league/1260107285024219136/users"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server, 1);
    let err = client.get_league_users(&league_id()).await.unwrap_err();

    match err {
        SyncError::RateLimitExceeded { attempts, .. } => assert_eq!(attempts, 2),
        other => panic!("Expected RateLimitExceeded, got {:?}", other),
    }
}

#[tokio::test]
async fn test_large_retry_after_capped_by_policy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/state/nfl"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "86400"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/state/nfl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "season": "2025", "week": 2 })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server, 1);
    let started = Instant::now();
    let state = client.get_nfl_state().await.unwrap();

    assert_eq!(state.week, 2);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_retry_after_waits_at_least_the_hint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/state/nfl"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "1"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/state/nfl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "season": "2025", "week": 2 })))
        .mount(&server)
        .await;

    let config = SyncConfig::new(DatabaseLocation::Memory)
        .with_base_url(format!("{}/v1", server.uri()))
        .with_rate_limit(NonZeroU32::new(600_000).unwrap())
        .with_retry(RetryPolicy::new(1, 1, 10_000, 2.0, 0.0));
    let client = SleeperClient::new(&config).unwrap();
    let started = Instant::now();
    client.get_nfl_state().await.unwrap();

    assert!(started.elapsed() >= Duration::from_secs(1));
}

#[tokio::test]
async fn test_username_is_one_escaped_path_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/user/a%2Fb%3Fc%23d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_id": "600000000000000001",
            "username": "a/b?c#d"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server, 0);
    let user = client.get_user("a/b?c#d").await.unwrap().unwrap();

    assert_eq!(user.user_id, "600000000000000001");
}

#[tokio::test]
async fn test_trending_players_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/players/nfl/trending/drop"))
        .and(query_param("lookback_hours", "48"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "player_id": "4046", "count": 1520 },
            { "player_id": "DET", "count": 310 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server, 0);
    let trending = client
        .get_trending_players(Trend::Drop, 48, 2)
        .await
        .unwrap();

    assert_eq!(trending.len(), 2);
    assert_eq!(trending[0].player_id, "4046");
    assert_eq!(trending[0].count, 1520);
}

#[test]
fn test_invalid_base_url_is_config_error() {
    let config = SyncConfig::new(DatabaseLocation::Memory).with_base_url("not a url");
    assert!(matches!(
        SleeperClient::new(&config),
        Err(SyncError::InvalidConfig { .. })
    ));
}

#[tokio::test]
async fn test_not_found_status_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/user/nobody"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server, 3);
    let err = client.get_user("nobody").await.unwrap_err();
    assert!(matches!(err, SyncError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_malformed_body_reports_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/league/1260107285024219136/matchups/3"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[{\"matchup_id\": 1}]"))
        .mount(&server)
        .await;

    let client = test_client(&server, 0);
    let err = client
        .get_matchups(&league_id(), Week::new(3))
        .await
        .unwrap_err();

    match err {
        SyncError::MalformedResponse { endpoint, .. } => {
            assert_eq!(endpoint, "league/1260107285024219136/matchups/3");
        }
        other => panic!("Expected MalformedResponse, got {:?}", other),
    }
}

#[tokio::test]
async fn test_user_leagues_path_uses_sport_and_season() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/user/600000000000000001/leagues/nfl/2024"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "league_id": "1", "name": "A", "season": "2024" },
            { "league_id": "2", "name": "B", "season": "2024" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server, 0);
    let user_id = UserId::new("600000000000000001").unwrap();
    let leagues = client
        .get_user_leagues(&user_id, Season::new(2024))
        .await
        .unwrap();

    assert_eq!(leagues.len(), 2);
    assert_eq!(leagues[1].league_id, "2");
}

#[test]
fn test_base_url_trailing_slash_trimmed() {
    let config = SyncConfig::new(DatabaseLocation::Memory).with_base_url("http://example.test/v1/");
    let client = SleeperClient::new(&config).unwrap();
    assert_eq!(client.base_url(), "http://example.test/v1");
}
