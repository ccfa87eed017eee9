//! HTTP client for the Sleeper v1 API.
//!
//! Every request goes through a client-side rate limiter (requests per minute,
//! evenly spaced) and the retry loop in [`crate::core::retry`]. Bodies are read
//! as bytes and decoded afterwards so that a malformed payload is reported with
//! the endpoint it came from.

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{header::RETRY_AFTER, Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{debug, warn};

use super::types::{
    NflState, RemoteLeague, RemoteLeagueUser, RemoteMatchup, RemotePlayer, RemoteRoster,
    RemoteTransaction, RemoteTrendingPlayer, RemoteUser, Trend,
};
use super::RemoteSource;
use crate::{
    cli::types::{ids::UserId, time::Season},
    config::{SyncConfig, API_BASE_URL_ENV_VAR},
    core::retry::{execute_with_retry, RetryPolicy},
    error::SyncError,
    LeagueId, Result, Week,
};

#[cfg(test)]
mod tests;

const USER_AGENT: &str = concat!("sleeper-sync/", env!("CARGO_PKG_VERSION"));

pub struct SleeperClient {
    http: Client,
    base_url: Url,
    sport: String,
    retry: RetryPolicy,
    limiter: DefaultDirectRateLimiter,
}

impl SleeperClient {
    pub fn new(config: &SyncConfig) -> Result<Self> {
        let raw = config.api_base_url.trim_end_matches('/');
        let base_url = Url::parse(raw)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| SyncError::InvalidConfig {
                key: API_BASE_URL_ENV_VAR.to_string(),
                value: config.api_base_url.clone(),
            })?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url,
            sport: config.sport.clone(),
            retry: config.retry.clone(),
            limiter: RateLimiter::direct(
                Quota::per_minute(config.requests_per_minute).allow_burst(NonZeroU32::MIN),
            ),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Base URL plus `segments`, each percent-encoded as one path segment.
    fn url_for(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SyncError::InvalidConfig {
                key: API_BASE_URL_ENV_VAR.to_string(),
                value: self.base_url.to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// GET the endpoint made of `segments` and decode the body as `T`.
    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        self.get_json_with_query(segments, &[]).await
    }

    async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T> {
        let endpoint = segments.join("/");
        let endpoint = endpoint.as_str();
        let url = self.url_for(segments, query)?;

        match execute_with_retry(&self.retry, || self.fetch_once(&url, endpoint)).await {
            Ok(body) => serde_json::from_slice(&body).map_err(|source| {
                SyncError::MalformedResponse {
                    endpoint: endpoint.to_string(),
                    source,
                }
            }),
            Err((err, attempts)) if err.is_rate_limited() => {
                warn!(endpoint, attempts, "giving up: rate limited");
                Err(SyncError::RateLimitExceeded {
                    endpoint: endpoint.to_string(),
                    attempts,
                })
            }
            Err((err, attempts)) => {
                warn!(endpoint, attempts, error = %err, "request failed");
                Err(err)
            }
        }
    }

    async fn fetch_once(&self, url: &Url, endpoint: &str) -> Result<Vec<u8>> {
        self.limiter.until_ready().await;
        debug!(endpoint, "GET");

        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            let retry_after = if status == StatusCode::TOO_MANY_REQUESTS {
                response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .map(Duration::from_secs)
            } else {
                None
            };
            return Err(SyncError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                retry_after,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// List endpoints answer `null` for unknown parents; treat that as empty.
    async fn get_list<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<Vec<T>> {
        Ok(self
            .get_json::<Option<Vec<T>>>(segments)
            .await?
            .unwrap_or_default())
    }
}

#[async_trait]
impl RemoteSource for SleeperClient {
    async fn get_user(&self, username_or_id: &str) -> Result<Option<RemoteUser>> {
        self.get_json(&["user", username_or_id]).await
    }

    async fn get_user_leagues(&self, user_id: &UserId, season: Season) -> Result<Vec<RemoteLeague>> {
        let season = season.to_string();
        self.get_list(&[
            "user",
            user_id.as_str(),
            "leagues",
            self.sport.as_str(),
            season.as_str(),
        ])
        .await
    }

    async fn get_league(&self, league_id: &LeagueId) -> Result<Option<RemoteLeague>> {
        self.get_json(&["league", league_id.as_str()]).await
    }

    async fn get_league_users(&self, league_id: &LeagueId) -> Result<Vec<RemoteLeagueUser>> {
        self.get_list(&["league", league_id.as_str(), "users"]).await
    }

    async fn get_league_rosters(&self, league_id: &LeagueId) -> Result<Vec<RemoteRoster>> {
        self.get_list(&["league", league_id.as_str(), "rosters"]).await
    }

    async fn get_matchups(&self, league_id: &LeagueId, week: Week) -> Result<Vec<RemoteMatchup>> {
        let week = week.to_string();
        self.get_list(&["league", league_id.as_str(), "matchups", week.as_str()])
            .await
    }

    async fn get_transactions(
        &self,
        league_id: &LeagueId,
        week: Week,
    ) -> Result<Vec<RemoteTransaction>> {
        let week = week.to_string();
        self.get_list(&["league", league_id.as_str(), "transactions", week.as_str()])
            .await
    }

    async fn get_players(&self) -> Result<BTreeMap<String, RemotePlayer>> {
        Ok(self
            .get_json::<Option<BTreeMap<String, RemotePlayer>>>(&["players", self.sport.as_str()])
            .await?
            .unwrap_or_default())
    }

    async fn get_trending_players(
        &self,
        trend: Trend,
        lookback_hours: u32,
        limit: u32,
    ) -> Result<Vec<RemoteTrendingPlayer>> {
        let query = [
            ("lookback_hours", lookback_hours.to_string()),
            ("limit", limit.to_string()),
        ];
        Ok(self
            .get_json_with_query::<Option<Vec<RemoteTrendingPlayer>>>(
                &["players", self.sport.as_str(), "trending", trend.as_str()],
                &query,
            )
            .await?
            .unwrap_or_default())
    }

    async fn get_nfl_state(&self) -> Result<NflState> {
        self.get_json::<Option<NflState>>(&["state", self.sport.as_str()])
            .await?
            .ok_or(SyncError::NotFound {
                entity: crate::error::EntityKind::NflState,
                id: self.sport.clone(),
            })
    }
}
