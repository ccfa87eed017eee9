//! Remote payload → storage model conversion.
//!
//! Everything here is pure: no I/O, no database. Payloads that cannot be
//! stored faithfully are rejected with [`SyncError::MalformedData`] naming the
//! entity and its external id, which aborts the unit before any write.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{json, Value};
use tracing::warn;

use crate::cli::types::{
    ids::{PlayerId, RosterId, UserId},
    time::{Season, Week},
};
use crate::error::{EntityKind, SyncError};
use crate::sleeper::types::{
    RemoteLeague, RemoteLeagueUser, RemoteMatchup, RemotePlayer, RemoteRoster, RemoteTransaction,
    RemoteUser,
};
use crate::storage::models::{
    League, LeagueMember, LeagueTransaction, Matchup, Player, PlayerWeekStat, Roster,
    RosterMember, User, WeeklyRosterEntry,
};
use crate::{LeagueId, Result};

/// Sleeper fills empty lineup slots with this placeholder id.
const EMPTY_SLOT: &str = "0";

fn user_id(entity: EntityKind, owner: &str, raw: &str) -> Result<UserId> {
    UserId::new(raw).map_err(|_| SyncError::malformed(entity, owner, format!("invalid user id {raw:?}")))
}

fn player_ids(raw: Option<&Vec<String>>) -> BTreeSet<PlayerId> {
    raw.into_iter()
        .flatten()
        .filter(|id| !id.is_empty() && id.as_str() != EMPTY_SLOT)
        .map(PlayerId::new)
        .collect()
}

pub fn user(remote: &RemoteUser) -> Result<User> {
    Ok(User {
        user_id: user_id(EntityKind::User, &remote.user_id, &remote.user_id)?,
        username: remote.username.clone(),
        display_name: remote.display_name.clone(),
        avatar: remote.avatar.clone(),
    })
}

pub fn league(remote: &RemoteLeague, default_sport: &str) -> Result<League> {
    let id = &remote.league_id;
    let league_id = LeagueId::new(id.as_str())
        .map_err(|_| SyncError::malformed(EntityKind::League, id, "league id is not numeric"))?;
    let name = remote
        .name
        .clone()
        .ok_or_else(|| SyncError::malformed(EntityKind::League, id, "missing name"))?;
    let season = remote
        .season
        .as_deref()
        .ok_or_else(|| SyncError::malformed(EntityKind::League, id, "missing season"))?
        .parse::<Season>()
        .map_err(|e| SyncError::malformed(EntityKind::League, id, e.to_string()))?;

    Ok(League {
        league_id,
        name,
        season,
        sport: remote.sport.clone().unwrap_or_else(|| default_sport.to_string()),
        status: remote.status.clone(),
        season_type: remote.season_type.clone(),
        total_rosters: remote.total_rosters,
        previous_league_id: remote
            .previous_league_id
            .clone()
            .filter(|prev| !prev.is_empty() && prev != EMPTY_SLOT),
        settings: remote.settings.clone().unwrap_or_else(|| json!({})),
        scoring_settings: remote.scoring_settings.clone().unwrap_or_else(|| json!({})),
        roster_positions: remote.roster_positions.clone().unwrap_or_else(|| json!([])),
    })
}

/// A league user becomes both a [`User`] and that user's seat in the league.
pub fn league_member(league_id: &LeagueId, remote: &RemoteLeagueUser) -> Result<(User, LeagueMember)> {
    let id = user_id(EntityKind::LeagueMember, &remote.user_id, &remote.user_id)?;
    let user = User {
        user_id: id.clone(),
        username: remote.username.clone(),
        display_name: remote.display_name.clone(),
        avatar: remote.avatar.clone(),
    };
    let member = LeagueMember {
        league_id: league_id.clone(),
        user_id: id,
        team_name: remote.metadata.as_ref().and_then(|m| m.team_name.clone()),
        is_owner: remote.is_owner.unwrap_or(false),
    };
    Ok((user, member))
}

pub fn roster(league_id: &LeagueId, remote: &RemoteRoster) -> Result<(Roster, Vec<RosterMember>)> {
    let key = format!("{}/{}", league_id, remote.roster_id);
    if remote.roster_id == 0 {
        return Err(SyncError::malformed(EntityKind::Roster, key, "roster id must be positive"));
    }

    let owner_id = remote
        .owner_id
        .as_deref()
        .filter(|raw| !raw.is_empty() && *raw != EMPTY_SLOT)
        .map(|raw| user_id(EntityKind::Roster, &key, raw))
        .transpose()?;
    let co_owners = remote
        .co_owners
        .iter()
        .flatten()
        .map(|raw| user_id(EntityKind::Roster, &key, raw))
        .collect::<Result<Vec<_>>>()?;

    let settings = remote.settings.clone().unwrap_or_default();
    let points_for =
        settings.fpts.unwrap_or(0) as f64 + settings.fpts_decimal.unwrap_or(0) as f64 / 100.0;

    let roster_id = RosterId::new(remote.roster_id);
    let starters = player_ids(remote.starters.as_ref());
    let reserve = player_ids(remote.reserve.as_ref());
    let mut players = player_ids(remote.players.as_ref());
    players.extend(reserve.iter().cloned());

    let members = players
        .into_iter()
        .map(|player_id| RosterMember {
            league_id: league_id.clone(),
            roster_id,
            is_starter: starters.contains(&player_id),
            is_reserve: reserve.contains(&player_id),
            player_id,
        })
        .collect();

    let roster = Roster {
        league_id: league_id.clone(),
        roster_id,
        owner_id,
        co_owners,
        wins: settings.wins.unwrap_or(0),
        losses: settings.losses.unwrap_or(0),
        ties: settings.ties.unwrap_or(0),
        points_for,
        waiver_position: settings.waiver_position,
        waiver_budget_used: settings.waiver_budget_used.unwrap_or(0),
        total_moves: settings.total_moves.unwrap_or(0),
    };
    Ok((roster, members))
}

/// Catalog entries are keyed by player id; the key wins over the body field.
pub fn player(key: &str, remote: &RemotePlayer) -> Player {
    Player {
        player_id: PlayerId::new(key),
        first_name: remote.first_name.clone(),
        last_name: remote.last_name.clone(),
        full_name: remote.full_name.clone().or_else(|| {
            match (&remote.first_name, &remote.last_name) {
                (Some(first), Some(last)) => Some(format!("{first} {last}")),
                _ => None,
            }
        }),
        position: remote.position.clone(),
        team: remote.team.clone(),
        age: remote.age,
        years_exp: remote.years_exp,
        college: remote.college.clone(),
        active: remote.active,
        status: remote.status.clone(),
        injury_status: remote.injury_status.clone(),
    }
}

fn opponent_of<'a>(
    pairs: &BTreeMap<u32, Vec<&'a RemoteMatchup>>,
    m: &RemoteMatchup,
) -> Option<&'a RemoteMatchup> {
    let sides = pairs.get(&m.matchup_id?)?;
    sides.iter().copied().find(|other| other.roster_id != m.roster_id)
}

/// Everything one week's matchup payload stores.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeekSnapshot {
    pub matchups: Vec<Matchup>,
    pub entries: Vec<WeeklyRosterEntry>,
    pub stats: Vec<PlayerWeekStat>,
    /// Scored players missing from their roster's player list.
    pub skipped_points: u32,
}

/// Turn a week's matchups into matchup rows, the weekly roster snapshot, and
/// per-player stats. A stat is only produced for a player on the snapshot.
pub fn week_snapshot(
    league_id: &LeagueId,
    season: Season,
    week: Week,
    remote: &[RemoteMatchup],
) -> Result<WeekSnapshot> {
    let key = |roster_id: u32| format!("{league_id}/{season}/{week}/{roster_id}");

    let mut seen_rosters = BTreeSet::new();
    let mut pairs: BTreeMap<u32, Vec<&RemoteMatchup>> = BTreeMap::new();
    for m in remote {
        if m.roster_id == 0 {
            return Err(SyncError::malformed(EntityKind::Matchup, key(0), "roster id must be positive"));
        }
        if !seen_rosters.insert(m.roster_id) {
            return Err(SyncError::malformed(
                EntityKind::Matchup,
                key(m.roster_id),
                "roster listed twice",
            ));
        }
        if let Some(matchup_id) = m.matchup_id {
            pairs.entry(matchup_id).or_default().push(m);
        }
    }
    if let Some((matchup_id, sides)) = pairs.iter().find(|(_, sides)| sides.len() > 2) {
        return Err(SyncError::malformed(
            EntityKind::Matchup,
            key(sides[0].roster_id),
            format!("matchup {matchup_id} has {} rosters", sides.len()),
        ));
    }

    let mut snapshot = WeekSnapshot::default();
    let mut placed: BTreeMap<PlayerId, u32> = BTreeMap::new();

    for m in remote {
        let roster_id = RosterId::new(m.roster_id);
        let opponent = opponent_of(&pairs, m);
        let starters: Vec<PlayerId> = m
            .starters
            .iter()
            .flatten()
            .filter(|id| !id.is_empty() && id.as_str() != EMPTY_SLOT)
            .map(PlayerId::new)
            .collect();
        let starter_set: BTreeSet<&PlayerId> = starters.iter().collect();

        let mut on_roster = player_ids(m.players.as_ref());
        // Starters always count as rostered for the week.
        on_roster.extend(starters.iter().cloned());

        for player_id in &on_roster {
            if let Some(other) = placed.insert(player_id.clone(), m.roster_id) {
                return Err(SyncError::malformed(
                    EntityKind::WeeklyRosterEntry,
                    format!("{}/{}", key(m.roster_id), player_id),
                    format!("player also on roster {other}"),
                ));
            }
            snapshot.entries.push(WeeklyRosterEntry {
                league_id: league_id.clone(),
                season,
                week,
                roster_id,
                player_id: player_id.clone(),
                is_starter: starter_set.contains(player_id),
            });
        }

        for (raw_id, points) in m.players_points.iter().flatten() {
            let player_id = PlayerId::new(raw_id.as_str());
            if !on_roster.contains(&player_id) {
                warn!(
                    league_id = %league_id,
                    week = week.as_u16(),
                    roster_id = m.roster_id,
                    player_id = %player_id,
                    "points for a player outside the roster snapshot, skipping"
                );
                snapshot.skipped_points += 1;
                continue;
            }
            snapshot.stats.push(PlayerWeekStat {
                league_id: league_id.clone(),
                season,
                week,
                is_starter: starter_set.contains(&player_id),
                player_id,
                roster_id,
                points: *points,
            });
        }

        snapshot.matchups.push(Matchup {
            league_id: league_id.clone(),
            season,
            week,
            roster_id,
            matchup_id: m.matchup_id,
            opponent_roster_id: opponent.map(|o| RosterId::new(o.roster_id)),
            points: m.points.unwrap_or(0.0),
            points_against: opponent.map(|o| o.points.unwrap_or(0.0)),
            custom_points: m.custom_points,
            starters,
        });
    }

    Ok(snapshot)
}

pub fn transaction(league_id: &LeagueId, remote: &RemoteTransaction) -> Result<LeagueTransaction> {
    if remote.transaction_id.is_empty() {
        return Err(SyncError::malformed(
            EntityKind::Transaction,
            league_id.as_str(),
            "missing transaction id",
        ));
    }
    if remote.kind.is_empty() {
        return Err(SyncError::malformed(
            EntityKind::Transaction,
            &remote.transaction_id,
            "missing transaction type",
        ));
    }

    Ok(LeagueTransaction {
        transaction_id: remote.transaction_id.clone(),
        league_id: league_id.clone(),
        kind: remote.kind.clone(),
        status: remote.status.clone(),
        creator: remote.creator.clone(),
        created_ms: remote.created,
        status_updated_ms: remote.status_updated,
        week: remote.leg.filter(|leg| *leg > 0).map(Week::new),
        roster_ids: remote.roster_ids.clone().unwrap_or_default(),
        adds: remote.adds.clone().unwrap_or_default(),
        drops: remote.drops.clone().unwrap_or_default(),
        waiver_bid: remote.settings.as_ref().and_then(|s| s.waiver_bid),
        draft_picks: remote.draft_picks.clone().unwrap_or(Value::Array(Vec::new())),
    })
}
