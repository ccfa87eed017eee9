//! Conflict resolution for upsert-by-natural-key.
//!
//! Each entity decides how a stored record absorbs an incoming one through
//! [`Reconcile`]. The store then compares the merged value with what it has and
//! only writes when something actually changed, which keeps re-runs over
//! identical remote data free of writes (and of `updated_at` churn).

use serde::Serialize;
use std::fmt;

use super::models::{
    League, LeagueMember, LeagueTransaction, Matchup, Player, PlayerWeekStat, Roster,
    RosterMember, User, WeeklyRosterEntry,
};

/// What an upsert did to the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    Unchanged,
}

/// Per-record merge strategy.
pub trait Reconcile: Clone + PartialEq {
    /// Merge `incoming` into the record already stored under the same natural key.
    fn reconcile(existing: &Self, incoming: Self) -> Self;
}

/// Decision for one incoming record.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeDecision<T> {
    Insert(T),
    Update(T),
    Keep,
}

impl<T> MergeDecision<T> {
    pub fn outcome(&self) -> UpsertOutcome {
        match self {
            MergeDecision::Insert(_) => UpsertOutcome::Inserted,
            MergeDecision::Update(_) => UpsertOutcome::Updated,
            MergeDecision::Keep => UpsertOutcome::Unchanged,
        }
    }
}

pub fn decide<T: Reconcile>(existing: Option<&T>, incoming: T) -> MergeDecision<T> {
    match existing {
        None => MergeDecision::Insert(incoming),
        Some(current) => {
            let merged = T::reconcile(current, incoming);
            if &merged == current {
                MergeDecision::Keep
            } else {
                MergeDecision::Update(merged)
            }
        }
    }
}

// Remote snapshot is authoritative for every field.
macro_rules! remote_wins {
    ($($entity:ty),* $(,)?) => {
        $(
            impl Reconcile for $entity {
                fn reconcile(_existing: &Self, incoming: Self) -> Self {
                    incoming
                }
            }
        )*
    };
}

remote_wins!(
    League,
    LeagueMember,
    Player,
    Roster,
    RosterMember,
    Matchup,
    WeeklyRosterEntry,
    PlayerWeekStat,
);

impl Reconcile for User {
    /// League member listings often omit the username that `user/{name}`
    /// returns, so absent profile fields never erase known ones.
    fn reconcile(existing: &Self, incoming: Self) -> Self {
        Self {
            user_id: existing.user_id.clone(),
            username: incoming.username.or_else(|| existing.username.clone()),
            display_name: incoming
                .display_name
                .or_else(|| existing.display_name.clone()),
            avatar: incoming.avatar.or_else(|| existing.avatar.clone()),
        }
    }
}

impl Reconcile for LeagueTransaction {
    /// Origin fields are fixed once recorded; status and roster effects follow
    /// the remote (a `processing` waiver can become `complete` or `failed`).
    fn reconcile(existing: &Self, incoming: Self) -> Self {
        Self {
            transaction_id: existing.transaction_id.clone(),
            league_id: existing.league_id.clone(),
            kind: existing.kind.clone(),
            creator: existing.creator.clone().or(incoming.creator),
            created_ms: existing.created_ms.or(incoming.created_ms),
            week: existing.week.or(incoming.week),
            status: incoming.status,
            status_updated_ms: incoming.status_updated_ms,
            roster_ids: incoming.roster_ids,
            adds: incoming.adds,
            drops: incoming.drops,
            waiver_bid: incoming.waiver_bid,
            draft_picks: incoming.draft_picks,
        }
    }
}

/// Tally of upsert outcomes for one entity type within a sync unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EntityCounts {
    pub inserted: u32,
    pub updated: u32,
    pub unchanged: u32,
    /// Snapshot rows removed because the remote no longer lists them.
    pub removed: u32,
}

impl EntityCounts {
    pub fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Updated => self.updated += 1,
            UpsertOutcome::Unchanged => self.unchanged += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.inserted + self.updated + self.unchanged
    }

    /// True when the unit wrote nothing for this entity.
    pub fn is_noop(&self) -> bool {
        self.inserted == 0 && self.updated == 0 && self.removed == 0
    }
}

impl fmt::Display for EntityCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} new, {} updated, {} unchanged",
            self.inserted, self.updated, self.unchanged
        )?;
        if self.removed > 0 {
            write!(f, ", {} removed", self.removed)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::types::ids::UserId;
    use crate::LeagueId;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn user(username: Option<&str>, display: Option<&str>) -> User {
        User {
            user_id: UserId::new("600000000000000001").unwrap(),
            username: username.map(str::to_string),
            display_name: display.map(str::to_string),
            avatar: None,
        }
    }

    fn transaction(status: &str, created: Option<i64>) -> LeagueTransaction {
        LeagueTransaction {
            transaction_id: "1100000000000000001".to_string(),
            league_id: LeagueId::new("1260107285024219136").unwrap(),
            kind: "waiver".to_string(),
            status: Some(status.to_string()),
            creator: Some("600000000000000001".to_string()),
            created_ms: created,
            status_updated_ms: None,
            week: None,
            roster_ids: vec![4],
            adds: BTreeMap::from([("9999".to_string(), 4)]),
            drops: BTreeMap::new(),
            waiver_bid: Some(12),
            draft_picks: json!([]),
        }
    }

    #[test]
    fn test_decide_insert_when_missing() {
        let decision = decide(None, user(Some("alice"), None));
        assert_eq!(decision.outcome(), UpsertOutcome::Inserted);
    }

    #[test]
    fn test_decide_keep_when_identical() {
        let stored = user(Some("alice"), Some("Alice"));
        let decision = decide(Some(&stored), stored.clone());
        assert_eq!(decision, MergeDecision::Keep);
    }

    #[test]
    fn test_user_merge_keeps_known_username() {
        let stored = user(Some("alice"), Some("Alice"));
        let decision = decide(Some(&stored), user(None, Some("Alice")));
        assert_eq!(decision, MergeDecision::Keep);
    }

    #[test]
    fn test_user_merge_updates_display_name() {
        let stored = user(Some("alice"), Some("Alice"));
        match decide(Some(&stored), user(None, Some("Alice B."))) {
            MergeDecision::Update(merged) => {
                assert_eq!(merged.username.as_deref(), Some("alice"));
                assert_eq!(merged.display_name.as_deref(), Some("Alice B."));
            }
            other => panic!("Expected update, got {:?}", other),
        }
    }

    #[test]
    fn test_transaction_status_change_is_update() {
        let stored = transaction("processing", Some(1_000));
        match decide(Some(&stored), transaction("complete", Some(2_000))) {
            MergeDecision::Update(merged) => {
                assert_eq!(merged.status.as_deref(), Some("complete"));
                assert_eq!(merged.created_ms, Some(1_000));
            }
            other => panic!("Expected update, got {:?}", other),
        }
    }

    #[test]
    fn test_entity_counts_tally() {
        let mut counts = EntityCounts::default();
        counts.record(UpsertOutcome::Inserted);
        counts.record(UpsertOutcome::Unchanged);
        counts.record(UpsertOutcome::Unchanged);
        assert_eq!(counts.total(), 3);
        assert!(!counts.is_noop());

        assert_eq!(counts.to_string(), "1 new, 0 updated, 2 unchanged");
        counts.removed = 3;
        assert_eq!(counts.to_string(), "1 new, 0 updated, 2 unchanged, 3 removed");

        let quiet = EntityCounts {
            unchanged: 5,
            ..Default::default()
        };
        assert!(quiet.is_noop());
    }
}
