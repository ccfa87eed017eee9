//! Storage layer for synced Sleeper data
//!
//! This module provides a clean abstraction over the SQLite database,
//! organized into logical components:
//! - `models`: Data structures
//! - `schema`: Database connection and schema management
//! - `merge`: Per-entity conflict resolution for upserts
//! - `queries`: Reads and row mapping
//! - `unit`: Transactional writes for one sync unit

pub mod merge;
pub mod models;
pub mod queries;
pub mod schema;
pub mod unit;


// Re-export the main types and database struct for easy access
pub use merge::{EntityCounts, UpsertOutcome};
pub use models::*;
pub use schema::LeagueDatabase;
pub use unit::SyncUnit;
