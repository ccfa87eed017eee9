//! Type-safe wrappers for Sleeper identifiers, seasons and weeks.

pub mod ids;
pub mod time;
