//! Core utilities shared by the client and the sync service
//!
//! - `retry`: backoff policy and retry loop for transient remote failures

pub mod retry;

pub use retry::{execute_with_retry, RetryPolicy};
