//! Key-value store backends.
//!
//! [`SqliteStore`] is the production backend. [`MemoryStore`] has the same expiry semantics and is used by tests and
//! for running without a database file.
mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::MemoryStore;

use chrono::Utc;

/// Expiry timestamp (unix milliseconds) for an entry written now with the given time-to-live.
pub(crate) fn expiry_from_now(ttl: std::time::Duration) -> i64 {
    let ttl = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    Utc::now().timestamp_millis().saturating_add(ttl)
}

pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
