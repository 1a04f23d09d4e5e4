use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store could not be reached at all (pool closed or timed out, I/O failure).
    #[error("The key-value store is unavailable: {0}")]
    Unavailable(String),
    #[error("Key-value store error: {0}")]
    Backend(String),
    #[error("Could not (de)serialize a stored value: {0}")]
    Serialization(String),
}

impl StoreError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(e.to_string())
            },
            _ => StoreError::Backend(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// A string key-value store where every entry expires. Expired entries are invisible to every read, whether or not
/// they have been purged yet.
#[allow(async_fn_in_trait)]
pub trait KeyValueStore: Clone {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key`, replacing whatever was there.
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Write `value` only if there is no live entry under `key`. Returns `true` if this call wrote the value. The
    /// check and the write are a single atomic step.
    async fn put_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, StoreError>;

    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Physically remove expired entries. Returns the number of entries removed.
    async fn purge_expired(&self) -> Result<u64, StoreError>;
}
