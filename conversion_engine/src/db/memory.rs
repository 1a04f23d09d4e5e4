use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use crate::{
    db::{expiry_from_now, now_millis},
    traits::{KeyValueStore, StoreError},
};

/// An in-process [`KeyValueStore`]. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, (String, i64)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, (String, i64)>>, StoreError> {
        self.entries.lock().map_err(|e| StoreError::Backend(format!("Memory store lock poisoned. {e}")))
    }

    /// Number of entries held, expired or not.
    pub fn len(&self) -> usize {
        self.lock().map(|m| m.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = now_millis();
        let entries = self.lock()?;
        Ok(entries.get(key).filter(|(_, expires_at)| *expires_at > now).map(|(v, _)| v.clone()))
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut entries = self.lock()?;
        entries.insert(key.to_string(), (value.to_string(), expiry_from_now(ttl)));
        Ok(())
    }

    async fn put_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, StoreError> {
        let now = now_millis();
        let mut entries = self.lock()?;
        match entries.get(key) {
            Some((_, expires_at)) if *expires_at > now => Ok(false),
            _ => {
                entries.insert(key.to_string(), (value.to_string(), expiry_from_now(ttl)));
                Ok(true)
            },
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.lock()?;
        entries.remove(key);
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        let now = now_millis();
        let mut entries = self.lock()?;
        let before = entries.len();
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        Ok((before - entries.len()) as u64)
    }
}
