use std::{fmt::Debug, time::Duration};

use log::*;
use sqlx::{migrate, SqlitePool};

use super::{db_url, kv_entries, new_pool};
use crate::{
    db::{expiry_from_now, now_millis},
    traits::{KeyValueStore, StoreError},
};

#[derive(Clone)]
pub struct SqliteStore {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteStore ({})", self.url)
    }
}

impl SqliteStore {
    /// Creates a new store using the URL in `BRIDGE_DATABASE_URL`, or the default location.
    pub async fn new(max_connections: u32) -> Result<Self, StoreError> {
        let url = db_url();
        SqliteStore::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        trace!("🗝️ Creating new key-value store connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Applies the embedded schema migrations. Safe to call on every start-up.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        migrate!("./src/db/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("Migrations failed. {e}")))?;
        debug!("🗝️ Key-value store migrations complete");
        Ok(())
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let value = kv_entries::fetch_live_value(key, now_millis(), &mut conn).await?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        kv_entries::upsert(key, value, expiry_from_now(ttl), &mut conn).await?;
        Ok(())
    }

    async fn put_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let written = kv_entries::insert_if_absent(key, value, expiry_from_now(ttl), now_millis(), &mut conn).await?;
        Ok(written)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        kv_entries::delete(key, &mut conn).await?;
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let count = kv_entries::delete_expired(now_millis(), &mut conn).await?;
        Ok(count)
    }
}
