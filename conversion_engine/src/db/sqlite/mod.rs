//! # SQLite key-value store
//!
//! The low-level queries in [`kv_entries`] are plain functions that accept a `&mut SqliteConnection`, so callers can
//! run them on a pooled connection or inside a transaction. [`SqliteStore`] wraps a pool and implements
//! [`crate::traits::KeyValueStore`] on top of them.
use std::{env, str::FromStr};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Error as SqlxError,
    SqlitePool,
};

pub mod kv_entries;
mod sqlite_impl;

pub use sqlite_impl::SqliteStore;

const SQLITE_DB_URL: &str = "sqlite://data/bridge_store.db";

pub fn db_url() -> String {
    let result = env::var("BRIDGE_DATABASE_URL").unwrap_or_else(|_| {
        info!("🗝️ BRIDGE_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("🗝️ Using database URL: {result}");
    result
}

/// Opens a pool, creating the database file if it doesn't exist yet.
pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}
