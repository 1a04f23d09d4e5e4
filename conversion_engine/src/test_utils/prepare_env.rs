use log::*;

use crate::{db::sqlite::SqliteStore, traits::StoreError};

/// Loads `.env.test` and starts the logger. Safe to call from every test.
pub fn prepare_test_env() {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
}

/// A migrated, in-memory SQLite store. A single connection keeps every query on the same database.
pub async fn memory_sqlite_store() -> Result<SqliteStore, StoreError> {
    prepare_test_env();
    let store = SqliteStore::new_with_url("sqlite::memory:", 1).await?;
    store.migrate().await?;
    info!("🚀️ In-memory store ready");
    Ok(store)
}
