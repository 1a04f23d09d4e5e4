use std::time::Duration;

use conversion_engine::{
    db_types::{DeliverySource, OrderNumber},
    test_utils::prepare_env::memory_sqlite_store,
    traits::KeyValueStore,
    DedupLedger,
    LedgerConfig,
};

#[tokio::test]
async fn put_get_delete() {
    let store = memory_sqlite_store().await.expect("store");
    assert!(store.get("missing").await.unwrap().is_none());
    store.put("k", "v1", Duration::from_secs(60)).await.unwrap();
    store.put("k", "v2", Duration::from_secs(60)).await.unwrap();
    assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));
    store.delete("k").await.unwrap();
    assert!(store.get("k").await.unwrap().is_none());
}

#[tokio::test]
async fn conditional_put_respects_live_entries() {
    let store = memory_sqlite_store().await.expect("store");
    assert!(store.put_if_absent("order_a_1", "first", Duration::from_secs(60)).await.unwrap());
    assert!(!store.put_if_absent("order_a_1", "second", Duration::from_secs(60)).await.unwrap());
    assert_eq!(store.get("order_a_1").await.unwrap().as_deref(), Some("first"));
}

#[tokio::test]
async fn expired_entries_can_be_claimed_and_purged() {
    let store = memory_sqlite_store().await.expect("store");
    store.put("short", "x", Duration::from_millis(10)).await.unwrap();
    store.put("long", "y", Duration::from_secs(60)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(store.get("short").await.unwrap().is_none());
    assert!(store.put_if_absent("short", "z", Duration::from_millis(10)).await.unwrap());
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(store.purge_expired().await.unwrap(), 1);
    assert_eq!(store.get("long").await.unwrap().as_deref(), Some("y"));
}

#[tokio::test]
async fn ledger_on_sqlite() {
    let store = memory_sqlite_store().await.expect("store");
    let ledger = DedupLedger::new("shop".parse().unwrap(), store.clone(), &LedgerConfig::default());
    let number = OrderNumber::from("1001");
    assert!(ledger.reserve(&number, DeliverySource::Webhook).await.unwrap());
    assert!(!ledger.reserve(&number, DeliverySource::Poll).await.unwrap());
    ledger.release(&number).await.unwrap();
    assert!(!ledger.has(&number).await.unwrap());
}

#[tokio::test]
async fn closed_pool_is_unavailable() {
    let store = memory_sqlite_store().await.expect("store");
    store.close().await;
    let err = store.get("k").await.expect_err("pool is closed");
    assert!(err.is_unavailable());
}
