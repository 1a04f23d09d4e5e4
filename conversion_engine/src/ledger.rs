//! # Dedup ledger
//!
//! Remembers which orders have been delivered so that the webhook and the poller don't both report the same purchase.
//! The ledger is a best-effort hint: markers expire, and a crash between sending and recording leaves no marker.
//! Deterministic event ids let the destinations catch what slips through.
use std::time::Duration;

use bridge_common::ShopId;
use chrono::Utc;
use log::*;

use crate::{
    db_types::{DedupMarker, DeliverySource, DestinationKind, MarkerStatus, OrderNumber},
    traits::{KeyValueStore, StoreError},
};

pub const DEFAULT_DEDUP_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_RESERVATION_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_ATTRIBUTION_TTL: Duration = Duration::from_secs(60 * 60);

/// Lifetimes of everything the engine writes to the key-value store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerConfig {
    /// How long a delivered order is remembered. Must be longer than the poll lookback window.
    pub dedup_ttl: Duration,
    /// How long an in-flight delivery holds an order.
    pub reservation_ttl: Duration,
    pub attribution_ttl: Duration,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            dedup_ttl: DEFAULT_DEDUP_TTL,
            reservation_ttl: DEFAULT_RESERVATION_TTL,
            attribution_ttl: DEFAULT_ATTRIBUTION_TTL,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DedupLedger<S> {
    shop: ShopId,
    store: S,
    dedup_ttl: Duration,
    reservation_ttl: Duration,
}

impl<S> DedupLedger<S>
where S: KeyValueStore
{
    pub fn new(shop: ShopId, store: S, config: &LedgerConfig) -> Self {
        Self { shop, store, dedup_ttl: config.dedup_ttl, reservation_ttl: config.reservation_ttl }
    }

    pub fn key(&self, order_number: &OrderNumber) -> String {
        format!("order_{}_{}", self.shop, order_number)
    }

    /// `true` if a live marker (delivered or reserved) exists for the order.
    pub async fn has(&self, order_number: &OrderNumber) -> Result<bool, StoreError> {
        let found = self.store.get(&self.key(order_number)).await?.is_some();
        Ok(found)
    }

    /// Fetches the marker for the order, if there is a live one. Unreadable markers are reported as an error.
    pub async fn fetch(&self, order_number: &OrderNumber) -> Result<Option<DedupMarker>, StoreError> {
        match self.store.get(&self.key(order_number)).await? {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }

    /// Claims the order for one delivery attempt. Returns `false` when another attempt already holds it, or it has
    /// been delivered.
    pub async fn reserve(&self, order_number: &OrderNumber, source: DeliverySource) -> Result<bool, StoreError> {
        let marker = DedupMarker { recorded_at: Utc::now(), source, status: MarkerStatus::Reserved };
        let value = serde_json::to_string(&marker)?;
        let won = self.store.put_if_absent(&self.key(order_number), &value, self.reservation_ttl).await?;
        if won {
            trace!("🗝️ Reserved order {order_number} for shop {} ({source})", self.shop);
        } else {
            debug!("🗝️ Order {order_number} for shop {} is already held by another delivery", self.shop);
        }
        Ok(won)
    }

    /// Records a delivery that reached at least one destination.
    pub async fn record(
        &self,
        order_number: &OrderNumber,
        succeeded: Vec<DestinationKind>,
        failed: Vec<DestinationKind>,
        source: DeliverySource,
    ) -> Result<(), StoreError> {
        let marker =
            DedupMarker { recorded_at: Utc::now(), source, status: MarkerStatus::Delivered { succeeded, failed } };
        let value = serde_json::to_string(&marker)?;
        self.store.put(&self.key(order_number), &value, self.dedup_ttl).await?;
        debug!("🗝️ Recorded delivery of order {order_number} for shop {}", self.shop);
        Ok(())
    }

    /// Drops the marker so that the next trigger retries the order.
    pub async fn release(&self, order_number: &OrderNumber) -> Result<(), StoreError> {
        self.store.delete(&self.key(order_number)).await?;
        trace!("🗝️ Released order {order_number} for shop {}", self.shop);
        Ok(())
    }
}
