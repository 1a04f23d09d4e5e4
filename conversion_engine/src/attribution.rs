//! # Attribution stage
//!
//! The thank-you page beacon usually lands before the order does. Whatever it captured (click ids, analytics client
//! ids, the browser's IP and user agent) is parked here under the order number until a delivery picks it up.
use std::time::Duration;

use bridge_common::ShopId;
use log::*;

use crate::{
    db_types::{AttributionRecord, OrderNumber},
    traits::{KeyValueStore, StoreError},
};

/// Result of parking an attribution record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageWrite {
    Stored,
    /// The store could not be reached. The record is lost, but delivery still works without it.
    Unavailable,
}

impl StageWrite {
    pub fn is_stored(&self) -> bool {
        matches!(self, StageWrite::Stored)
    }
}

#[derive(Debug, Clone)]
pub struct AttributionStage<S> {
    shop: ShopId,
    store: S,
    ttl: Duration,
}

impl<S> AttributionStage<S>
where S: KeyValueStore
{
    pub fn new(shop: ShopId, store: S, ttl: Duration) -> Self {
        Self { shop, store, ttl }
    }

    pub fn key(&self, order_number: &OrderNumber) -> String {
        format!("pixel_data_{}_{}", self.shop, order_number)
    }

    /// Stores the record, replacing any earlier one for the same order. Store outages degrade to
    /// [`StageWrite::Unavailable`]; any other failure is returned.
    pub async fn put(&self, order_number: &OrderNumber, record: &AttributionRecord) -> Result<StageWrite, StoreError> {
        let value = serde_json::to_string(record)?;
        match self.store.put(&self.key(order_number), &value, self.ttl).await {
            Ok(()) => {
                debug!(
                    "🧭️ Stored attribution for order {order_number} of shop {} (click ids: {})",
                    self.shop,
                    record.has_click_ids()
                );
                Ok(StageWrite::Stored)
            },
            Err(e) if e.is_unavailable() => {
                warn!("🧭️ Could not store attribution for order {order_number} of shop {}. {e}", self.shop);
                Ok(StageWrite::Unavailable)
            },
            Err(e) => Err(e),
        }
    }

    /// Fetches the record for the order. Misses, unreadable records and store failures all come back as `None`.
    pub async fn get(&self, order_number: &OrderNumber) -> Option<AttributionRecord> {
        let value = match self.store.get(&self.key(order_number)).await {
            Ok(Some(value)) => value,
            Ok(None) => {
                trace!("🧭️ No stored attribution for order {order_number} of shop {}", self.shop);
                return None;
            },
            Err(e) => {
                warn!("🧭️ Could not read attribution for order {order_number} of shop {}. {e}", self.shop);
                return None;
            },
        };
        match serde_json::from_str::<AttributionRecord>(&value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("🧭️ Ignoring unreadable attribution for order {order_number} of shop {}. {e}", self.shop);
                None
            },
        }
    }
}
