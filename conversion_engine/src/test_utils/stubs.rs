use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
        Mutex,
    },
    time::Duration,
};

use futures::future::BoxFuture;

use crate::{
    db_types::{DestinationKind, LineItem, Order, PurchaseEvent},
    traits::{
        Destination,
        DestinationError,
        DestinationReceipt,
        KeyValueStore,
        OrderSource,
        OrderSourceError,
        StoreError,
    },
};

/// An order source that serves a fixed list of orders and line items.
#[derive(Debug, Clone, Default)]
pub struct StubOrderSource {
    pub orders: Vec<Order>,
    pub line_items: Vec<LineItem>,
    pub fail_listing: bool,
    pub fail_line_items: bool,
    line_item_calls: Arc<AtomicUsize>,
}

impl StubOrderSource {
    pub fn with_orders(orders: Vec<Order>) -> Self {
        Self { orders, ..Default::default() }
    }

    pub fn with_line_items(mut self, items: Vec<LineItem>) -> Self {
        self.line_items = items;
        self
    }

    pub fn failing() -> Self {
        Self { fail_listing: true, fail_line_items: true, ..Default::default() }
    }

    pub fn line_item_calls(&self) -> usize {
        self.line_item_calls.load(Ordering::SeqCst)
    }
}

impl OrderSource for StubOrderSource {
    async fn list_recent(&self, _lookback_minutes: u64) -> Result<Vec<Order>, OrderSourceError> {
        if self.fail_listing {
            return Err(OrderSourceError::Unreachable("stub order source is down".into()));
        }
        Ok(self.orders.clone())
    }

    async fn fetch_line_items(&self, _order_id: &str) -> Result<Vec<LineItem>, OrderSourceError> {
        self.line_item_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_line_items {
            return Err(OrderSourceError::Unreachable("stub order source is down".into()));
        }
        Ok(self.line_items.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubBehaviour {
    Accept,
    Reject,
    Unconfigured,
}

/// A destination that records every event it is sent.
#[derive(Debug, Clone)]
pub struct RecordingDestination {
    kind: DestinationKind,
    behaviour: StubBehaviour,
    delay: Option<Duration>,
    received: Arc<Mutex<Vec<PurchaseEvent>>>,
}

impl RecordingDestination {
    pub fn new(kind: DestinationKind, behaviour: StubBehaviour) -> Self {
        Self { kind, behaviour, delay: None, received: Arc::new(Mutex::new(Vec::new())) }
    }

    pub fn accepting(kind: DestinationKind) -> Self {
        Self::new(kind, StubBehaviour::Accept)
    }

    pub fn rejecting(kind: DestinationKind) -> Self {
        Self::new(kind, StubBehaviour::Reject)
    }

    /// Wait this long before answering, to let concurrent deliveries overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn received(&self) -> Vec<PurchaseEvent> {
        self.received.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.received().len()
    }
}

impl Destination for RecordingDestination {
    fn kind(&self) -> DestinationKind {
        self.kind
    }

    fn is_configured(&self) -> bool {
        self.behaviour != StubBehaviour::Unconfigured
    }

    fn send<'a>(&'a self, event: &'a PurchaseEvent) -> BoxFuture<'a, Result<DestinationReceipt, DestinationError>> {
        Box::pin(async move {
            if let Ok(mut received) = self.received.lock() {
                received.push(event.clone());
            }
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match self.behaviour {
                StubBehaviour::Accept => {
                    Ok(DestinationReceipt { tracking_id: Some(format!("{}-{}", self.kind, event.event_id)) })
                },
                StubBehaviour::Reject => Err(DestinationError::Rejected("stub destination says no".into())),
                StubBehaviour::Unconfigured => Err(DestinationError::NotConfigured(self.kind.to_string())),
            }
        })
    }
}

/// A store that is never reachable.
#[derive(Debug, Clone, Default)]
pub struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("store is offline".into()))
    }

    async fn put(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("store is offline".into()))
    }

    async fn put_if_absent(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("store is offline".into()))
    }

    async fn delete(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("store is offline".into()))
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        Err(StoreError::Unavailable("store is offline".into()))
    }
}

/// A store that accepts nothing, for exercising hard store failures.
#[derive(Debug, Clone, Default)]
pub struct BrokenStore;

impl KeyValueStore for BrokenStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Backend("disk full".into()))
    }

    async fn put(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), StoreError> {
        Err(StoreError::Backend("disk full".into()))
    }

    async fn put_if_absent(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<bool, StoreError> {
        Err(StoreError::Backend("disk full".into()))
    }

    async fn delete(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Backend("disk full".into()))
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        Err(StoreError::Backend("disk full".into()))
    }
}
