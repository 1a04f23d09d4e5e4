use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use capi_bridge_server::{config::ShopConfig, errors::ServerError, integrations::Integrations};
use conversion_engine::{
    db_types::{DestinationKind, Order, PurchaseEvent},
    test_utils::{
        fixtures::line_item,
        stubs::{RecordingDestination, StubBehaviour, StubOrderSource},
    },
    traits::Destination,
};

/// Stands in for Lightspeed, Meta and GA4. Clones share the recorded events and the listed orders, so a scenario can
/// inspect what the running server sent.
#[derive(Debug, Clone)]
pub struct E2eIntegrations {
    meta: Arc<RecordingDestination>,
    ga4: Arc<RecordingDestination>,
    listed_orders: Arc<Mutex<Vec<Order>>>,
}

impl Default for E2eIntegrations {
    fn default() -> Self {
        Self {
            meta: Arc::new(RecordingDestination::accepting(DestinationKind::MetaCapi)),
            ga4: Arc::new(RecordingDestination::accepting(DestinationKind::Ga4)),
            listed_orders: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl E2eIntegrations {
    /// Replaces a destination. Only takes effect for servers started afterwards.
    pub fn set_behaviour(&mut self, kind: DestinationKind, behaviour: StubBehaviour) {
        let destination = Arc::new(RecordingDestination::new(kind, behaviour));
        match kind {
            DestinationKind::MetaCapi => self.meta = destination,
            DestinationKind::Ga4 => self.ga4 = destination,
        }
    }

    /// Both destinations accept, after `delay`.
    pub fn slow_down(&mut self, delay: Duration) {
        self.meta = Arc::new(RecordingDestination::accepting(DestinationKind::MetaCapi).with_delay(delay));
        self.ga4 = Arc::new(RecordingDestination::accepting(DestinationKind::Ga4).with_delay(delay));
    }

    /// Adds an order to what the order listing returns.
    pub fn list_order(&self, order: Order) {
        if let Ok(mut orders) = self.listed_orders.lock() {
            orders.push(order);
        }
    }

    pub fn received(&self, kind: DestinationKind) -> Vec<PurchaseEvent> {
        match kind {
            DestinationKind::MetaCapi => self.meta.received(),
            DestinationKind::Ga4 => self.ga4.received(),
        }
    }

    pub fn received_for(&self, kind: DestinationKind, order_number: &str) -> Vec<PurchaseEvent> {
        self.received(kind).into_iter().filter(|e| e.order_number.as_str() == order_number).collect()
    }
}

impl Integrations for E2eIntegrations {
    type Source = StubOrderSource;

    fn order_source(&self, _shop: &ShopConfig) -> Result<Self::Source, ServerError> {
        let orders = self.listed_orders.lock().map(|o| o.clone()).unwrap_or_default();
        Ok(StubOrderSource::with_orders(orders).with_line_items(vec![line_item("GIN-70")]))
    }

    fn destinations(&self, _shop: &ShopConfig) -> Result<Vec<Arc<dyn Destination>>, ServerError> {
        let meta: Arc<dyn Destination> = self.meta.clone();
        let ga4: Arc<dyn Destination> = self.ga4.clone();
        Ok(vec![meta, ga4])
    }
}
