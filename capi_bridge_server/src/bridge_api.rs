use std::sync::Arc;

use bridge_common::ShopId;
use conversion_engine::{traits::KeyValueStore, AttributionStage, DeliveryOrchestrator, LedgerConfig};
use log::*;

use crate::{
    config::{ShopConfig, ShopRegistry},
    errors::ServerError,
    integrations::Integrations,
};

/// `BridgeApi` is the server's entry point into the engine. It owns the shared store and the tenant registry, and
/// hands out per-tenant orchestrators and attribution stages on demand.
///
/// Every handle is built from the tenant's configuration at the time of the request, so unknown or incompletely
/// configured tenants are rejected before anything touches the store.
#[derive(Debug)]
pub struct BridgeApi<S, I> {
    store: S,
    registry: Arc<ShopRegistry>,
    integrations: I,
    ledger: LedgerConfig,
}

impl<S: Clone, I: Clone> Clone for BridgeApi<S, I> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            registry: Arc::clone(&self.registry),
            integrations: self.integrations.clone(),
            ledger: self.ledger,
        }
    }
}

impl<S, I> BridgeApi<S, I>
where
    S: KeyValueStore,
    I: Integrations,
{
    pub fn new(store: S, registry: ShopRegistry, integrations: I, ledger: LedgerConfig) -> Self {
        Self { store, registry: Arc::new(registry), integrations, ledger }
    }

    pub fn registry(&self) -> &ShopRegistry {
        &self.registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn shop(&self, shop: &ShopId) -> Result<&ShopConfig, ServerError> {
        let config = self.registry.resolve(shop).map_err(|e| {
            debug!("💻️ Rejecting request for shop {shop}. {e}");
            e
        })?;
        Ok(config)
    }

    pub fn orchestrator(&self, shop: &ShopId) -> Result<DeliveryOrchestrator<S, I::Source>, ServerError> {
        let config = self.shop(shop)?;
        let source = self.integrations.order_source(config)?;
        let destinations = self.integrations.destinations(config)?;
        Ok(DeliveryOrchestrator::new(config.id.clone(), self.store.clone(), &self.ledger, source, destinations))
    }

    pub fn attribution_stage(&self, shop: &ShopId) -> Result<AttributionStage<S>, ServerError> {
        let config = self.shop(shop)?;
        Ok(AttributionStage::new(config.id.clone(), self.store.clone(), self.ledger.attribution_ttl))
    }
}
