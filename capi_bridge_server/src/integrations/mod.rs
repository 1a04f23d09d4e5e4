//! # Integrations
//!
//! Wires the tool crates into the engine's traits, and builds them for a tenant from its [`ShopConfig`].
use std::{sync::Arc, time::Duration};

use analytics_tools::{ga4::Ga4Api, meta::MetaCapiApi};
use conversion_engine::traits::{Destination, OrderSource};
use lightspeed_tools::LightspeedApi;
use reqwest::Client;

use crate::{config::ShopConfig, errors::ServerError};

pub mod ga4;
pub mod lightspeed;
pub mod meta;

pub use ga4::Ga4Destination;
pub use lightspeed::LightspeedOrderSource;
pub use meta::MetaDestination;

/// Builds a tenant's order source and destinations. The server uses [`LiveIntegrations`]; tests substitute stubs.
pub trait Integrations: Clone {
    type Source: OrderSource;

    fn order_source(&self, shop: &ShopConfig) -> Result<Self::Source, ServerError>;

    fn destinations(&self, shop: &ShopConfig) -> Result<Vec<Arc<dyn Destination>>, ServerError>;
}

/// The real thing: Lightspeed, Meta CAPI and GA4, sharing one HTTP client.
#[derive(Clone)]
pub struct LiveIntegrations {
    client: Client,
}

impl LiveIntegrations {
    pub fn new(timeout: Duration) -> Result<Self, ServerError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServerError::InitializeError(format!("Could not create the HTTP client. {e}")))?;
        Ok(Self { client })
    }
}

impl Integrations for LiveIntegrations {
    type Source = LightspeedOrderSource;

    fn order_source(&self, shop: &ShopConfig) -> Result<Self::Source, ServerError> {
        let api = LightspeedApi::new_with_client(shop.lightspeed.clone(), self.client.clone());
        Ok(LightspeedOrderSource::new(api))
    }

    fn destinations(&self, shop: &ShopConfig) -> Result<Vec<Arc<dyn Destination>>, ServerError> {
        let meta = MetaCapiApi::new_with_client(shop.meta.clone(), self.client.clone());
        let ga4 = Ga4Api::new_with_client(shop.ga4.clone(), self.client.clone());
        Ok(vec![
            Arc::new(MetaDestination::new(meta, shop.default_event_source_url())),
            Arc::new(Ga4Destination::new(ga4)),
        ])
    }
}
