//! The GA4 Measurement Protocol as a [`Destination`].
use analytics_tools::ga4::{fallback_client_id, Ga4Api, Ga4Event, Ga4Item, Ga4Payload, Ga4PurchaseParams};
use conversion_engine::{
    db_types::{DestinationKind, PurchaseEvent},
    traits::{Destination, DestinationError, DestinationReceipt},
};
use futures::future::BoxFuture;
use log::*;

use crate::integrations::meta::destination_error;

pub fn ga4_payload_from_purchase(event: &PurchaseEvent) -> Ga4Payload {
    let client_id = event.attribution.ga_client_id.clone().unwrap_or_else(fallback_client_id);
    let items = event
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| Ga4Item {
            item_id: item.sku.clone().unwrap_or_else(|| item.id.clone()),
            item_name: item.title.clone(),
            quantity: item.quantity,
            price: item.unit_price,
            item_brand: item.brand.clone(),
            item_category: item.category.clone(),
            index,
        })
        .collect();
    let params = Ga4PurchaseParams {
        transaction_id: event.order_number.to_string(),
        currency: event.currency.clone(),
        value: event.value,
        tax: event.tax,
        shipping: event.shipping,
        items,
        data_source: "server".to_string(),
    };
    Ga4Payload {
        client_id,
        timestamp_micros: event.event_time.timestamp_micros(),
        events: vec![Ga4Event { name: "purchase".to_string(), params }],
        user_properties: None,
    }
    .with_session_id(event.attribution.ga_session_id.as_deref())
}

pub struct Ga4Destination {
    api: Ga4Api,
}

impl Ga4Destination {
    pub fn new(api: Ga4Api) -> Self {
        Self { api }
    }
}

impl Destination for Ga4Destination {
    fn kind(&self) -> DestinationKind {
        DestinationKind::Ga4
    }

    fn is_configured(&self) -> bool {
        self.api.config().is_configured()
    }

    fn send<'a>(&'a self, event: &'a PurchaseEvent) -> BoxFuture<'a, Result<DestinationReceipt, DestinationError>> {
        Box::pin(async move {
            let payload = ga4_payload_from_purchase(event);
            self.api.collect(&payload).await.map_err(destination_error)?;
            debug!("📣️ GA4 accepted {}", event.event_id);
            // The Measurement Protocol returns no body, so there is nothing to track.
            Ok(DestinationReceipt::default())
        })
    }
}
