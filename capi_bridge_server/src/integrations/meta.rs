//! The Meta Conversions API as a [`Destination`].
use analytics_tools::{
    meta::{MetaCapiApi, MetaContent, MetaCustomData, MetaEvent, MetaUserData},
    AnalyticsApiError,
};
use conversion_engine::{
    db_types::{DestinationKind, PurchaseEvent},
    traits::{Destination, DestinationError, DestinationReceipt},
};
use futures::future::BoxFuture;
use log::*;

pub const DEFAULT_COUNTRY: &str = "nl";

/// Translates the canonical purchase event into a CAPI `Purchase` event.
pub fn meta_event_from_purchase(event: &PurchaseEvent, default_event_source_url: &str) -> MetaEvent {
    let user = &event.user;
    let attribution = &event.attribution;
    let list = |v: &Option<String>| v.iter().cloned().collect::<Vec<String>>();
    let user_data = MetaUserData {
        em: list(&user.email),
        ph: list(&user.phone),
        first_name: list(&user.first_name),
        ln: list(&user.last_name),
        ct: list(&user.city),
        zp: list(&user.zipcode),
        country: vec![user.country.clone().unwrap_or_else(|| DEFAULT_COUNTRY.to_string())],
        fbc: attribution.fbc.clone(),
        fbp: attribution.fbp.clone(),
        client_ip_address: attribution.client_ip_address.clone(),
        client_user_agent: attribution.client_user_agent.clone(),
        external_id: Some(user.external_id.clone()),
    };
    let contents = event
        .items
        .iter()
        .map(|item| MetaContent { id: item.id.clone(), quantity: item.quantity, item_price: item.unit_price })
        .collect::<Vec<_>>();
    let custom_data = MetaCustomData {
        content_ids: contents.iter().map(|c| c.id.clone()).collect(),
        content_type: "product".to_string(),
        contents,
        currency: event.currency.clone(),
        value: event.value,
        order_id: event.order_number.to_string(),
    };
    MetaEvent {
        event_name: "Purchase".to_string(),
        event_time: event.event_time.timestamp(),
        event_id: event.event_id.clone(),
        event_source_url: attribution
            .event_source_url
            .clone()
            .unwrap_or_else(|| default_event_source_url.to_string()),
        action_source: "website".to_string(),
        user_data,
        custom_data,
    }
}

pub(crate) fn destination_error(e: AnalyticsApiError) -> DestinationError {
    match e {
        AnalyticsApiError::NotConfigured(s) => DestinationError::NotConfigured(s),
        AnalyticsApiError::RequestError(s) | AnalyticsApiError::Initialization(s) => DestinationError::Transport(s),
        e => DestinationError::Rejected(e.to_string()),
    }
}

pub struct MetaDestination {
    api: MetaCapiApi,
    default_event_source_url: String,
}

impl MetaDestination {
    pub fn new(api: MetaCapiApi, default_event_source_url: String) -> Self {
        Self { api, default_event_source_url }
    }
}

impl Destination for MetaDestination {
    fn kind(&self) -> DestinationKind {
        DestinationKind::MetaCapi
    }

    fn is_configured(&self) -> bool {
        self.api.config().is_configured()
    }

    fn send<'a>(&'a self, event: &'a PurchaseEvent) -> BoxFuture<'a, Result<DestinationReceipt, DestinationError>> {
        Box::pin(async move {
            let meta_event = meta_event_from_purchase(event, &self.default_event_source_url);
            trace!(
                "📣️ Meta event {} (fbc: {}, fbp: {})",
                meta_event.event_id,
                meta_event.user_data.fbc.is_some(),
                meta_event.user_data.fbp.is_some()
            );
            let response = self.api.send_events(vec![meta_event]).await.map_err(destination_error)?;
            debug!("📣️ Meta received {} event(s) for {}", response.events_received, event.event_id);
            Ok(DestinationReceipt { tracking_id: response.fbtrace_id })
        })
    }
}
