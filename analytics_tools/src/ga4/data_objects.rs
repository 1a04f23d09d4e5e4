use std::{
    collections::BTreeMap,
    time::{SystemTime, UNIX_EPOCH},
};

use log::warn;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ga4Payload {
    /// The `_ga` cookie value (`1234567890.1234567890`). GA4 only deduplicates against browser events when this
    /// matches the browser's id.
    pub client_id: String,
    pub timestamp_micros: i64,
    pub events: Vec<Ga4Event>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_properties: Option<BTreeMap<String, UserProperty>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProperty {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ga4Event {
    pub name: String,
    pub params: Ga4PurchaseParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ga4PurchaseParams {
    pub transaction_id: String,
    pub currency: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping: Option<f64>,
    pub items: Vec<Ga4Item>,
    /// Marks the event as server-side in reports.
    pub data_source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ga4Item {
    pub item_id: String,
    pub item_name: String,
    pub quantity: u32,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_category: Option<String>,
    pub index: usize,
}

impl Ga4Payload {
    pub fn with_session_id(mut self, session_id: Option<&str>) -> Self {
        self.user_properties = session_id.map(|id| {
            let mut props = BTreeMap::new();
            props.insert("session_id".to_string(), UserProperty { value: id.to_string() });
            props
        });
        self
    }
}

/// Generates a client id in the `_ga` cookie format (`random.unix_seconds`) for orders where the browser's id is
/// unknown. Such events are still recorded but cannot be deduplicated against the browser's own purchase event.
pub fn fallback_client_id() -> String {
    let random_id = rand::thread_rng().gen_range(0..i32::MAX);
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default();
    warn!("📣️ No GA client id from the browser, generating a fallback client id. Deduplication may not work.");
    format!("{random_id}.{timestamp}")
}
