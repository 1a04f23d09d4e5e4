use serde::{Deserialize, Serialize};

/// The body of a `POST /{pixel_id}/events` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaEventsRequest {
    pub data: Vec<MetaEvent>,
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_event_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaEvent {
    pub event_name: String,
    /// Unix timestamp in seconds.
    pub event_time: i64,
    /// Must equal the `eventID` the browser pixel uses, so Meta can deduplicate the pair.
    pub event_id: String,
    pub event_source_url: String,
    pub action_source: String,
    pub user_data: MetaUserData,
    pub custom_data: MetaCustomData,
}

/// Customer information parameters. Personal fields are SHA-256 hashes. `fbc`, `fbp`, the client IP and user agent
/// are sent as-is, as the API requires.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaUserData {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub em: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub ph: Vec<String>,
    #[serde(rename = "fn", skip_serializing_if = "Vec::is_empty", default)]
    pub first_name: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub ln: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub ct: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub zp: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub country: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fbc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fbp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaCustomData {
    pub content_ids: Vec<String>,
    pub content_type: String,
    pub contents: Vec<MetaContent>,
    pub currency: String,
    pub value: f64,
    pub order_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaContent {
    pub id: String,
    pub quantity: u32,
    pub item_price: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetaEventsResponse {
    #[serde(default)]
    pub events_received: u32,
    #[serde(default)]
    pub messages: Vec<serde_json::Value>,
    #[serde(default)]
    pub fbtrace_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct MetaErrorResponse {
    pub error: MetaErrorDetail,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct MetaErrorDetail {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub fbtrace_id: Option<String>,
}
