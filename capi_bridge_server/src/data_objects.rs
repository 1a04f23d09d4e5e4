use actix_web::http::StatusCode;
use bridge_common::ShopId;
use chrono::Utc;
use conversion_engine::{
    db_types::{AttributionRecord, OrderNumber},
    delivery::DestinationReport,
    DeliveryOutcome,
    DeliveryStatus,
};
use lightspeed_tools::helpers::flexible_id;
use serde::{Deserialize, Serialize};
use serde_json::Value;

//----------------------------------------------   Webhook  ----------------------------------------------------

/// Attribution fields that older thank-you page scripts put directly into the webhook body, next to the order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyAttributionFields {
    #[serde(default)]
    pub fbc: Option<String>,
    #[serde(default)]
    pub fbp: Option<String>,
    #[serde(default)]
    pub client_user_agent: Option<String>,
    #[serde(default)]
    pub event_source_url: Option<String>,
}

impl LegacyAttributionFields {
    pub fn from_body(body: &Value) -> Self {
        serde_json::from_value(body.clone()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub success: bool,
    pub status: String,
    pub shop: ShopId,
    pub order_number: OrderNumber,
    pub event_id: String,
    pub destinations: Vec<DestinationReport>,
    pub ledger_committed: bool,
    pub message: String,
}

impl WebhookResponse {
    /// 200 for everything except a delivery that reached no destination at all.
    pub fn http_status(&self) -> StatusCode {
        if self.success {
            StatusCode::OK
        } else {
            StatusCode::BAD_GATEWAY
        }
    }
}

impl From<DeliveryOutcome> for WebhookResponse {
    fn from(outcome: DeliveryOutcome) -> Self {
        let message = outcome.message();
        Self {
            success: outcome.status.is_success(),
            status: outcome.status.as_str().to_string(),
            shop: outcome.shop,
            order_number: outcome.order_number,
            event_id: outcome.event_id,
            destinations: outcome.destinations,
            ledger_committed: outcome.ledger_committed,
            message,
        }
    }
}

//----------------------------------------------   Pixel data  ----------------------------------------------------

/// The beacon posted by the thank-you page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PixelDataRequest {
    #[serde(default, deserialize_with = "flexible_id")]
    pub order_id: Option<String>,
    /// The tenant, for beacons that can't set a query parameter or header.
    #[serde(default)]
    pub shop: Option<String>,
    #[serde(default)]
    pub fbc: Option<String>,
    #[serde(default)]
    pub fbp: Option<String>,
    #[serde(default)]
    pub ga_client_id: Option<String>,
    #[serde(default, deserialize_with = "flexible_id")]
    pub ga_session_id: Option<String>,
    #[serde(default)]
    pub gclid: Option<String>,
    #[serde(default)]
    pub utm: Option<Value>,
    #[serde(default)]
    pub referrer: Option<String>,
    #[serde(default, alias = "user_agent")]
    pub client_user_agent: Option<String>,
    #[serde(default, alias = "page_url")]
    pub event_source_url: Option<String>,
}

impl PixelDataRequest {
    /// The record to stage. The client IP comes from the request, never the body. The body's user agent wins over the
    /// request header.
    pub fn into_attribution(self, client_ip: Option<String>, header_user_agent: Option<String>) -> AttributionRecord {
        AttributionRecord {
            fbc: self.fbc,
            fbp: self.fbp,
            ga_client_id: self.ga_client_id,
            ga_session_id: self.ga_session_id,
            gclid: self.gclid,
            utm: self.utm,
            referrer: self.referrer,
            client_ip_address: client_ip,
            client_user_agent: self.client_user_agent.filter(|s| !s.trim().is_empty()).or(header_user_agent),
            event_source_url: self.event_source_url,
            captured_at: Some(Utc::now()),
        }
        .normalized()
    }
}

/// Which attribution fields a beacon carried. Values are never echoed back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedFields {
    pub fbc: bool,
    pub fbp: bool,
    pub ga_client_id: bool,
    pub client_ip_address: bool,
    pub client_user_agent: bool,
}

impl From<&AttributionRecord> for CapturedFields {
    fn from(record: &AttributionRecord) -> Self {
        Self {
            fbc: record.fbc.is_some(),
            fbp: record.fbp.is_some(),
            ga_client_id: record.ga_client_id.is_some(),
            client_ip_address: record.client_ip_address.is_some(),
            client_user_agent: record.client_user_agent.is_some(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PixelDataResponse {
    pub success: bool,
    /// `false` when the store was unavailable. The order will still be reported, with less attribution.
    pub stored: bool,
    pub shop: ShopId,
    pub order_id: OrderNumber,
    pub captured: CapturedFields,
    pub message: String,
}
