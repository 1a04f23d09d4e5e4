//! Data types shared by the engine and its backends.
//!
//! Orders arrive from the shop platform and are read-only from the engine's point of view. Attribution records and
//! dedup markers are the only things the engine persists, and they live in a [`crate::traits::KeyValueStore`] as
//! JSON.
use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

//--------------------------------------     OrderNumber       ---------------------------------------------------------

/// The shop-facing order number. Unique per tenant and used as the idempotency key for deliveries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    pub fn new<S: Into<String>>(number: S) -> Self {
        Self(number.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OrderNumber {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for OrderNumber {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<u64> for OrderNumber {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

//--------------------------------------     PaymentStatus       -------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Paid,
    NotPaid,
    Other(String),
}

impl PaymentStatus {
    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }
}

impl From<&str> for PaymentStatus {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "paid" => PaymentStatus::Paid,
            "not_paid" | "not paid" | "unpaid" => PaymentStatus::NotPaid,
            other => PaymentStatus::Other(other.to_string()),
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::NotPaid => write!(f, "not_paid"),
            PaymentStatus::Other(s) => write!(f, "{s}"),
        }
    }
}

//--------------------------------------     Order       ---------------------------------------------------------------

/// Customer details as supplied by the platform. Nothing in here is hashed yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerIdentity {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub city: Option<String>,
    pub zipcode: Option<String>,
    /// ISO 3166 alpha-2 country code
    pub country: Option<String>,
}

impl CustomerIdentity {
    /// The customer's email address, if there is one that isn't blank.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().map(str::trim).filter(|e| !e.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub sku: Option<String>,
    pub title: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub brand: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// The platform's internal id. Needed to fetch line items when they weren't supplied.
    pub id: Option<String>,
    pub number: OrderNumber,
    pub created_at: Option<DateTime<Utc>>,
    pub payment_status: PaymentStatus,
    pub currency: String,
    /// Order total, including tax
    pub total: f64,
    pub tax: Option<f64>,
    pub shipping: Option<f64>,
    pub customer: CustomerIdentity,
    /// `None` when the ingestion path didn't include line items.
    pub line_items: Option<Vec<LineItem>>,
}

//--------------------------------------     AttributionRecord       ---------------------------------------------------

/// Browser-side context captured on the thank-you page, or derived from the incoming request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fbc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fbp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ga_client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ga_session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gclid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
}

impl AttributionRecord {
    /// Combines a stored record with request-derived fields. Every field that is present in `self` is kept; the
    /// fallback only fills the gaps.
    pub fn merge(self, fallback: AttributionRecord) -> AttributionRecord {
        AttributionRecord {
            fbc: self.fbc.or(fallback.fbc),
            fbp: self.fbp.or(fallback.fbp),
            ga_client_id: self.ga_client_id.or(fallback.ga_client_id),
            ga_session_id: self.ga_session_id.or(fallback.ga_session_id),
            gclid: self.gclid.or(fallback.gclid),
            utm: self.utm.or(fallback.utm),
            referrer: self.referrer.or(fallback.referrer),
            client_ip_address: self.client_ip_address.or(fallback.client_ip_address),
            client_user_agent: self.client_user_agent.or(fallback.client_user_agent),
            event_source_url: self.event_source_url.or(fallback.event_source_url),
            captured_at: self.captured_at.or(fallback.captured_at),
        }
    }

    /// Drops blank strings so that an empty form field never shadows a real value during a merge.
    pub fn normalized(self) -> AttributionRecord {
        let clean = |s: Option<String>| s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        AttributionRecord {
            fbc: clean(self.fbc),
            fbp: clean(self.fbp),
            ga_client_id: clean(self.ga_client_id),
            ga_session_id: clean(self.ga_session_id),
            gclid: clean(self.gclid),
            utm: self.utm.filter(|v| !v.is_null()),
            referrer: clean(self.referrer),
            client_ip_address: clean(self.client_ip_address),
            client_user_agent: clean(self.client_user_agent),
            event_source_url: clean(self.event_source_url),
            captured_at: self.captured_at,
        }
    }

    pub fn has_click_ids(&self) -> bool {
        self.fbc.is_some() || self.fbp.is_some() || self.gclid.is_some()
    }
}

//--------------------------------------     DedupMarker       ---------------------------------------------------------

/// Which ingestion path triggered a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliverySource {
    Webhook,
    Poll,
}

impl Display for DeliverySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliverySource::Webhook => write!(f, "webhook"),
            DeliverySource::Poll => write!(f, "poll"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationKind {
    MetaCapi,
    Ga4,
}

impl Display for DestinationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DestinationKind::MetaCapi => write!(f, "meta_capi"),
            DestinationKind::Ga4 => write!(f, "ga4"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MarkerStatus {
    /// A delivery attempt holds the order. Expires quickly so that a crashed attempt doesn't block retries.
    Reserved,
    Delivered { succeeded: Vec<DestinationKind>, failed: Vec<DestinationKind> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupMarker {
    pub recorded_at: DateTime<Utc>,
    pub source: DeliverySource,
    pub status: MarkerStatus,
}

//--------------------------------------     PurchaseEvent       -------------------------------------------------------

/// Customer identity after normalization and hashing. `country` is lowercased but never hashed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HashedIdentity {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub city: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
    pub external_id: String,
}

/// The canonical purchase event. One is built per delivery attempt and every destination translates it into its own
/// wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseEvent {
    pub event_id: String,
    pub event_time: DateTime<Utc>,
    pub order_number: OrderNumber,
    pub value: f64,
    pub currency: String,
    pub tax: Option<f64>,
    pub shipping: Option<f64>,
    pub items: Vec<LineItem>,
    pub user: HashedIdentity,
    pub attribution: AttributionRecord,
}
