use chrono::Utc;
use log::*;

use crate::{
    db_types::{AttributionRecord, CustomerIdentity, HashedIdentity, Order, OrderNumber, PurchaseEvent},
    helpers::{hash_identity, hash_phone, normalize_country},
};

pub const DEFAULT_CURRENCY: &str = "EUR";

/// The event id for an order. Identical on every attempt and for every destination, which is what lets the
/// destinations deduplicate when our own ledger can't.
pub fn event_id_for(order_number: &OrderNumber) -> String {
    format!("purchase_{order_number}")
}

/// Upper-cased three-letter currency code.
pub fn normalize_currency(currency: &str) -> String {
    let code = currency.trim().to_uppercase().chars().take(3).collect::<String>();
    if code.is_empty() {
        DEFAULT_CURRENCY.to_string()
    } else {
        code
    }
}

pub fn hash_customer(customer: &CustomerIdentity, order_number: &OrderNumber) -> HashedIdentity {
    let hashed = |v: &Option<String>| v.as_deref().and_then(hash_identity);
    HashedIdentity {
        email: hashed(&customer.email),
        phone: customer.phone.as_deref().and_then(hash_phone),
        first_name: hashed(&customer.first_name),
        last_name: hashed(&customer.last_name),
        city: hashed(&customer.city),
        zipcode: customer.zipcode.as_deref().map(|z| z.replace(' ', "")).as_deref().and_then(hash_identity),
        country: customer.country.as_deref().and_then(normalize_country),
        external_id: order_number.to_string(),
    }
}

/// Builds the canonical purchase event. The order must already carry its line items.
///
/// The event time is the order's creation time. Only if the platform didn't give us one do we fall back to now.
pub fn build_purchase_event(order: Order, attribution: AttributionRecord) -> PurchaseEvent {
    let event_time = order.created_at.unwrap_or_else(|| {
        warn!("📦️ Order {} has no creation time. Using the current time as the event time.", order.number);
        Utc::now()
    });
    let user = hash_customer(&order.customer, &order.number);
    PurchaseEvent {
        event_id: event_id_for(&order.number),
        event_time,
        value: order.total,
        currency: normalize_currency(&order.currency),
        tax: order.tax,
        shipping: order.shipping,
        items: order.line_items.unwrap_or_default(),
        user,
        attribution,
        order_number: order.number,
    }
}
