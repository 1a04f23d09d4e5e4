use chrono::{DateTime, TimeZone, Utc};

use crate::db_types::{AttributionRecord, CustomerIdentity, LineItem, Order, OrderNumber, PaymentStatus};

pub fn order_created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 15, 0).single().unwrap_or_default()
}

/// A paid order with an email address and one line item.
pub fn paid_order(number: &str) -> Order {
    Order {
        id: Some(format!("id-{number}")),
        number: OrderNumber::from(number),
        created_at: Some(order_created_at()),
        payment_status: PaymentStatus::Paid,
        currency: "EUR".into(),
        total: 59.95,
        tax: Some(10.4),
        shipping: Some(4.95),
        customer: CustomerIdentity {
            email: Some("Jane.Doe@Example.com".into()),
            phone: Some("+31 6 12345678".into()),
            first_name: Some("Jane".into()),
            last_name: Some("Doe".into()),
            city: Some("Amsterdam".into()),
            zipcode: Some("1011 AB".into()),
            country: Some("NL".into()),
        },
        line_items: Some(vec![line_item("GIN-70")]),
    }
}

/// Like [`paid_order`] but without line items, as orders arrive from the listing endpoint.
pub fn paid_order_without_items(number: &str) -> Order {
    Order { line_items: None, ..paid_order(number) }
}

pub fn line_item(sku: &str) -> LineItem {
    LineItem {
        id: format!("variant-{sku}"),
        sku: Some(sku.to_string()),
        title: format!("Product {sku}"),
        quantity: 1,
        unit_price: 55.0,
        brand: Some("Distillery".into()),
        category: Some("Gin".into()),
    }
}

pub fn browser_attribution() -> AttributionRecord {
    AttributionRecord {
        fbc: Some("fb.1.1717232100000.xyz".into()),
        fbp: Some("fb.1.1717232000000.123456789".into()),
        ga_client_id: Some("1234567890.1717232000".into()),
        ga_session_id: Some("1717232000".into()),
        client_ip_address: Some("203.0.113.7".into()),
        client_user_agent: Some("Mozilla/5.0 (browser)".into()),
        event_source_url: Some("https://shop.example/checkout/thankyou".into()),
        ..Default::default()
    }
}
