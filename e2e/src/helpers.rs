use std::env;

use analytics_tools::{ga4::Ga4Config, meta::MetaConfig};
use bridge_common::Secret;
use capi_bridge_server::config::ShopConfig;
use lightspeed_tools::LightspeedConfig;
use log::*;
use serde_json::{json, Value};

pub const E2E_SHOP: &str = "vikginchoice";

/// A fresh SQLite file in the temp directory. The store creates it on first connection.
pub fn random_db_url() -> String {
    let path = env::temp_dir().join(format!("bridge_e2e_{:08x}.db", rand::random::<u32>()));
    format!("sqlite://{}", path.display())
}

/// The tenant every scenario runs against. Credentials are placeholders, since destinations and the order source are
/// stubbed.
pub fn e2e_shop_config() -> ShopConfig {
    ShopConfig {
        id: E2E_SHOP.parse().expect("valid shop id"),
        name: "Vikgin Choice".into(),
        domain: "vikginchoice.example".into(),
        lightspeed: LightspeedConfig {
            cluster_url: "http://127.0.0.1:9".into(),
            language: "nl".into(),
            api_key: Secret::new("e2e-key".into()),
            api_secret: Secret::new("e2e-secret".into()),
            shop_id: "4321".into(),
        },
        meta: MetaConfig {
            access_token: Secret::new("e2e-token".into()),
            pixel_id: "1234567890".into(),
            api_version: "v18.0".into(),
            enabled: true,
            test_event_code: Some("TEST123".into()),
        },
        ga4: Ga4Config { measurement_id: "G-E2E".into(), api_secret: Secret::new("e2e-secret".into()), enabled: true },
    }
}

/// The body Lightspeed posts to `/webhook` when an order is created.
pub fn lightspeed_order_json(number: &str, payment_status: &str) -> Value {
    json!({
        "order": {
            "id": format!("9{number}"),
            "number": number,
            "createdAt": "2024-06-01T11:15:00+02:00",
            "status": "processing_awaiting_shipment",
            "paymentStatus": payment_status,
            "currency": "EUR",
            "priceIncl": "59.95",
            "tax": 10.4,
            "shippingCost": 4.95,
            "email": "Jane.Doe@Example.com",
            "firstname": "Jane",
            "lastname": "Doe",
            "addressBillingCity": "Amsterdam",
            "addressBillingCountry": { "code": "nl" },
            "products": [
                { "id": 1, "articleCode": "GIN-70", "productTitle": "Gin", "quantityOrdered": 1,
                  "basePriceIncl": 55.0, "variant": { "resource": { "id": 777 } } }
            ]
        }
    })
}

/// True if every key and value in `part` also appears in `complete`. Arrays must match element for element. Invalid
/// JSON on either side is never a subset.
pub fn json_is_subset_of(part: &str, complete: &str) -> bool {
    match (serde_json::from_str::<Value>(part), serde_json::from_str::<Value>(complete)) {
        (Ok(part), Ok(complete)) => value_is_subset_of(&part, &complete),
        (Err(e), _) | (_, Err(e)) => {
            error!("Cannot compare invalid JSON. {e}");
            false
        },
    }
}

pub fn value_is_subset_of(part: &Value, complete: &Value) -> bool {
    match (part, complete) {
        (Value::Null, _) => true,
        (Value::Object(part), Value::Object(complete)) => part.iter().all(|(key, value)| match complete.get(key) {
            Some(other) => {
                let found = value_is_subset_of(value, other);
                if !found {
                    debug!("Mismatch at '{key}': {value} vs {other}");
                }
                found
            },
            None => {
                debug!("Missing key '{key}'");
                false
            },
        }),
        (Value::Object(_), _) => false,
        (Value::Array(part), Value::Array(complete)) => {
            part.len() == complete.len() && part.iter().zip(complete).all(|(p, c)| value_is_subset_of(p, c))
        },
        (Value::Array(_), _) => false,
        (part, complete) => part == complete,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn scalars_must_match() {
        assert!(json_is_subset_of("1", "1"));
        assert!(!json_is_subset_of("1", "2"));
        assert!(!json_is_subset_of("\"1\"", "1"));
    }

    #[test]
    fn null_matches_anything() {
        assert!(value_is_subset_of(&Value::Null, &json!(true)));
        assert!(value_is_subset_of(&Value::Null, &Value::Null));
    }

    #[test]
    fn extra_keys_are_ignored() {
        let complete = r#"{"success": true, "status": "delivered", "event_id": "purchase_1001"}"#;
        assert!(json_is_subset_of(r#"{"status": "delivered"}"#, complete));
        assert!(!json_is_subset_of(r#"{"status": "duplicate"}"#, complete));
        assert!(!json_is_subset_of(r#"{"shop": "vikginchoice"}"#, complete));
    }

    #[test]
    fn arrays_match_element_for_element() {
        let complete = r#"{"destinations": [{"destination": "meta_capi", "result": "sent"}, {"destination": "ga4"}]}"#;
        assert!(json_is_subset_of(r#"{"destinations": [{"result": "sent"}, {}]}"#, complete));
        assert!(!json_is_subset_of(r#"{"destinations": [{"result": "sent"}]}"#, complete));
        assert!(!json_is_subset_of(r#"{"destinations": {"result": "sent"}}"#, complete));
    }

    #[test]
    fn invalid_json_is_never_a_subset() {
        assert!(!json_is_subset_of("{", "{}"));
        assert!(!json_is_subset_of("{}", "not json"));
    }

    #[test]
    fn webhook_bodies_carry_the_order_number() {
        let body = lightspeed_order_json("1001", "paid");
        assert_eq!(body["order"]["number"], "1001");
        assert_eq!(body["order"]["paymentStatus"], "paid");
    }
}
