use actix_web::http::StatusCode;
use chrono::{TimeZone, Utc};
use conversion_engine::{test_utils::stubs::StubBehaviour, traits::KeyValueStore, MemoryStore};
use serde_json::json;

use super::helpers::{post_json, send, test_api, webhook_body, TestIntegrations};
use crate::integrations::meta::meta_event_from_purchase;

#[actix_web::test]
async fn missing_shop() {
    let integrations = TestIntegrations::accepting();
    let api = test_api(MemoryStore::new(), integrations.clone());
    let res = send(&api, post_json("/webhook", &webhook_body("1001"))).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.json()["error"].as_str().unwrap().contains("No shop was specified"));
    assert_eq!(integrations.meta.call_count(), 0);
}

#[actix_web::test]
async fn unknown_shop() {
    let integrations = TestIntegrations::accepting();
    let api = test_api(MemoryStore::new(), integrations.clone());
    let res = send(&api, post_json("/webhook?shop=retoertje", &webhook_body("1001"))).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.contains("Unknown shop 'retoertje'"));
    assert_eq!(integrations.meta.call_count(), 0);
    assert!(api.store().is_empty());
}

#[actix_web::test]
async fn shop_header_is_accepted() {
    let integrations = TestIntegrations::accepting();
    let api = test_api(MemoryStore::new(), integrations.clone());
    let req = post_json("/webhook", &webhook_body("1001")).insert_header(("X-Shop-Id", "VikGinChoice"));
    let res = send(&api, req).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["shop"], "vikginchoice");
}

#[actix_web::test]
async fn malformed_bodies() {
    let integrations = TestIntegrations::accepting();
    let api = test_api(MemoryStore::new(), integrations.clone());
    let res = send(&api, post_json("/webhook?shop=vikginchoice", "{not json")).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let res = send(&api, post_json("/webhook?shop=vikginchoice", r#"{"order": {"priceIncl": 10}}"#)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.contains("no order number"));
    let res = send(&api, post_json("/webhook?shop=vikginchoice", "[1, 2, 3]")).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(integrations.meta.call_count(), 0);
    assert!(api.store().is_empty());
}

#[actix_web::test]
async fn order_1001_end_to_end() {
    let integrations = TestIntegrations::accepting();
    let api = test_api(MemoryStore::new(), integrations.clone());
    let beacon = json!({ "order_id": "1001", "fbc": "xyz" }).to_string();
    let res = send(&api, post_json("/pixel-data?shop=vikginchoice", &beacon)).await;
    assert_eq!(res.status, StatusCode::OK);

    let res = send(&api, post_json("/webhook?shop=vikginchoice", &webhook_body("1001"))).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "delivered");
    assert_eq!(body["order_number"], "1001");
    assert_eq!(body["event_id"], "purchase_1001");
    assert_eq!(body["ledger_committed"], true);
    assert_eq!(body["destinations"].as_array().unwrap().len(), 2);

    let meta_events = integrations.meta.received();
    let ga4_events = integrations.ga4.received();
    assert_eq!(meta_events.len(), 1);
    assert_eq!(ga4_events.len(), 1);
    assert_eq!(meta_events[0].order_number.as_str(), "1001");
    assert_eq!(ga4_events[0].order_number.as_str(), "1001");
    let created = Utc.with_ymd_and_hms(2024, 6, 1, 9, 15, 0).unwrap();
    assert_eq!(meta_events[0].event_time, created);
    assert_eq!(ga4_events[0].event_time, created);
    let payload = meta_event_from_purchase(&meta_events[0], "https://vikginchoice.example/checkout/thankyou");
    assert_eq!(payload.user_data.fbc.as_deref(), Some("xyz"));
    assert_eq!(payload.custom_data.order_id, "1001");
    assert_eq!(payload.event_id, "purchase_1001");

    let marker = api.store().get("order_vikginchoice_1001").await.unwrap();
    assert!(marker.is_some());

    // The same webhook again, e.g. a Lightspeed retry
    let res = send(&api, post_json("/webhook?shop=vikginchoice", &webhook_body("1001"))).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["status"], "duplicate");
    assert_eq!(integrations.meta.call_count(), 1);
    assert_eq!(integrations.ga4.call_count(), 1);
}

#[actix_web::test]
async fn stored_attribution_beats_legacy_fields() {
    let integrations = TestIntegrations::accepting();
    let api = test_api(MemoryStore::new(), integrations.clone());
    let beacon = json!({ "order_id": 1002, "fbc": "stored-fbc" }).to_string();
    send(&api, post_json("/pixel-data?shop=vikginchoice", &beacon)).await;
    let mut body: serde_json::Value = serde_json::from_str(&webhook_body("1002")).unwrap();
    body["fbc"] = json!("legacy-fbc");
    body["fbp"] = json!("legacy-fbp");
    let req = post_json("/webhook?shop=vikginchoice", &body.to_string()).insert_header(("User-Agent", "Lightspeed"));
    let res = send(&api, req).await;
    assert_eq!(res.status, StatusCode::OK);
    let event = &integrations.meta.received()[0];
    assert_eq!(event.attribution.fbc.as_deref(), Some("stored-fbc"));
    assert_eq!(event.attribution.fbp.as_deref(), Some("legacy-fbp"));
    assert_eq!(event.attribution.client_user_agent.as_deref(), Some("Lightspeed"));
}

#[actix_web::test]
async fn unpaid_orders_are_skipped() {
    let integrations = TestIntegrations::accepting();
    let api = test_api(MemoryStore::new(), integrations.clone());
    let body = webhook_body("1003").replace(r#""paymentStatus":"paid""#, r#""paymentStatus":"not_paid""#);
    let res = send(&api, post_json("/webhook?shop=vikginchoice", &body)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["status"], "skipped");
    assert_eq!(integrations.meta.call_count(), 0);
    assert_eq!(integrations.ga4.call_count(), 0);
}

#[actix_web::test]
async fn orders_without_a_total_are_reported_at_zero() {
    let integrations = TestIntegrations::accepting();
    let api = test_api(MemoryStore::new(), integrations.clone());
    let body = json!({
        "order": {
            "number": "1006",
            "paymentStatus": "paid",
            "email": "a@b.com",
            "createdAt": "2024-06-01T11:15:00+02:00"
        }
    });
    let res = send(&api, post_json("/webhook?shop=vikginchoice", &body.to_string())).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["status"], "delivered");
    let event = integrations.meta.received().pop().unwrap();
    assert_eq!(event.value, 0.0);
    assert_eq!(integrations.ga4.received()[0].value, 0.0);
}

#[actix_web::test]
async fn partial_delivery_is_a_success() {
    let integrations = TestIntegrations::new(StubBehaviour::Accept, StubBehaviour::Reject);
    let api = test_api(MemoryStore::new(), integrations.clone());
    let res = send(&api, post_json("/webhook?shop=vikginchoice", &webhook_body("1004"))).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["status"], "partially_delivered");
    assert_eq!(body["destinations"][0]["destination"], "meta_capi");
    assert_eq!(body["destinations"][0]["result"], "succeeded");
    assert_eq!(body["destinations"][1]["destination"], "ga4");
    assert_eq!(body["destinations"][1]["result"], "failed");
    let res = send(&api, post_json("/webhook?shop=vikginchoice", &webhook_body("1004"))).await;
    assert_eq!(res.json()["status"], "duplicate");
}

#[actix_web::test]
async fn total_failure_is_a_bad_gateway_and_can_be_retried() {
    let integrations = TestIntegrations::new(StubBehaviour::Reject, StubBehaviour::Reject);
    let api = test_api(MemoryStore::new(), integrations.clone());
    let res = send(&api, post_json("/webhook?shop=vikginchoice", &webhook_body("1005"))).await;
    assert_eq!(res.status, StatusCode::BAD_GATEWAY);
    let body = res.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["status"], "failed");
    assert_eq!(body["ledger_committed"], false);
    assert!(api.store().get("order_vikginchoice_1005").await.unwrap().is_none());

    let res = send(&api, post_json("/webhook?shop=vikginchoice", &webhook_body("1005"))).await;
    assert_eq!(res.status, StatusCode::BAD_GATEWAY);
    assert_eq!(integrations.meta.call_count(), 2);
}
