use actix_web::http::StatusCode;
use conversion_engine::{
    db_types::AttributionRecord,
    test_utils::stubs::{BrokenStore, UnavailableStore},
    traits::KeyValueStore,
    MemoryStore,
};
use serde_json::json;

use super::helpers::{post_json, send, test_api, TestIntegrations};

#[actix_web::test]
async fn pixel_data_is_staged() {
    let api = test_api(MemoryStore::new(), TestIntegrations::accepting());
    let beacon = json!({
        "order_id": 1001,
        "fbc": "fb.1.1717232100000.xyz",
        "fbp": "fb.1.1717232000000.123456789",
        "ga_client_id": "1234567890.1717232000",
        "page_url": "https://vikginchoice.example/checkout/thankyou",
    });
    let req = post_json("/pixel-data?shop=vikginchoice", &beacon.to_string())
        .insert_header(("CF-Connecting-IP", "203.0.113.7"))
        .insert_header(("User-Agent", "Mozilla/5.0 (browser)"));
    let res = send(&api, req).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.headers.get("Access-Control-Allow-Origin").unwrap(), "*");
    let body = res.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["stored"], true);
    assert_eq!(body["order_id"], "1001");
    assert_eq!(body["captured"]["fbc"], true);
    assert_eq!(body["captured"]["client_ip_address"], true);
    assert!(!res.body.contains("xyz"));

    let stored = api.store().get("pixel_data_vikginchoice_1001").await.unwrap().expect("record was staged");
    let record: AttributionRecord = serde_json::from_str(&stored).unwrap();
    assert_eq!(record.fbc.as_deref(), Some("fb.1.1717232100000.xyz"));
    assert_eq!(record.ga_client_id.as_deref(), Some("1234567890.1717232000"));
    assert_eq!(record.client_ip_address.as_deref(), Some("203.0.113.7"));
    assert_eq!(record.client_user_agent.as_deref(), Some("Mozilla/5.0 (browser)"));
    assert_eq!(record.event_source_url.as_deref(), Some("https://vikginchoice.example/checkout/thankyou"));
    assert!(record.captured_at.is_some());
}

#[actix_web::test]
async fn shop_can_come_from_the_body() {
    let api = test_api(MemoryStore::new(), TestIntegrations::accepting());
    let beacon = json!({ "order_id": "77", "shop": "VikGinChoice", "fbp": "fb.1.2.3" }).to_string();
    let res = send(&api, post_json("/pixel-data", &beacon)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(api.store().get("pixel_data_vikginchoice_77").await.unwrap().is_some());
}

#[actix_web::test]
async fn invalid_beacons() {
    let api = test_api(MemoryStore::new(), TestIntegrations::accepting());
    let res = send(&api, post_json("/pixel-data?shop=vikginchoice", r#"{"fbc": "xyz"}"#)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.contains("order_id"));
    let res = send(&api, post_json("/pixel-data?shop=vikginchoice", "fbc=xyz")).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let res = send(&api, post_json("/pixel-data?shop=nobody", r#"{"order_id": "1"}"#)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let res = send(&api, post_json("/pixel-data", r#"{"order_id": "1"}"#)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(api.store().is_empty());
}

#[actix_web::test]
async fn an_unavailable_store_is_not_the_browsers_problem() {
    let api = test_api(UnavailableStore, TestIntegrations::accepting());
    let res = send(&api, post_json("/pixel-data?shop=vikginchoice", r#"{"order_id": "1", "fbc": "xyz"}"#)).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["stored"], false);
}

#[actix_web::test]
async fn storage_failures_are_server_errors() {
    let api = test_api(BrokenStore, TestIntegrations::accepting());
    let res = send(&api, post_json("/pixel-data?shop=vikginchoice", r#"{"order_id": "1", "fbc": "xyz"}"#)).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json()["success"], false);
}
