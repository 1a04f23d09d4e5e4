use actix_web::{http::StatusCode, test::TestRequest};
use conversion_engine::MemoryStore;

use super::helpers::{send, test_api, TestIntegrations};

#[actix_web::test]
async fn health_endpoint() {
    let api = test_api(MemoryStore::new(), TestIntegrations::accepting());
    let res = send(&api, TestRequest::get().uri("/health")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["status"], "ok");
    assert_eq!(res.headers.get("Access-Control-Allow-Origin").unwrap(), "*");
}

#[actix_web::test]
async fn unknown_routes_are_json_404s() {
    let api = test_api(MemoryStore::new(), TestIntegrations::accepting());
    let res = send(&api, TestRequest::get().uri("/debug-env")).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json()["success"], false);
    assert!(res.body.contains("/debug-env"));
}

#[actix_web::test]
async fn preflight_requests() {
    let api = test_api(MemoryStore::new(), TestIntegrations::accepting());
    for uri in ["/webhook", "/pixel-data"] {
        let res = send(&api, TestRequest::default().method(actix_web::http::Method::OPTIONS).uri(uri)).await;
        assert_eq!(res.status, StatusCode::NO_CONTENT, "{uri}");
        assert_eq!(res.headers.get("Access-Control-Allow-Origin").unwrap(), "*");
        let methods = res.headers.get("Access-Control-Allow-Methods").unwrap().to_str().unwrap();
        assert!(methods.contains("POST"));
    }
}

#[actix_web::test]
async fn webhook_only_accepts_post() {
    let api = test_api(MemoryStore::new(), TestIntegrations::accepting());
    let res = send(&api, TestRequest::get().uri("/webhook?shop=vikginchoice")).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(api.store().len(), 0);
}
