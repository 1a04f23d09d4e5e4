use conversion_engine::{
    db_types::{CustomerIdentity, Order, PaymentStatus},
    test_utils::fixtures::{paid_order, paid_order_without_items},
    LedgerConfig,
    MemoryStore,
};

use super::helpers::{post_json, send, shop_config, test_api, webhook_body, TestIntegrations, SHOP};
use crate::{
    bridge_api::BridgeApi,
    config::ShopRegistry,
    poll_worker::run_poll_cycle,
};

#[actix_web::test]
async fn poll_cycle_delivers_paid_orders() {
    let _ = env_logger::try_init();
    let unpaid = Order { payment_status: PaymentStatus::NotPaid, ..paid_order("2002") };
    let no_email = Order { customer: CustomerIdentity::default(), ..paid_order("2003") };
    let integrations = TestIntegrations::accepting().with_orders(vec![paid_order_without_items("2001"), unpaid, no_email]);
    let api = test_api(MemoryStore::new(), integrations.clone());
    let summary = run_poll_cycle(&api, 10).await;
    let tenant = summary.tenant(SHOP).unwrap();
    assert_eq!(tenant.checked, 3);
    assert_eq!(tenant.sent, 1);
    assert_eq!(tenant.skipped, 2);
    assert!(tenant.errors.is_empty());
    let events = integrations.meta.received();
    assert_eq!(events.len(), 1);
    // Listed orders carry no line items. They are fetched from the source.
    assert_eq!(events[0].items.len(), 1);
    assert_eq!(events[0].items[0].sku.as_deref(), Some("GIN-70"));

    let summary = run_poll_cycle(&api, 10).await;
    let tenant = summary.tenant(SHOP).unwrap();
    assert_eq!(tenant.sent, 0);
    assert_eq!(tenant.duplicates, 1);
    assert_eq!(integrations.meta.call_count(), 1);
}

#[actix_web::test]
async fn poller_and_webhook_deliver_once() {
    let integrations = TestIntegrations::accepting().with_orders(vec![paid_order_without_items("1001")]);
    let api = test_api(MemoryStore::new(), integrations.clone());
    send(&api, post_json("/webhook?shop=vikginchoice", &webhook_body("1001"))).await;
    let summary = run_poll_cycle(&api, 10).await;
    assert_eq!(summary.tenant(SHOP).unwrap().duplicates, 1);
    assert_eq!(summary.total_sent(), 0);
    assert_eq!(integrations.meta.call_count(), 1);
    assert_eq!(integrations.ga4.call_count(), 1);
}

#[actix_web::test]
async fn tenant_failures_are_contained() {
    let _ = env_logger::try_init();
    let mut integrations = TestIntegrations::accepting().with_orders(vec![paid_order_without_items("3001")]);
    integrations.failing_shops = vec!["retoertje".parse().unwrap()];
    let mut broken = shop_config("brokenshop");
    broken.meta.pixel_id = String::new();
    let registry = ShopRegistry::new(vec![shop_config(SHOP), shop_config("retoertje"), broken]);
    let api = BridgeApi::new(MemoryStore::new(), registry, integrations.clone(), LedgerConfig::default());

    let summary = run_poll_cycle(&api, 10).await;
    assert_eq!(summary.tenants.len(), 3);
    let healthy = summary.tenant(SHOP).unwrap();
    assert_eq!(healthy.sent, 1);
    assert!(healthy.errors.is_empty());
    let failing = summary.tenant("retoertje").unwrap();
    assert_eq!(failing.checked, 0);
    assert!(failing.errors[0].contains("credentials"));
    let misconfigured = summary.tenant("brokenshop").unwrap();
    assert!(misconfigured.errors[0].contains("BROKENSHOP_META_PIXEL_ID"));
    assert_eq!(integrations.meta.call_count(), 1);
}
