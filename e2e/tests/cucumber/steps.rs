use std::time::Duration;

use capi_bridge_server::poll_worker::run_poll_cycle;
use conversion_engine::{
    db_types::DestinationKind,
    test_utils::{fixtures::paid_order_without_items, stubs::StubBehaviour},
};
use cucumber::{gherkin::Step, given, then, when};
use e2e::helpers::{json_is_subset_of, lightspeed_order_json, E2E_SHOP};
use log::*;
use reqwest::Method;
use serde_json::json;

use crate::cucumber::BridgeWorld;

const POLL_LOOKBACK_MINUTES: u64 = 10;

fn destination(name: &str) -> DestinationKind {
    match name {
        "Meta" => DestinationKind::MetaCapi,
        "GA4" => DestinationKind::Ga4,
        _ => panic!("Unknown destination {name}"),
    }
}

fn payment_status(paid: &str) -> &'static str {
    match paid {
        "paid" => "paid",
        _ => "not_paid",
    }
}

// ------------------------------------------------  Set-up  ----------------------------------------------------------

#[given("a running bridge")]
async fn running_bridge(world: &mut BridgeWorld) {
    world.start_server().await;
}

#[given(expr = "{word} is down")]
fn destination_is_down(world: &mut BridgeWorld, name: String) {
    world.integrations.set_behaviour(destination(&name), StubBehaviour::Reject);
}

#[given("the destinations respond slowly")]
fn destinations_are_slow(world: &mut BridgeWorld) {
    world.integrations.slow_down(Duration::from_millis(300));
}

#[given(expr = "Lightspeed lists paid order {word}")]
fn lightspeed_lists_order(world: &mut BridgeWorld, number: String) {
    world.integrations.list_order(paid_order_without_items(&number));
}

// ------------------------------------------------  Requests  --------------------------------------------------------

#[then("the bridge is healthy")]
async fn bridge_is_healthy(world: &mut BridgeWorld) {
    let (code, body) = world.request(Method::GET, "/health", |req| req).await;
    assert_eq!(code.as_u16(), 200);
    assert!(json_is_subset_of(r#"{"status": "ok"}"#, &body), "Unexpected health response: {body}");
}

#[when(expr = "Lightspeed posts the webhook for {word} order {word}")]
async fn post_webhook(world: &mut BridgeWorld, paid: String, number: String) {
    let body = lightspeed_order_json(&number, payment_status(&paid)).to_string();
    let res = world.post_json(&format!("/webhook?shop={E2E_SHOP}"), body).await;
    debug!("Got Response: {} {}", res.0, res.1);
    world.response = Some(res);
}

#[when(expr = "Lightspeed posts the webhook for {word} order {word} to shop {string}")]
async fn post_webhook_to_shop(world: &mut BridgeWorld, paid: String, number: String, shop: String) {
    let body = lightspeed_order_json(&number, payment_status(&paid)).to_string();
    let res = world
        .request(Method::POST, "/webhook", |req| {
            req.header("Content-Type", "application/json").header("X-Shop-Id", shop).body(body)
        })
        .await;
    world.response = Some(res);
}

#[when(expr = "the thank-you page posts pixel data for order {word} with fbc {string}")]
async fn post_pixel_data(world: &mut BridgeWorld, number: String, fbc: String) {
    let body = json!({
        "shop": E2E_SHOP,
        "order_id": number,
        "fbc": fbc,
        "fbp": "fb.1.1717232000000.123456789",
        "ga_client_id": "1234567890.1717232000",
        "page_url": "https://vikginchoice.example/checkout/thankyou"
    });
    let res = world
        .request(Method::POST, "/pixel-data", |req| {
            req.header("Content-Type", "application/json").header("User-Agent", "Mozilla/5.0 (e2e)").body(body.to_string())
        })
        .await;
    world.response = Some(res);
}

#[when(expr = "the thank-you page posts the pixel data:")]
async fn post_raw_pixel_data(world: &mut BridgeWorld, step: &Step) {
    let body = step.docstring().expect("No pixel data given").to_string();
    let res = world.post_json("/pixel-data", body).await;
    world.response = Some(res);
}

#[when("the poller runs")]
async fn poller_runs(world: &mut BridgeWorld) {
    let summary = run_poll_cycle(world.api(), POLL_LOOKBACK_MINUTES).await;
    info!("Poll complete: {:?}", summary.tenants);
    let tenant = summary.tenant(E2E_SHOP).expect("The poll did not cover the shop").clone();
    world.response = Some((reqwest::StatusCode::OK, serde_json::to_string(&tenant).unwrap_or_default()));
}

#[when(expr = "Lightspeed posts the webhook for paid order {word} while the poller runs")]
async fn webhook_races_poller(world: &mut BridgeWorld, number: String) {
    let body = lightspeed_order_json(&number, "paid").to_string();
    let path = format!("/webhook?shop={E2E_SHOP}");
    let webhook = world.post_json(&path, body);
    let poll = run_poll_cycle(world.api(), POLL_LOOKBACK_MINUTES);
    let ((code, body), summary) = futures::join!(webhook, poll);
    debug!("Webhook: {code} {body}");
    let tenant = summary.tenant(E2E_SHOP).expect("The poll did not cover the shop");
    debug!("Poll: {tenant}");
    assert_eq!(code.as_u16(), 200, "Webhook failed: {body}");
    assert!(tenant.errors.is_empty(), "Poll failed: {tenant}");
}

// ------------------------------------------------  Checks  ----------------------------------------------------------

#[then(expr = "I receive a {int} response with status {string}")]
async fn receive_status(world: &mut BridgeWorld, status: u16, delivery: String) {
    let (res_status, body) = world.response.take().expect("No response received");
    assert_eq!(res_status, status, "Expected a {status} response, got {res_status}: {body}");
    let expected = json!({ "status": delivery }).to_string();
    assert!(json_is_subset_of(&expected, &body), "Expected status '{delivery}', got '{body}'");
}

#[then(expr = "I receive a {int} response with the message {string}")]
async fn receive_message(world: &mut BridgeWorld, status: u16, message: String) {
    let (res_status, body) = world.response.take().expect("No response received");
    assert_eq!(res_status, status, "Expected a {status} response, got {res_status}: {body}");
    assert!(body.contains(&message), "Expected response to contain '{message}', got '{body}'");
}

#[then(expr = "I receive a partial JSON response:")]
async fn receive_json_response(world: &mut BridgeWorld, step: &Step) {
    let (_status, body) = world.response.take().expect("No response received");
    let expected = step.docstring().expect("No expected response");
    assert!(json_is_subset_of(expected, &body), "Expected response to be '{expected}', got '{body}'");
}

#[then(expr = "{word} has received {int} purchase event(s) for order {word}")]
async fn destination_received(world: &mut BridgeWorld, name: String, count: usize, number: String) {
    let events = world.integrations.received_for(destination(&name), &number);
    assert_eq!(events.len(), count, "{name} received {} events for order {number}", events.len());
    for event in &events {
        assert_eq!(event.event_id, format!("purchase_{number}"));
    }
}

#[then(expr = "the last Meta event carries fbc {string}")]
async fn meta_event_fbc(world: &mut BridgeWorld, fbc: String) {
    let events = world.integrations.received(DestinationKind::MetaCapi);
    let event = events.last().expect("Meta received nothing");
    assert_eq!(event.attribution.fbc.as_deref(), Some(fbc.as_str()));
}

#[then(expr = "the poll reports {int} sent and {int} duplicate(s)")]
async fn poll_reports(world: &mut BridgeWorld, sent: usize, duplicates: usize) {
    let (_status, body) = world.response.take().expect("The poller has not run");
    let expected = json!({ "shop": E2E_SHOP, "sent": sent, "duplicates": duplicates, "errors": [] }).to_string();
    assert!(json_is_subset_of(&expected, &body), "Expected {expected}, got {body}");
}
