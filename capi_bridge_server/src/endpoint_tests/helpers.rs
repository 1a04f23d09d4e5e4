use std::sync::Arc;

use actix_web::{
    http::{header::HeaderMap, StatusCode},
    test,
    test::TestRequest,
    web,
    App,
};
use analytics_tools::{ga4::Ga4Config, meta::MetaConfig};
use bridge_common::{Secret, ShopId};
use conversion_engine::{
    db_types::{DestinationKind, LineItem, Order},
    test_utils::{
        fixtures::line_item,
        stubs::{RecordingDestination, StubBehaviour},
    },
    traits::{Destination, KeyValueStore, OrderSourceError},
    LedgerConfig,
};
use lightspeed_tools::LightspeedConfig;
use log::debug;
use serde_json::Value;

use super::mocks::MockOrderSource;
use crate::{
    bridge_api::BridgeApi,
    config::{ProxyConfig, ShopConfig, ShopRegistry},
    errors::ServerError,
    integrations::Integrations,
    routes::not_found,
    server::{configure_routes, cors_headers},
};

pub const SHOP: &str = "vikginchoice";

/// A tenant with every credential filled in. None of them are real.
pub fn shop_config(id: &str) -> ShopConfig {
    ShopConfig {
        id: id.parse().unwrap(),
        name: format!("Shop {id}"),
        domain: format!("{id}.example"),
        lightspeed: LightspeedConfig {
            cluster_url: "http://127.0.0.1:9".into(),
            language: "nl".into(),
            api_key: Secret::new("key".into()),
            api_secret: Secret::new("secret".into()),
            shop_id: "1234".into(),
        },
        meta: MetaConfig {
            access_token: Secret::new("token".into()),
            pixel_id: "999".into(),
            api_version: "v18.0".into(),
            enabled: true,
            test_event_code: None,
        },
        ga4: Ga4Config { measurement_id: "G-TEST".into(), api_secret: Secret::new("secret".into()), enabled: true },
    }
}

/// Recording destinations in place of Meta and GA4, and a mocked order source.
#[derive(Clone)]
pub struct TestIntegrations {
    pub meta: Arc<RecordingDestination>,
    pub ga4: Arc<RecordingDestination>,
    pub orders: Vec<Order>,
    pub line_items: Vec<LineItem>,
    /// Shops whose order listing fails.
    pub failing_shops: Vec<ShopId>,
}

impl TestIntegrations {
    pub fn new(meta: StubBehaviour, ga4: StubBehaviour) -> Self {
        Self {
            meta: Arc::new(RecordingDestination::new(DestinationKind::MetaCapi, meta)),
            ga4: Arc::new(RecordingDestination::new(DestinationKind::Ga4, ga4)),
            orders: Vec::new(),
            line_items: vec![line_item("GIN-70")],
            failing_shops: Vec::new(),
        }
    }

    pub fn accepting() -> Self {
        Self::new(StubBehaviour::Accept, StubBehaviour::Accept)
    }

    pub fn with_orders(mut self, orders: Vec<Order>) -> Self {
        self.orders = orders;
        self
    }
}

impl Integrations for TestIntegrations {
    type Source = MockOrderSource;

    fn order_source(&self, shop: &ShopConfig) -> Result<Self::Source, ServerError> {
        let mut source = MockOrderSource::new();
        let orders = self.orders.clone();
        let failing = self.failing_shops.contains(&shop.id);
        source.expect_list_recent().returning(move |_| {
            if failing {
                Err(OrderSourceError::Unauthorized("401 Unauthorized".into()))
            } else {
                Ok(orders.clone())
            }
        });
        let items = self.line_items.clone();
        source.expect_fetch_line_items().returning(move |_| Ok(items.clone()));
        Ok(source)
    }

    fn destinations(&self, _shop: &ShopConfig) -> Result<Vec<Arc<dyn Destination>>, ServerError> {
        let meta: Arc<dyn Destination> = self.meta.clone();
        let ga4: Arc<dyn Destination> = self.ga4.clone();
        Ok(vec![meta, ga4])
    }
}

pub fn test_api<S: KeyValueStore>(store: S, integrations: TestIntegrations) -> BridgeApi<S, TestIntegrations> {
    BridgeApi::new(store, ShopRegistry::new(vec![shop_config(SHOP)]), integrations, LedgerConfig::default())
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

/// Runs a single request through an app configured exactly like the server's.
pub async fn send<S: KeyValueStore + 'static>(api: &BridgeApi<S, TestIntegrations>, req: TestRequest) -> TestResponse {
    let _ = env_logger::try_init();
    let app = App::new()
        .wrap(cors_headers())
        .app_data(web::Data::new(api.clone()))
        .app_data(web::Data::new(ProxyConfig::default()))
        .configure(configure_routes::<S, TestIntegrations>)
        .default_service(web::to(not_found));
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let headers = res.headers().clone();
    let body = String::from_utf8_lossy(&test::read_body(res).await).into_owned();
    TestResponse { status, headers, body }
}

pub fn post_json(uri: &str, body: &str) -> TestRequest {
    TestRequest::post().uri(uri).insert_header(("Content-Type", "application/json")).set_payload(body.to_string())
}

/// A Lightspeed `orders/created` webhook body for a paid order with one product.
pub fn webhook_body(number: &str) -> String {
    serde_json::json!({
        "order": {
            "id": 55501,
            "number": number,
            "createdAt": "2024-06-01T11:15:00+02:00",
            "status": "processing_awaiting_shipment",
            "paymentStatus": "paid",
            "currency": "EUR",
            "priceIncl": "59.95",
            "email": "Jane.Doe@Example.com",
            "firstname": "Jane",
            "lastname": "Doe",
            "phone": "+31 6 12345678",
            "addressBillingCity": "Amsterdam",
            "addressBillingZipcode": "1011 AB",
            "addressBillingCountry": { "code": "nl" },
            "products": [
                { "id": 1, "articleCode": "GIN-70", "productTitle": "Gin", "quantityOrdered": 1,
                  "basePriceIncl": 55.0, "variant": { "resource": { "id": 777 } } }
            ]
        }
    })
    .to_string()
}
