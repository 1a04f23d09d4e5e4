//! Request handler definitions
//!
//! Define each route and its handler here. Handlers that are more than a screen long belong in their own module.
//!
//! Handlers never block. Every store, platform and destination call is awaited, so a slow Meta response only holds
//! up its own request.
use actix_web::{get, http::header, options, web, HttpRequest, HttpResponse, Responder};
use conversion_engine::{
    db_types::{AttributionRecord, DeliverySource, OrderNumber},
    traits::KeyValueStore,
};
use log::*;
use serde_json::{json, Value};

use crate::{
    bridge_api::BridgeApi,
    config::ProxyConfig,
    data_objects::{CapturedFields, LegacyAttributionFields, PixelDataRequest, PixelDataResponse, WebhookResponse},
    errors::ServerError,
    helpers::{get_remote_ip, resolve_shop_id, user_agent, ShopQuery},
    integrations::{lightspeed::order_from_webhook_body, Integrations},
};

// actix-web cannot handle generics in handlers, so routes with generic backends are registered with the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().json(json!({ "status": "ok", "service": env!("CARGO_PKG_NAME"), "version": env!("CARGO_PKG_VERSION") }))
}

/// Everything that isn't a known route.
pub async fn not_found(req: HttpRequest) -> Result<HttpResponse, ServerError> {
    debug!("💻️ No route for {} {}", req.method(), req.path());
    Err(ServerError::NoRecordFound(format!("Unknown endpoint: {}", req.path())))
}

// ----------------------------------------------   CORS preflight  ----------------------------------------------
fn preflight() -> HttpResponse {
    HttpResponse::NoContent()
        .insert_header((header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"))
        .insert_header((header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type, X-Shop-Id"))
        .insert_header((header::ACCESS_CONTROL_MAX_AGE, "86400"))
        .finish()
}

#[options("/webhook")]
pub async fn webhook_preflight() -> HttpResponse {
    preflight()
}

#[options("/pixel-data")]
pub async fn pixel_data_preflight() -> HttpResponse {
    preflight()
}

//----------------------------------------------   Webhook  ----------------------------------------------------
route!(webhook => Post "/webhook" impl KeyValueStore, Integrations);
/// Lightspeed's `orders/created` (and `orders/paid`) webhook.
///
/// The shop comes from the `shop` query parameter or the `X-Shop-Id` header. The body is the order, bare or wrapped
/// in `{"order": {...}}`. Older thank-you page scripts also put `fbc`, `fbp`, `client_user_agent` and
/// `event_source_url` next to the order; those only fill gaps left by the staged attribution.
///
/// Responds with 200 whenever the outcome is final (delivered, partially delivered, duplicate or skipped), and with
/// 502 when no destination accepted the event, so that Lightspeed retries.
pub async fn webhook<S, I>(
    req: HttpRequest,
    query: web::Query<ShopQuery>,
    body: web::Bytes,
    api: web::Data<BridgeApi<S, I>>,
    proxy: web::Data<ProxyConfig>,
) -> Result<HttpResponse, ServerError>
where
    S: KeyValueStore,
    I: Integrations,
{
    trace!("💻️ Received webhook request: {}", req.uri());
    let shop = resolve_shop_id(&req, &query, None)?;
    let orchestrator = api.orchestrator(&shop)?;
    let body = serde_json::from_slice::<Value>(&body).map_err(|e| {
        debug!("💻️ Webhook body for shop {shop} is not valid JSON. {e}");
        ServerError::InvalidRequestBody(e.to_string())
    })?;
    let order = order_from_webhook_body(&body).map_err(|e| {
        debug!("💻️ Could not read the order in the webhook for shop {shop}. {e}");
        e
    })?;
    let legacy = LegacyAttributionFields::from_body(&body);
    let request = AttributionRecord {
        fbc: legacy.fbc,
        fbp: legacy.fbp,
        client_ip_address: get_remote_ip(&req, &proxy).map(|ip| ip.to_string()),
        client_user_agent: legacy.client_user_agent.or_else(|| user_agent(&req)),
        event_source_url: legacy.event_source_url,
        ..Default::default()
    };
    info!("💻️ Webhook for order {} of shop {shop}", order.number);
    let outcome = orchestrator.deliver(order, request, DeliverySource::Webhook).await;
    let response = WebhookResponse::from(outcome);
    Ok(HttpResponse::build(response.http_status()).json(response))
}

//----------------------------------------------   Pixel data  ----------------------------------------------------
route!(pixel_data => Post "/pixel-data" impl KeyValueStore, Integrations);
/// The attribution beacon sent by the thank-you page.
///
/// Stages the browser's click ids, GA client id and page for the order so that the webhook or the poller can attach
/// them to the purchase event. The client IP is taken from the request, never from the body.
///
/// A store that is down is not the browser's problem: the response is still 200, with `stored: false`.
pub async fn pixel_data<S, I>(
    req: HttpRequest,
    query: web::Query<ShopQuery>,
    body: web::Bytes,
    api: web::Data<BridgeApi<S, I>>,
    proxy: web::Data<ProxyConfig>,
) -> Result<HttpResponse, ServerError>
where
    S: KeyValueStore,
    I: Integrations,
{
    trace!("💻️ Received pixel data: {}", req.uri());
    let request = serde_json::from_slice::<PixelDataRequest>(&body).map_err(|e| {
        debug!("💻️ Pixel data is not valid JSON. {e}");
        ServerError::InvalidRequestBody(e.to_string())
    })?;
    let shop = resolve_shop_id(&req, &query, request.shop.as_deref())?;
    let stage = api.attribution_stage(&shop)?;
    let order_id = request
        .order_id
        .clone()
        .map(OrderNumber::from)
        .ok_or_else(|| ServerError::InvalidRequestBody("Pixel data must contain an order_id".to_string()))?;
    let client_ip = get_remote_ip(&req, &proxy).map(|ip| ip.to_string());
    let record = request.into_attribution(client_ip, user_agent(&req));
    let captured = CapturedFields::from(&record);
    let write = stage.put(&order_id, &record).await?;
    let stored = write.is_stored();
    let message = if stored {
        "Pixel data stored successfully".to_string()
    } else {
        "Pixel data could not be stored right now. The order will be reported without it.".to_string()
    };
    debug!("💻️ Pixel data for order {order_id} of shop {shop}: stored: {stored}, {captured:?}");
    Ok(HttpResponse::Ok().json(PixelDataResponse { success: true, stored, shop, order_id, captured, message }))
}
