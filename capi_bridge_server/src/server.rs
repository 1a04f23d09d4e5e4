use std::time::Duration;

use actix_web::{
    dev::Server,
    http::KeepAlive,
    middleware::{DefaultHeaders, Logger},
    web,
    web::ServiceConfig,
    App,
    HttpServer,
};
use conversion_engine::{traits::KeyValueStore, SqliteStore};
use log::*;

use crate::{
    bridge_api::BridgeApi,
    config::{ServerConfig, ShopRegistry},
    errors::ServerError,
    expiry_worker::{start_expiry_worker, DEFAULT_EXPIRY_PERIOD},
    integrations::{Integrations, LiveIntegrations},
    poll_worker::start_poll_worker,
    routes::{health, not_found, pixel_data_preflight, webhook_preflight, PixelDataRoute, WebhookRoute},
};

const MAX_DB_CONNECTIONS: u32 = 25;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let store = SqliteStore::new_with_url(&config.database_url, MAX_DB_CONNECTIONS)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    store.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.shops.is_empty() {
        warn!("🪛️ No shops are configured. Set BRIDGE_SHOPS to a comma-separated list of shop ids.");
    }
    let registry = ShopRegistry::from_env(&config.shops);
    info!("🪛️ Serving {} shop(s): {:?}", registry.len(), registry.shop_ids());
    let integrations = LiveIntegrations::new(config.http_timeout)?;
    let api = BridgeApi::new(store.clone(), registry, integrations, config.ledger);

    let expiry_worker = start_expiry_worker(store.clone(), DEFAULT_EXPIRY_PERIOD);
    let poll_worker = if config.poll.enabled {
        Some(start_poll_worker(api.clone(), config.poll))
    } else {
        info!("🕰️ Order polling is disabled");
        None
    };

    let srv = create_server_instance(config, api)?;
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));
    if let Some(worker) = poll_worker {
        worker.abort();
    }
    expiry_worker.abort();
    store.close().await;
    result
}

pub fn create_server_instance<S, I>(config: ServerConfig, api: BridgeApi<S, I>) -> Result<Server, ServerError>
where
    S: KeyValueStore + Send + 'static,
    I: Integrations + Send + 'static,
{
    let proxy = config.proxy;
    let srv = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("bridge::access_log"))
            .wrap(cors_headers())
            .app_data(web::Data::new(api.clone()))
            .app_data(web::Data::new(proxy))
            .configure(configure_routes::<S, I>)
            .default_service(web::to(not_found))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Registers every route. The caller provides the `BridgeApi<S, I>` and `ProxyConfig` app data.
pub fn configure_routes<S, I>(cfg: &mut ServiceConfig)
where
    S: KeyValueStore + 'static,
    I: Integrations + 'static,
{
    cfg.service(health)
        .service(WebhookRoute::<S, I>::new())
        .service(PixelDataRoute::<S, I>::new())
        .service(webhook_preflight)
        .service(pixel_data_preflight);
}

/// Lets the thank-you page post to the bridge from the shop's own domain.
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new().add(("Access-Control-Allow-Origin", "*"))
}
