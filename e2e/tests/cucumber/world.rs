use std::sync::mpsc::channel;

use actix_web::dev::ServerHandle;
use capi_bridge_server::{
    bridge_api::BridgeApi,
    config::{PollConfig, ServerConfig, ShopRegistry},
    server::create_server_instance,
};
use conversion_engine::SqliteStore;
use cucumber::World;
use e2e::{
    helpers::{e2e_shop_config, random_db_url},
    integrations::E2eIntegrations,
};
use log::*;
use reqwest::{Client, Method, RequestBuilder, StatusCode};

pub type E2eApi = BridgeApi<SqliteStore, E2eIntegrations>;

#[derive(Debug, World)]
pub struct BridgeWorld {
    pub config: ServerConfig,
    pub integrations: E2eIntegrations,
    pub store: Option<SqliteStore>,
    pub api: Option<E2eApi>,
    pub server_handle: Option<ServerHandle>,
    pub response: Option<(StatusCode, String)>,
}

impl Default for BridgeWorld {
    fn default() -> Self {
        let _ = env_logger::try_init();
        let config = ServerConfig {
            port: 20000 + rand::random::<u16>() % 10_000,
            database_url: random_db_url(),
            poll: PollConfig { enabled: false, ..Default::default() },
            shops: vec![e2e_shop_config().id],
            ..ServerConfig::new("127.0.0.1", 0)
        };
        Self {
            config,
            integrations: E2eIntegrations::default(),
            store: None,
            api: None,
            server_handle: None,
            response: None,
        }
    }
}

impl BridgeWorld {
    /// Opens a fresh, migrated store and starts the HTTP server on top of it. The poller is not started; scenarios
    /// run poll cycles explicitly against [`BridgeWorld::api`].
    pub async fn start_server(&mut self) {
        let store = SqliteStore::new_with_url(&self.config.database_url, 5).await.expect("Error opening the store");
        store.migrate().await.expect("Error migrating the store");
        debug!("🌍️ Created store: {}", store.url());
        let registry = ShopRegistry::new(vec![e2e_shop_config()]);
        let api = BridgeApi::new(store.clone(), registry, self.integrations.clone(), self.config.ledger);
        let config = self.config.clone();
        let server_api = api.clone();
        info!("🌍️ Starting bridge on {}:{}", config.host, config.port);
        let (tx, rx) = channel();
        tokio::spawn(async move {
            let srv = create_server_instance(config, server_api).expect("Error creating server instance");
            let _res = tx.send(srv.handle());
            match srv.await {
                Ok(_) => info!("🌍️ Server shut down"),
                Err(e) => warn!("🌍️ Server error: {e}"),
            }
        });
        let handle = rx.recv().expect("Server did not start");
        info!("🌍️ Server started");
        self.store = Some(store);
        self.api = Some(api);
        self.server_handle = Some(handle);
    }

    pub fn api(&self) -> &E2eApi {
        self.api.as_ref().expect("Server not started")
    }

    pub async fn stop(&mut self) {
        if let Some(h) = self.server_handle.take() {
            info!("🌍️ Stopping server");
            h.stop(true).await;
        }
        if let Some(store) = self.store.take() {
            store.close().await;
        }
    }

    pub async fn post_json(&self, path: &str, body: String) -> (StatusCode, String) {
        self.request(Method::POST, path, |req| req.header("Content-Type", "application/json").body(body)).await
    }

    pub async fn request<F>(&self, method: Method, path: &str, req: F) -> (StatusCode, String)
    where F: FnOnce(RequestBuilder) -> RequestBuilder {
        let url = format!("http://{}:{}{path}", self.config.host, self.config.port);
        debug!("🌍️ Querying {url}");
        let request = req(Client::new().request(method, url));
        let res = request.send().await.expect("Error getting response");
        let code = res.status();
        let body = res.text().await.expect("Error reading response body");
        (code, body)
    }
}
