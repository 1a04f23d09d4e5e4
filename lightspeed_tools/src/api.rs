use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde::{de::DeserializeOwned, Deserialize};

use crate::{config::LightspeedConfig, LightspeedApiError, LightspeedOrder, LightspeedOrderProduct};

/// Lightspeed caps list endpoints at 250, but a single poll window never comes close to that.
pub const MAX_ORDERS_PER_PAGE: u32 = 50;

#[derive(Clone)]
pub struct LightspeedApi {
    config: LightspeedConfig,
    client: Client,
}

impl LightspeedApi {
    pub fn new(config: LightspeedConfig, timeout: Duration) -> Result<Self, LightspeedApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| LightspeedApiError::Initialization(e.to_string()))?;
        Ok(Self::new_with_client(config, client))
    }

    /// Re-use an existing connection pool. `reqwest::Client` is reference counted, so this is cheap.
    pub fn new_with_client(config: LightspeedConfig, client: Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &LightspeedConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}{path}", self.config.cluster_url.trim_end_matches('/'), self.config.language)
    }

    pub async fn rest_query<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, LightspeedApiError> {
        let url = self.url(path);
        trace!("🛒️ Sending REST query: {url}");
        let mut req = self
            .client
            .get(url)
            .basic_auth(self.config.api_key.reveal(), Some(self.config.api_secret.reveal()));
        if !params.is_empty() {
            req = req.query(params);
        }
        let response = req.send().await.map_err(|e| LightspeedApiError::RestRequestError(e.to_string()))?;
        if response.status().is_success() {
            trace!("🛒️ REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| LightspeedApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| LightspeedApiError::RestResponseError(e.to_string()))?;
            Err(LightspeedApiError::QueryError { status, message })
        }
    }

    /// Fetches the orders created at or after `since`, with the customer record embedded.
    pub async fn fetch_recent_orders(
        &self,
        since: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<LightspeedOrder>, LightspeedApiError> {
        #[derive(Deserialize)]
        struct OrdersResponse {
            #[serde(default)]
            orders: Vec<LightspeedOrder>,
        }
        let since = since.to_rfc3339_opts(SecondsFormat::Secs, true);
        let params = [
            ("createdAtMin", since.clone()),
            ("limit", limit.min(MAX_ORDERS_PER_PAGE).to_string()),
            ("embed", "customer".to_string()),
        ];
        debug!("🛒️ Fetching orders created since {since}");
        let result = self.rest_query::<OrdersResponse>("/orders.json", &params).await?;
        info!("🛒️ Fetched {} orders created since {since}", result.orders.len());
        Ok(result.orders)
    }

    pub async fn fetch_order(&self, order_id: &str) -> Result<LightspeedOrder, LightspeedApiError> {
        #[derive(Deserialize)]
        struct OrderResponse {
            order: LightspeedOrder,
        }
        let path = format!("/orders/{order_id}.json");
        debug!("🛒️ Fetching order #{order_id}");
        let result = self.rest_query::<OrderResponse>(&path, &[]).await?;
        Ok(result.order)
    }

    pub async fn fetch_order_products(&self, order_id: &str) -> Result<Vec<LightspeedOrderProduct>, LightspeedApiError> {
        #[derive(Deserialize)]
        struct ProductsResponse {
            #[serde(default, rename = "orderProducts")]
            order_products: Vec<LightspeedOrderProduct>,
        }
        let path = format!("/orders/{order_id}/products.json");
        debug!("🛒️ Fetching products for order #{order_id}");
        let result = self.rest_query::<ProductsResponse>(&path, &[]).await?;
        trace!("🛒️ Order #{order_id} has {} products", result.order_products.len());
        Ok(result.order_products)
    }
}
