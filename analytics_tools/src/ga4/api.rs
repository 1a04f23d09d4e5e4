use std::time::Duration;

use log::*;
use reqwest::{Client, StatusCode};

use crate::{
    ga4::{config::Ga4Config, data_objects::Ga4Payload},
    AnalyticsApiError,
};

pub const GA4_COLLECT_URL: &str = "https://www.google-analytics.com/mp/collect";

#[derive(Clone)]
pub struct Ga4Api {
    config: Ga4Config,
    client: Client,
    collect_url: String,
}

impl Ga4Api {
    pub fn new(config: Ga4Config, timeout: Duration) -> Result<Self, AnalyticsApiError> {
        let client =
            Client::builder().timeout(timeout).build().map_err(|e| AnalyticsApiError::Initialization(e.to_string()))?;
        Ok(Self::new_with_client(config, client))
    }

    pub fn new_with_client(config: Ga4Config, client: Client) -> Self {
        Self { config, client, collect_url: GA4_COLLECT_URL.to_string() }
    }

    /// Point the client at a different collection endpoint. Used for testing.
    pub fn with_collect_url(mut self, url: &str) -> Self {
        self.collect_url = url.to_string();
        self
    }

    pub fn config(&self) -> &Ga4Config {
        &self.config
    }

    /// Sends the payload. The Measurement Protocol answers every accepted hit with `204 No Content`; anything else is
    /// treated as a rejection.
    pub async fn collect(&self, payload: &Ga4Payload) -> Result<(), AnalyticsApiError> {
        if !self.config.is_configured() {
            return Err(AnalyticsApiError::NotConfigured("GA4 Measurement Protocol".to_string()));
        }
        let params = [
            ("measurement_id", self.config.measurement_id.as_str()),
            ("api_secret", self.config.api_secret.reveal().as_str()),
        ];
        trace!("📣️ Sending GA4 hit for measurement id {}", self.config.measurement_id);
        let response = self
            .client
            .post(&self.collect_url)
            .query(&params)
            .json(payload)
            .send()
            .await
            .map_err(|e| AnalyticsApiError::RequestError(e.to_string()))?;
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            debug!("📣️ GA4 accepted the hit for client {}", payload.client_id);
            Ok(())
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(AnalyticsApiError::UnexpectedStatus { status: status.as_u16(), message })
        }
    }
}
