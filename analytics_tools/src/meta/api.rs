use std::time::Duration;

use log::*;
use reqwest::Client;

use crate::{
    meta::{
        config::MetaConfig,
        data_objects::{MetaErrorResponse, MetaEvent, MetaEventsRequest, MetaEventsResponse},
    },
    AnalyticsApiError,
};

pub const GRAPH_API_URL: &str = "https://graph.facebook.com";

#[derive(Clone)]
pub struct MetaCapiApi {
    config: MetaConfig,
    client: Client,
    base_url: String,
}

impl MetaCapiApi {
    pub fn new(config: MetaConfig, timeout: Duration) -> Result<Self, AnalyticsApiError> {
        let client =
            Client::builder().timeout(timeout).build().map_err(|e| AnalyticsApiError::Initialization(e.to_string()))?;
        Ok(Self::new_with_client(config, client))
    }

    pub fn new_with_client(config: MetaConfig, client: Client) -> Self {
        Self { config, client, base_url: GRAPH_API_URL.to_string() }
    }

    /// Point the client at a different Graph API host. Used for testing.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn config(&self) -> &MetaConfig {
        &self.config
    }

    pub fn url(&self) -> String {
        format!("{}/{}/{}/events", self.base_url, self.config.api_version, self.config.pixel_id)
    }

    pub fn build_request(&self, events: Vec<MetaEvent>) -> MetaEventsRequest {
        MetaEventsRequest {
            data: events,
            access_token: self.config.access_token.reveal().clone(),
            test_event_code: self.config.test_event_code.clone(),
        }
    }

    /// Submits the events. Any non-2xx status is an error, carrying Meta's own error message when there is one.
    pub async fn send_events(&self, events: Vec<MetaEvent>) -> Result<MetaEventsResponse, AnalyticsApiError> {
        if !self.config.is_configured() {
            return Err(AnalyticsApiError::NotConfigured("Meta Conversions API".to_string()));
        }
        let count = events.len();
        let request = self.build_request(events);
        trace!("📣️ Sending {count} events to Meta pixel {}", self.config.pixel_id);
        let response = self
            .client
            .post(self.url())
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalyticsApiError::RequestError(e.to_string()))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| AnalyticsApiError::RequestError(e.to_string()))?;
        if status.is_success() {
            let result = serde_json::from_str::<MetaEventsResponse>(&body)
                .map_err(|e| AnalyticsApiError::JsonError(format!("{e}. Body: {body}")))?;
            debug!(
                "📣️ Meta accepted {} events. fbtrace_id: {}",
                result.events_received,
                result.fbtrace_id.as_deref().unwrap_or("none")
            );
            Ok(result)
        } else {
            let message = serde_json::from_str::<MetaErrorResponse>(&body)
                .map(|e| match e.error.fbtrace_id {
                    Some(trace) => format!("{} (fbtrace_id: {trace})", e.error.message),
                    None => e.error.message,
                })
                .unwrap_or(body);
            Err(AnalyticsApiError::QueryError { status: status.as_u16(), message })
        }
    }
}
