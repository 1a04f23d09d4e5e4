//! The safety net for missed webhooks.
//!
//! Every poll interval, each tenant's recently created orders are listed and run through the same delivery as the
//! webhook. The dedup ledger turns orders the webhook already handled into cheap duplicates.
use std::fmt::Display;

use bridge_common::ShopId;
use chrono::{DateTime, Utc};
use conversion_engine::{
    db_types::{AttributionRecord, DeliverySource},
    traits::{KeyValueStore, OrderSource},
    DeliveryOutcome,
    DeliveryStatus,
};
use futures::future::join_all;
use log::*;
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::{bridge_api::BridgeApi, config::PollConfig, integrations::Integrations};

#[derive(Debug, Clone, Default, Serialize)]
pub struct TenantPollSummary {
    pub shop: String,
    pub checked: usize,
    pub sent: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

impl TenantPollSummary {
    fn new(shop: &ShopId) -> Self {
        Self { shop: shop.to_string(), ..Default::default() }
    }

    fn record(&mut self, outcome: &DeliveryOutcome) {
        match outcome.status {
            DeliveryStatus::Delivered | DeliveryStatus::PartiallyDelivered => self.sent += 1,
            DeliveryStatus::Duplicate => self.duplicates += 1,
            DeliveryStatus::Skipped { .. } => self.skipped += 1,
            DeliveryStatus::Failed => {
                self.failed += 1;
                self.errors.push(outcome.message());
            },
        }
    }
}

impl Display for TenantPollSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} checked, {} sent, {} duplicates, {} skipped, {} failed",
            self.shop, self.checked, self.sent, self.duplicates, self.skipped, self.failed
        )?;
        if !self.errors.is_empty() {
            write!(f, " ({})", self.errors.join("; "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PollSummary {
    pub started_at: DateTime<Utc>,
    pub tenants: Vec<TenantPollSummary>,
}

impl PollSummary {
    pub fn total_sent(&self) -> usize {
        self.tenants.iter().map(|t| t.sent).sum()
    }

    pub fn tenant(&self, shop: &str) -> Option<&TenantPollSummary> {
        self.tenants.iter().find(|t| t.shop == shop)
    }
}

/// Polls every tenant once, concurrently. A tenant that fails only shows up as errors in its own summary.
pub async fn run_poll_cycle<S, I>(api: &BridgeApi<S, I>, lookback_minutes: u64) -> PollSummary
where
    S: KeyValueStore,
    I: Integrations,
{
    let started_at = Utc::now();
    let shops = api.registry().shop_ids();
    let tenants = join_all(shops.iter().map(|shop| poll_tenant(api, shop, lookback_minutes))).await;
    PollSummary { started_at, tenants }
}

async fn poll_tenant<S, I>(api: &BridgeApi<S, I>, shop: &ShopId, lookback_minutes: u64) -> TenantPollSummary
where
    S: KeyValueStore,
    I: Integrations,
{
    let mut summary = TenantPollSummary::new(shop);
    let orchestrator = match api.orchestrator(shop) {
        Ok(o) => o,
        Err(e) => {
            warn!("🕰️ Not polling shop {shop}. {e}");
            summary.errors.push(e.to_string());
            return summary;
        },
    };
    let orders = match orchestrator.order_source().list_recent(lookback_minutes).await {
        Ok(orders) => orders,
        Err(e) => {
            warn!("🕰️ Could not list recent orders for shop {shop}. {e}");
            summary.errors.push(e.to_string());
            return summary;
        },
    };
    summary.checked = orders.len();
    trace!("🕰️ {} orders to check for shop {shop}", orders.len());
    for order in orders {
        let outcome = orchestrator.deliver(order, AttributionRecord::default(), DeliverySource::Poll).await;
        summary.record(&outcome);
    }
    summary
}

/// Starts the poll worker on the current actix runtime. Do not await the returned JoinHandle, as it will run
/// indefinitely. Each cycle runs to completion before the next tick is awaited.
pub fn start_poll_worker<S, I>(api: BridgeApi<S, I>, config: PollConfig) -> JoinHandle<()>
where
    S: KeyValueStore + 'static,
    I: Integrations + 'static,
{
    actix_web::rt::spawn(async move {
        let mut timer = tokio::time::interval(config.interval);
        info!(
            "🕰️ Order poller started. Polling every {}s, looking back {} minutes",
            config.interval.as_secs(),
            config.lookback_minutes
        );
        loop {
            timer.tick().await;
            debug!("🕰️ Running order poll");
            let summary = run_poll_cycle(&api, config.lookback_minutes).await;
            info!("🕰️ Order poll complete. {} purchase events sent", summary.total_sent());
            for tenant in &summary.tenants {
                if tenant.errors.is_empty() {
                    debug!("🕰️ {tenant}");
                } else {
                    warn!("🕰️ {tenant}");
                }
            }
        }
    })
}
