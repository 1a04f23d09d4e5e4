use std::sync::Arc;

use bridge_common::ShopId;
use futures::future::join_all;
use log::*;

use crate::{
    attribution::AttributionStage,
    db_types::{AttributionRecord, DeliverySource, Order, OrderNumber, PurchaseEvent},
    delivery::{
        event::{build_purchase_event, event_id_for},
        outcome::{synthesize_status, DeliveryOutcome, DeliveryStatus, DestinationReport, DestinationResult},
    },
    ledger::{DedupLedger, LedgerConfig},
    traits::{Destination, KeyValueStore, OrderSource},
};

/// Where a delivery attempt currently stands. Each variant carries exactly what the next step needs.
#[derive(Debug)]
pub enum DeliveryState {
    Received { order: Order, request: AttributionRecord },
    Eligible { order: Order, request: AttributionRecord },
    /// Passed the idempotency gate. `reserved` is false when the ledger could not be reached and we carried on
    /// without a reservation.
    Gated { order: Order, request: AttributionRecord, reserved: bool },
    Merged { order: Order, attribution: AttributionRecord, reserved: bool },
    /// Line items are present.
    Completed { order: Order, attribution: AttributionRecord, reserved: bool },
    Dispatched { event: PurchaseEvent, reports: Vec<DestinationReport>, reserved: bool },
    Done(DeliveryOutcome),
}

impl DeliveryState {
    pub fn name(&self) -> &'static str {
        match self {
            DeliveryState::Received { .. } => "received",
            DeliveryState::Eligible { .. } => "eligible",
            DeliveryState::Gated { .. } => "gated",
            DeliveryState::Merged { .. } => "merged",
            DeliveryState::Completed { .. } => "completed",
            DeliveryState::Dispatched { .. } => "dispatched",
            DeliveryState::Done(_) => "done",
        }
    }
}

pub enum Step {
    Continue(DeliveryState),
    Halt(DeliveryOutcome),
}

/// Why an order is not eligible for a purchase event, if it isn't.
pub fn ineligibility_reason(order: &Order) -> Option<String> {
    if order.customer.email().is_none() {
        return Some("order has no customer email".to_string());
    }
    if !order.payment_status.is_paid() {
        return Some(format!("order is not paid (payment status: {})", order.payment_status));
    }
    None
}

/// Runs purchase deliveries for one tenant.
///
/// A delivery walks through [`DeliveryState`] one step at a time: eligibility, the idempotency gate, attribution
/// merge, line-item completion, fan-out to the destinations and finally the ledger commit. Any step may halt with an
/// outcome. `deliver` never fails; every error is folded into the [`DeliveryOutcome`].
pub struct DeliveryOrchestrator<S, O> {
    shop: ShopId,
    ledger: DedupLedger<S>,
    attribution: AttributionStage<S>,
    source: O,
    destinations: Vec<Arc<dyn Destination>>,
}

impl<S, O> DeliveryOrchestrator<S, O>
where
    S: KeyValueStore,
    O: OrderSource,
{
    pub fn new(
        shop: ShopId,
        store: S,
        config: &LedgerConfig,
        source: O,
        destinations: Vec<Arc<dyn Destination>>,
    ) -> Self {
        let ledger = DedupLedger::new(shop.clone(), store.clone(), config);
        let attribution = AttributionStage::new(shop.clone(), store, config.attribution_ttl);
        Self { shop, ledger, attribution, source, destinations }
    }

    pub fn shop(&self) -> &ShopId {
        &self.shop
    }

    pub fn ledger(&self) -> &DedupLedger<S> {
        &self.ledger
    }

    pub fn attribution(&self) -> &AttributionStage<S> {
        &self.attribution
    }

    pub fn order_source(&self) -> &O {
        &self.source
    }

    /// Delivers a purchase event for the order to every destination, at most once per order while the ledger
    /// remembers it. `request` holds attribution derived from the triggering request; stored attribution takes
    /// precedence over it.
    pub async fn deliver(&self, order: Order, request: AttributionRecord, source: DeliverySource) -> DeliveryOutcome {
        let number = order.number.clone();
        debug!("📦️ Delivery of order {number} for shop {} triggered by {source}", self.shop);
        let mut state = DeliveryState::Received { order, request };
        loop {
            trace!("📦️ Order {number} is {}", state.name());
            let step = match state {
                DeliveryState::Received { order, request } => self.check_eligibility(order, request),
                DeliveryState::Eligible { order, request } => self.pass_gate(order, request, source).await,
                DeliveryState::Gated { order, request, reserved } => {
                    self.merge_attribution(order, request, reserved).await
                },
                DeliveryState::Merged { order, attribution, reserved } => {
                    self.complete_line_items(order, attribution, reserved).await
                },
                DeliveryState::Completed { order, attribution, reserved } => {
                    self.dispatch(order, attribution, reserved).await
                },
                DeliveryState::Dispatched { event, reports, reserved } => {
                    self.commit(event, reports, reserved, source).await
                },
                DeliveryState::Done(outcome) => return outcome,
            };
            state = match step {
                Step::Continue(next) => next,
                Step::Halt(outcome) => DeliveryState::Done(outcome),
            };
        }
    }

    fn check_eligibility(&self, order: Order, request: AttributionRecord) -> Step {
        match ineligibility_reason(&order) {
            Some(reason) => {
                info!("📦️ Skipping order {} for shop {}: {reason}", order.number, self.shop);
                Step::Halt(self.halted(&order.number, DeliveryStatus::Skipped { reason }))
            },
            None => Step::Continue(DeliveryState::Eligible { order, request }),
        }
    }

    async fn pass_gate(&self, order: Order, request: AttributionRecord, source: DeliverySource) -> Step {
        match self.ledger.has(&order.number).await {
            Ok(true) => {
                info!("📦️ Order {} for shop {} was already processed", order.number, self.shop);
                return Step::Halt(self.halted(&order.number, DeliveryStatus::Duplicate));
            },
            Ok(false) => {},
            Err(e) => warn!("📦️ Could not check the ledger for order {}. Delivering anyway. {e}", order.number),
        }
        let reserved = match self.ledger.reserve(&order.number, source).await {
            Ok(true) => true,
            Ok(false) => {
                info!("📦️ Order {} for shop {} is being delivered by another trigger", order.number, self.shop);
                return Step::Halt(self.halted(&order.number, DeliveryStatus::Duplicate));
            },
            Err(e) => {
                warn!("📦️ Could not reserve order {}. Delivering without a reservation. {e}", order.number);
                false
            },
        };
        Step::Continue(DeliveryState::Gated { order, request, reserved })
    }

    async fn merge_attribution(&self, order: Order, request: AttributionRecord, reserved: bool) -> Step {
        let request = request.normalized();
        let attribution = match self.attribution.get(&order.number).await {
            Some(stored) => {
                debug!("📦️ Merging stored attribution into order {}", order.number);
                stored.normalized().merge(request)
            },
            None => request,
        };
        Step::Continue(DeliveryState::Merged { order, attribution, reserved })
    }

    async fn complete_line_items(&self, mut order: Order, attribution: AttributionRecord, reserved: bool) -> Step {
        if order.line_items.is_none() {
            let items = match order.id.as_deref() {
                Some(id) => self.source.fetch_line_items(id).await.unwrap_or_else(|e| {
                    warn!("📦️ Could not fetch line items for order {}. Sending without items. {e}", order.number);
                    Vec::new()
                }),
                None => {
                    warn!("📦️ Order {} has no platform id, so its line items can't be fetched", order.number);
                    Vec::new()
                },
            };
            order.line_items = Some(items);
        }
        Step::Continue(DeliveryState::Completed { order, attribution, reserved })
    }

    async fn dispatch(&self, order: Order, attribution: AttributionRecord, reserved: bool) -> Step {
        let event = build_purchase_event(order, attribution);
        let reports = join_all(self.destinations.iter().map(|d| send_to(d.as_ref(), &event))).await;
        Step::Continue(DeliveryState::Dispatched { event, reports, reserved })
    }

    async fn commit(
        &self,
        event: PurchaseEvent,
        reports: Vec<DestinationReport>,
        reserved: bool,
        source: DeliverySource,
    ) -> Step {
        let status = synthesize_status(&reports);
        let number = event.order_number;
        let mut outcome = DeliveryOutcome {
            shop: self.shop.clone(),
            order_number: number.clone(),
            event_id: event.event_id,
            status,
            destinations: reports,
            ledger_committed: false,
        };
        if outcome.status.was_sent() {
            let succeeded = outcome.succeeded_destinations();
            let failed = outcome.failed_destinations();
            match self.ledger.record(&number, succeeded, failed, source).await {
                Ok(()) => outcome.ledger_committed = true,
                Err(e) => error!(
                    "📦️ Order {number} for shop {} was delivered but could not be recorded. It may be sent again. {e}",
                    self.shop
                ),
            }
            info!("📦️ {}", outcome.message());
        } else {
            warn!("📦️ {}", outcome.message());
            if reserved {
                if let Err(e) = self.ledger.release(&number).await {
                    warn!("📦️ Could not release order {number}. It will be retried once the reservation expires. {e}");
                }
            }
        }
        Step::Halt(outcome)
    }

    fn halted(&self, number: &OrderNumber, status: DeliveryStatus) -> DeliveryOutcome {
        DeliveryOutcome {
            shop: self.shop.clone(),
            order_number: number.clone(),
            event_id: event_id_for(number),
            status,
            destinations: Vec::new(),
            ledger_committed: false,
        }
    }
}

async fn send_to(destination: &dyn Destination, event: &PurchaseEvent) -> DestinationReport {
    let kind = destination.kind();
    if !destination.is_configured() {
        debug!("📣️ {kind} is not configured. Skipping.");
        return DestinationReport {
            destination: kind,
            result: DestinationResult::Skipped { reason: format!("{kind} is not configured") },
        };
    }
    let result = match destination.send(event).await {
        Ok(receipt) => {
            debug!("📣️ {kind} accepted {}", event.event_id);
            DestinationResult::Succeeded { tracking_id: receipt.tracking_id }
        },
        Err(e) => {
            warn!("📣️ {kind} failed for {}. {e}", event.event_id);
            DestinationResult::Failed { error: e.to_string() }
        },
    };
    DestinationReport { destination: kind, result }
}
