use bridge_common::ShopId;
use serde::{Deserialize, Serialize};

use crate::db_types::{DestinationKind, OrderNumber};

/// How one destination fared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DestinationResult {
    Succeeded { tracking_id: Option<String> },
    Failed { error: String },
    /// Not configured for this tenant, so never called.
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationReport {
    pub destination: DestinationKind,
    #[serde(flatten)]
    pub result: DestinationResult,
}

impl DestinationReport {
    pub fn is_success(&self) -> bool {
        matches!(self.result, DestinationResult::Succeeded { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.result, DestinationResult::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Every configured destination accepted the event.
    Delivered,
    /// At least one destination accepted the event and at least one failed.
    PartiallyDelivered,
    /// No destination accepted the event.
    Failed,
    /// The order was already delivered, or another delivery is in flight.
    Duplicate,
    /// The order is not eligible for a purchase event.
    Skipped { reason: String },
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::PartiallyDelivered => "partially_delivered",
            DeliveryStatus::Failed => "failed",
            DeliveryStatus::Duplicate => "duplicate",
            DeliveryStatus::Skipped { .. } => "skipped",
        }
    }

    /// `false` only when the event reached nobody.
    pub fn is_success(&self) -> bool {
        !matches!(self, DeliveryStatus::Failed)
    }

    pub fn was_sent(&self) -> bool {
        matches!(self, DeliveryStatus::Delivered | DeliveryStatus::PartiallyDelivered)
    }
}

/// Everything a caller needs to know about one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    pub shop: ShopId,
    pub order_number: OrderNumber,
    pub event_id: String,
    pub status: DeliveryStatus,
    pub destinations: Vec<DestinationReport>,
    /// `false` when the event went out but the dedup marker could not be written. The next trigger may send it again.
    pub ledger_committed: bool,
}

impl DeliveryOutcome {
    pub fn succeeded_destinations(&self) -> Vec<DestinationKind> {
        self.destinations.iter().filter(|r| r.is_success()).map(|r| r.destination).collect()
    }

    pub fn failed_destinations(&self) -> Vec<DestinationKind> {
        self.destinations.iter().filter(|r| r.is_failure()).map(|r| r.destination).collect()
    }

    pub fn message(&self) -> String {
        match &self.status {
            DeliveryStatus::Delivered => format!("Purchase event {} delivered", self.event_id),
            DeliveryStatus::PartiallyDelivered => {
                let failed = self.failed_destinations().iter().map(|d| d.to_string()).collect::<Vec<_>>().join(", ");
                format!("Purchase event {} delivered, but failed for {failed}", self.event_id)
            },
            DeliveryStatus::Failed => format!("Purchase event {} could not be delivered", self.event_id),
            DeliveryStatus::Duplicate => format!("Order {} has already been processed", self.order_number),
            DeliveryStatus::Skipped { reason } => format!("Order {} skipped: {reason}", self.order_number),
        }
    }
}

/// Folds per-destination reports into an overall status. Skipped destinations count for neither side, so a run where
/// everything was skipped is a failure.
pub fn synthesize_status(reports: &[DestinationReport]) -> DeliveryStatus {
    let succeeded = reports.iter().filter(|r| r.is_success()).count();
    let failed = reports.iter().filter(|r| r.is_failure()).count();
    match (succeeded, failed) {
        (0, _) => DeliveryStatus::Failed,
        (_, 0) => DeliveryStatus::Delivered,
        _ => DeliveryStatus::PartiallyDelivered,
    }
}
