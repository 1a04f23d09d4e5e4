//! # Delivery
//!
//! Turns a paid order into one purchase event and hands it to every destination, at most once per order.
mod event;
mod orchestrator;
mod outcome;

pub use event::{build_purchase_event, event_id_for, hash_customer, normalize_currency, DEFAULT_CURRENCY};
pub use orchestrator::{ineligibility_reason, DeliveryOrchestrator, DeliveryState, Step};
pub use outcome::{synthesize_status, DeliveryOutcome, DeliveryStatus, DestinationReport, DestinationResult};
