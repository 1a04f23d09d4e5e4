use futures::future::BoxFuture;
use thiserror::Error;

use crate::db_types::{DestinationKind, PurchaseEvent};

#[derive(Debug, Clone, Error)]
pub enum DestinationError {
    #[error("The destination is not configured: {0}")]
    NotConfigured(String),
    #[error("The destination rejected the event. {0}")]
    Rejected(String),
    #[error("Could not reach the destination: {0}")]
    Transport(String),
}

/// What a destination hands back after accepting an event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationReceipt {
    /// A trace or request id, when the API gives us one.
    pub tracking_id: Option<String>,
}

/// A place that purchase events get forwarded to.
///
/// `send` returns a boxed future so that destinations of different types can share a `Vec<Arc<dyn Destination>>`.
pub trait Destination: Send + Sync {
    fn kind(&self) -> DestinationKind;

    /// Unconfigured destinations are skipped without being called.
    fn is_configured(&self) -> bool;

    fn send<'a>(&'a self, event: &'a PurchaseEvent) -> BoxFuture<'a, Result<DestinationReceipt, DestinationError>>;
}
