use thiserror::Error;

use crate::db_types::{LineItem, Order};

#[derive(Debug, Clone, Error)]
pub enum OrderSourceError {
    #[error("The shop platform rejected our credentials: {0}")]
    Unauthorized(String),
    #[error("Could not reach the shop platform: {0}")]
    Unreachable(String),
    #[error("The shop platform returned data we could not understand: {0}")]
    InvalidData(String),
    #[error("Order source error: {0}")]
    Other(String),
}

/// Read access to a tenant's orders on the shop platform.
#[allow(async_fn_in_trait)]
pub trait OrderSource {
    /// Orders created in the last `lookback_minutes` minutes, newest first.
    async fn list_recent(&self, lookback_minutes: u64) -> Result<Vec<Order>, OrderSourceError>;

    /// The line items of the order with the given platform id.
    async fn fetch_line_items(&self, order_id: &str) -> Result<Vec<LineItem>, OrderSourceError>;
}
