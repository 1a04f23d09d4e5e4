//! Server-side clients for the two analytics destinations the bridge reports purchases to:
//!
//! * [`meta`]: the Meta (Facebook) Conversions API. One `Purchase` event per order, with hashed user data.
//! * [`ga4`]: the Google Analytics 4 Measurement Protocol. One `purchase` event per order, keyed on the browser's
//!   GA client id.
//!
//! Neither client knows anything about orders. Callers build the payload objects and hand them over.
mod error;

pub mod ga4;
pub mod meta;

pub use error::AnalyticsApiError;
