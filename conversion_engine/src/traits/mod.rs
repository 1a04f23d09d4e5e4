//! # Engine collaborators
//!
//! The engine never talks to a database, a shop platform or an analytics API directly. It is handed implementations
//! of these traits instead.
//!
//! * [`KeyValueStore`] is the only shared mutable state. It holds dedup markers and attribution records, each with a
//!   time-to-live.
//! * [`OrderSource`] lists recent orders and fetches line items from the shop platform.
//! * [`Destination`] accepts a [`crate::db_types::PurchaseEvent`] and forwards it to an analytics or advertising API.
//!   Destinations are object-safe so that a tenant's destinations can be held in one list.
mod destination;
mod key_value_store;
mod order_source;

pub use destination::{Destination, DestinationError, DestinationReceipt};
pub use key_value_store::{KeyValueStore, StoreError};
pub use order_source::{OrderSource, OrderSourceError};
