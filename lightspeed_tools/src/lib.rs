//! A small client for the Lightspeed eCom REST API.
//!
//! Only the calls needed to report purchases are implemented: listing recently created orders, fetching a single
//! order and fetching the products (line items) of an order. The data objects are deliberately lenient, since
//! Lightspeed sends the same order in slightly different shapes depending on whether it arrives via a webhook or the
//! REST API.
mod api;
mod config;
mod data_objects;
mod error;

pub mod helpers;

pub use api::{LightspeedApi, MAX_ORDERS_PER_PAGE};
pub use config::{LightspeedConfig, DEFAULT_CLUSTER_URL, DEFAULT_LANGUAGE};
pub use data_objects::{
    Country,
    LightspeedCustomer,
    LightspeedOrder,
    LightspeedOrderProduct,
    Resource,
    ResourceLink,
};
pub use error::LightspeedApiError;
