mod api;
mod config;
mod data_objects;

pub use api::{Ga4Api, GA4_COLLECT_URL};
pub use config::Ga4Config;
pub use data_objects::{fallback_client_id, Ga4Event, Ga4Item, Ga4Payload, Ga4PurchaseParams, UserProperty};
