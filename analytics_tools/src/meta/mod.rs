mod api;
mod config;
mod data_objects;

pub use api::{MetaCapiApi, GRAPH_API_URL};
pub use config::{MetaConfig, DEFAULT_META_API_VERSION};
pub use data_objects::{MetaContent, MetaCustomData, MetaEvent, MetaEventsRequest, MetaEventsResponse, MetaUserData};
