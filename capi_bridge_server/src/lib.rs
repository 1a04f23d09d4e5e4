//! # Conversions bridge server
//! This crate hosts the HTTP server for the Lightspeed conversions bridge. It is responsible for:
//! * Receiving Lightspeed order webhooks and reporting paid orders to the Meta Conversions API and GA4.
//! * Staging the attribution data (click ids, GA client id, page) that the thank-you page posts, so that it can be
//!   attached to the purchase event.
//! * Polling every tenant for recent orders, to catch webhooks that never arrived.
//!
//! The delivery itself (dedup, attribution merge, fan-out) lives in `conversion_engine`. This crate supplies the
//! tenant configuration and the Lightspeed, Meta and GA4 integrations.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/webhook?shop={id}`: The Lightspeed order webhook.
//! * `/pixel-data?shop={id}`: The attribution beacon posted by the thank-you page.

pub mod bridge_api;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod expiry_worker;
pub mod helpers;
pub mod integrations;
pub mod poll_worker;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
