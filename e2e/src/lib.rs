//! Support code for the cucumber suite in `tests/`.
pub mod helpers;
pub mod integrations;
