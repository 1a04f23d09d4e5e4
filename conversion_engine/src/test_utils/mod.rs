//! Helpers for testing code built on the engine. Enabled with the `test_utils` feature.
pub mod fixtures;
pub mod prepare_env;
pub mod stubs;
