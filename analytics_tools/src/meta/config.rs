use std::env;

use bridge_common::{parse_boolean_flag, Secret};

pub const DEFAULT_META_API_VERSION: &str = "v18.0";

#[derive(Debug, Clone, Default)]
pub struct MetaConfig {
    pub access_token: Secret<String>,
    pub pixel_id: String,
    pub api_version: String,
    pub enabled: bool,
    /// Routes events to the "Test events" tab of the events manager instead of the live dataset.
    pub test_event_code: Option<String>,
}

impl MetaConfig {
    /// Loads the `{prefix}_META_*` variables. Meta is enabled unless `{prefix}_META_ENABLED` says otherwise.
    pub fn from_env(prefix: &str) -> Self {
        let var = |name: &str| env::var(format!("{prefix}_META_{name}")).ok();
        Self {
            access_token: Secret::new(var("ACCESS_TOKEN").unwrap_or_default()),
            pixel_id: var("PIXEL_ID").unwrap_or_default(),
            api_version: var("API_VERSION").unwrap_or_else(|| DEFAULT_META_API_VERSION.to_string()),
            enabled: parse_boolean_flag(var("ENABLED"), true),
            test_event_code: var("TEST_EVENT_CODE").filter(|s| !s.trim().is_empty()),
        }
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = vec![];
        if self.access_token.is_blank() {
            missing.push("META_ACCESS_TOKEN");
        }
        if self.pixel_id.trim().is_empty() {
            missing.push("META_PIXEL_ID");
        }
        missing
    }

    /// Enabled, with every credential present.
    pub fn is_configured(&self) -> bool {
        self.enabled && self.missing_fields().is_empty()
    }
}
