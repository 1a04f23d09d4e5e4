use std::env;

use bridge_common::{parse_boolean_flag, Secret};

#[derive(Debug, Clone, Default)]
pub struct Ga4Config {
    /// The data stream's measurement id, e.g. `G-XXXXXXX`.
    pub measurement_id: String,
    pub api_secret: Secret<String>,
    pub enabled: bool,
}

impl Ga4Config {
    /// Loads the `{prefix}_GA4_*` variables. GA4 is opt-in: it stays disabled unless `{prefix}_GA4_ENABLED` is set.
    pub fn from_env(prefix: &str) -> Self {
        let var = |name: &str| env::var(format!("{prefix}_GA4_{name}")).ok();
        Self {
            measurement_id: var("MEASUREMENT_ID").unwrap_or_default(),
            api_secret: Secret::new(var("API_SECRET").unwrap_or_default()),
            enabled: parse_boolean_flag(var("ENABLED"), false),
        }
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = vec![];
        if self.measurement_id.trim().is_empty() {
            missing.push("GA4_MEASUREMENT_ID");
        }
        if self.api_secret.is_blank() {
            missing.push("GA4_API_SECRET");
        }
        missing
    }

    pub fn is_configured(&self) -> bool {
        self.enabled && self.missing_fields().is_empty()
    }
}
