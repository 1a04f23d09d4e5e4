use std::env;

use bridge_common::Secret;
use log::*;

pub const DEFAULT_CLUSTER_URL: &str = "https://api.webshopapp.com";
pub const DEFAULT_LANGUAGE: &str = "nl";

#[derive(Debug, Clone, Default)]
pub struct LightspeedConfig {
    /// The API cluster, e.g. `https://api.webshopapp.com` for the EU cluster.
    pub cluster_url: String,
    /// The shop language segment used in every API path, e.g. `nl`.
    pub language: String,
    pub api_key: Secret<String>,
    pub api_secret: Secret<String>,
    /// The numeric Lightspeed shop id. It is not part of the API paths, but identifies the credentials' shop.
    pub shop_id: String,
}

impl LightspeedConfig {
    /// Loads the `{prefix}_LIGHTSPEED_*` variables. Missing credentials are left blank; use
    /// [`LightspeedConfig::missing_fields`] to reject incomplete configurations.
    pub fn from_env(prefix: &str) -> Self {
        let var = |name: &str| env::var(format!("{prefix}_LIGHTSPEED_{name}")).ok();
        let cluster_url = var("CLUSTER_URL").unwrap_or_else(|| {
            trace!("{prefix}_LIGHTSPEED_CLUSTER_URL not set, using {DEFAULT_CLUSTER_URL}");
            DEFAULT_CLUSTER_URL.to_string()
        });
        let language = var("LANGUAGE").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        Self {
            cluster_url,
            language,
            api_key: Secret::new(var("API_KEY").unwrap_or_default()),
            api_secret: Secret::new(var("API_SECRET").unwrap_or_default()),
            shop_id: var("SHOP_ID").unwrap_or_default(),
        }
    }

    /// The names of the required settings that are blank, in the form `LIGHTSPEED_API_KEY`.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = vec![];
        if self.api_key.is_blank() {
            missing.push("LIGHTSPEED_API_KEY");
        }
        if self.api_secret.is_blank() {
            missing.push("LIGHTSPEED_API_SECRET");
        }
        if self.shop_id.trim().is_empty() {
            missing.push("LIGHTSPEED_SHOP_ID");
        }
        missing
    }
}
