//! Server and tenant configuration.
//!
//! Everything is read from the environment once at start-up (a `.env` file is honoured) and then passed around as
//! immutable values. Global settings use the `BRIDGE_` prefix. Each tenant listed in `BRIDGE_SHOPS` has its own
//! variables, prefixed with the upper-cased shop id, e.g. `VIKGINCHOICE_META_PIXEL_ID`.
use std::{collections::BTreeMap, env, str::FromStr, time::Duration};

use analytics_tools::{ga4::Ga4Config, meta::MetaConfig};
use bridge_common::{parse_boolean_flag, parse_csv_list, ShopId};
use conversion_engine::LedgerConfig;
use lightspeed_tools::LightspeedConfig;
use log::*;
use thiserror::Error;

const DEFAULT_BRIDGE_HOST: &str = "127.0.0.1";
const DEFAULT_BRIDGE_PORT: u16 = 8370;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/bridge_store.db";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(300);
const DEFAULT_POLL_LOOKBACK_MINUTES: u64 = 10;
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Unknown shop '{0}'")]
    UnknownShop(String),
    #[error("Shop '{shop}' is missing required configuration: {}", .missing.join(", "))]
    MissingFields { shop: String, missing: Vec<String> },
}

//-------------------------------------------  ServerConfig  ----------------------------------------------------------
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub proxy: ProxyConfig,
    pub poll: PollConfig,
    pub ledger: LedgerConfig,
    /// Timeout applied to every outbound HTTP call.
    pub http_timeout: Duration,
    /// The tenants served by this instance, from `BRIDGE_SHOPS`.
    pub shops: Vec<ShopId>,
}

/// How to work out the client's IP address when the server sits behind a proxy or CDN.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProxyConfig {
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address.
    pub use_forwarded: bool,
    /// If true, Cloudflare's CF-Connecting-IP header takes precedence over everything else.
    pub use_cf_connecting_ip: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self { use_x_forwarded_for: false, use_forwarded: false, use_cf_connecting_ip: true }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollConfig {
    pub enabled: bool,
    pub interval: Duration,
    /// How far back each poll looks, in minutes. Always at least twice the interval so consecutive polls overlap.
    pub lookback_minutes: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { enabled: true, interval: DEFAULT_POLL_INTERVAL, lookback_minutes: DEFAULT_POLL_LOOKBACK_MINUTES }
    }
}

impl PollConfig {
    pub fn new(enabled: bool, interval: Duration, lookback_minutes: u64) -> Self {
        let minimum = (2 * interval.as_secs()).div_ceil(60);
        let lookback_minutes = if lookback_minutes < minimum {
            warn!(
                "🪛️ A poll lookback of {lookback_minutes} minutes is shorter than two poll intervals. Using {minimum} \
                 minutes instead."
            );
            minimum
        } else {
            lookback_minutes
        };
        Self { enabled, interval, lookback_minutes }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_BRIDGE_HOST.to_string(),
            port: DEFAULT_BRIDGE_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            proxy: ProxyConfig::default(),
            poll: PollConfig::default(),
            ledger: LedgerConfig::default(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            shops: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("BRIDGE_HOST").ok().unwrap_or_else(|| DEFAULT_BRIDGE_HOST.into());
        let port = env::var("BRIDGE_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for BRIDGE_PORT. {e} Using the default, {DEFAULT_BRIDGE_PORT}, \
                         instead."
                    );
                    DEFAULT_BRIDGE_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_BRIDGE_PORT);
        let database_url = env::var("BRIDGE_DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ BRIDGE_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}");
            DEFAULT_DATABASE_URL.to_string()
        });
        let proxy = ProxyConfig {
            use_x_forwarded_for: parse_boolean_flag(env::var("BRIDGE_USE_X_FORWARDED_FOR").ok(), false),
            use_forwarded: parse_boolean_flag(env::var("BRIDGE_USE_FORWARDED").ok(), false),
            use_cf_connecting_ip: parse_boolean_flag(env::var("BRIDGE_USE_CF_CONNECTING_IP").ok(), true),
        };
        let poll = PollConfig::new(
            !parse_boolean_flag(env::var("BRIDGE_DISABLE_POLLING").ok(), false),
            Duration::from_secs(env_number("BRIDGE_POLL_INTERVAL", DEFAULT_POLL_INTERVAL.as_secs())),
            env_number("BRIDGE_POLL_LOOKBACK", DEFAULT_POLL_LOOKBACK_MINUTES),
        );
        let ledger = configure_ttls();
        let http_timeout = Duration::from_secs(env_number("BRIDGE_HTTP_TIMEOUT", DEFAULT_HTTP_TIMEOUT.as_secs()));
        let shops = configure_shops();
        Self { host, port, database_url, proxy, poll, ledger, http_timeout, shops }
    }
}

/// Reads a positive number from the environment, logging and falling back to the default when it is missing or
/// invalid.
fn env_number(name: &str, default: u64) -> u64 {
    match env::var(name) {
        Ok(s) => match s.trim().parse::<u64>() {
            Ok(v) if v > 0 => v,
            _ => {
                warn!("🪛️ {s} is not a valid value for {name}. Using the default, {default}, instead.");
                default
            },
        },
        Err(_) => {
            debug!("🪛️ {name} is not set. Using the default value of {default}.");
            default
        },
    }
}

fn configure_ttls() -> LedgerConfig {
    let defaults = LedgerConfig::default();
    let dedup_ttl = Duration::from_secs(env_number("BRIDGE_DEDUP_TTL", defaults.dedup_ttl.as_secs()));
    let reservation_ttl =
        Duration::from_secs(env_number("BRIDGE_RESERVATION_TTL", defaults.reservation_ttl.as_secs()));
    let attribution_ttl =
        Duration::from_secs(env_number("BRIDGE_ATTRIBUTION_TTL", defaults.attribution_ttl.as_secs()));
    LedgerConfig { dedup_ttl, reservation_ttl, attribution_ttl }
}

fn configure_shops() -> Vec<ShopId> {
    let list = env::var("BRIDGE_SHOPS").unwrap_or_default();
    let shops = parse_csv_list(&list)
        .into_iter()
        .filter_map(|s| {
            ShopId::from_str(&s)
                .map_err(|e| warn!("🪛️ Ignoring invalid shop id in BRIDGE_SHOPS. {e}"))
                .ok()
        })
        .collect::<Vec<_>>();
    if shops.is_empty() {
        warn!("🪛️ BRIDGE_SHOPS is empty. Every request will be rejected with an unknown shop error.");
    } else {
        let names = shops.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ");
        info!("🪛️ Serving shops: {names}");
    }
    shops
}

//-------------------------------------------  ShopConfig  ------------------------------------------------------------

/// Everything needed to serve one tenant.
#[derive(Clone, Debug)]
pub struct ShopConfig {
    pub id: ShopId,
    pub name: String,
    /// The storefront's domain, used to build the default event source URL.
    pub domain: String,
    pub lightspeed: LightspeedConfig,
    pub meta: MetaConfig,
    pub ga4: Ga4Config,
}

impl ShopConfig {
    pub fn from_env(id: &ShopId) -> Self {
        let prefix = id.env_prefix();
        let name = env::var(format!("{prefix}_NAME")).unwrap_or_else(|_| id.to_string());
        let domain = env::var(format!("{prefix}_DOMAIN")).unwrap_or_else(|_| {
            debug!("🪛️ {prefix}_DOMAIN is not set. Using {id}.nl");
            format!("{id}.nl")
        });
        Self {
            id: id.clone(),
            name,
            domain,
            lightspeed: LightspeedConfig::from_env(&prefix),
            meta: MetaConfig::from_env(&prefix),
            ga4: Ga4Config::from_env(&prefix),
        }
    }

    /// Every required variable that is missing, by its full environment name. Destinations only count when enabled.
    pub fn missing_fields(&self) -> Vec<String> {
        let prefix = self.id.env_prefix();
        let mut missing = self.lightspeed.missing_fields();
        if self.meta.enabled {
            missing.extend(self.meta.missing_fields());
        }
        if self.ga4.enabled {
            missing.extend(self.ga4.missing_fields());
        }
        missing.into_iter().map(|field| format!("{prefix}_{field}")).collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingFields { shop: self.id.to_string(), missing })
        }
    }

    /// The thank-you page URL used when the browser didn't report the page it was on.
    pub fn default_event_source_url(&self) -> String {
        format!("https://{}/checkout/thankyou", self.domain.trim_end_matches('/'))
    }
}

//-------------------------------------------  ShopRegistry  ----------------------------------------------------------

/// The set of tenants this instance serves. Lookups fail closed: an unknown shop, or one with incomplete
/// configuration, is an error.
#[derive(Clone, Debug, Default)]
pub struct ShopRegistry {
    shops: BTreeMap<ShopId, ShopConfig>,
}

impl ShopRegistry {
    pub fn new(shops: Vec<ShopConfig>) -> Self {
        Self { shops: shops.into_iter().map(|s| (s.id.clone(), s)).collect() }
    }

    pub fn from_env(ids: &[ShopId]) -> Self {
        let registry = Self::new(ids.iter().map(ShopConfig::from_env).collect());
        for shop in registry.shops.values() {
            if let Err(e) = shop.validate() {
                warn!("🪛️ {e}. Requests for this shop will be rejected.");
            }
        }
        registry
    }

    pub fn shop_ids(&self) -> Vec<ShopId> {
        self.shops.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.shops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shops.is_empty()
    }

    pub fn resolve(&self, id: &ShopId) -> Result<&ShopConfig, ConfigError> {
        let shop = self.shops.get(id).ok_or_else(|| ConfigError::UnknownShop(id.to_string()))?;
        shop.validate()?;
        Ok(shop)
    }
}
