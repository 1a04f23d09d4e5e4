use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifies a tenant (one onboarded shop). Always stored trimmed and lowercased, so `?shop=VikGinChoice` and
/// `x-shop-id: vikginchoice ` resolve to the same tenant.
///
/// Ids never contain `_`. Store keys use `_` to separate the shop from the order number, and environment prefixes
/// turn `-` into `_`, so both stay unique per tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShopId(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShopIdError {
    #[error("Shop identifier is empty")]
    Empty,
    #[error("Shop identifier '{0}' contains invalid characters. Only letters, digits and '-' are allowed.")]
    InvalidCharacters(String),
}

impl ShopId {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The prefix used for this tenant's environment variables, e.g. `vik-gin` -> `VIK_GIN`.
    pub fn env_prefix(&self) -> String {
        self.0.to_ascii_uppercase().replace('-', "_")
    }
}

impl FromStr for ShopId {
    type Err = ShopIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim().to_lowercase();
        if id.is_empty() {
            return Err(ShopIdError::Empty);
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(ShopIdError::InvalidCharacters(id));
        }
        Ok(Self(id))
    }
}

impl TryFrom<String> for ShopId {
    type Error = ShopIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ShopId> for String {
    fn from(value: ShopId) -> Self {
        value.0
    }
}

impl Display for ShopId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
