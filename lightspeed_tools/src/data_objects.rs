use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    helpers::{flexible_amount, flexible_count, flexible_id, flexible_string, lenient, parse_lightspeed_timestamp},
    LightspeedApiError,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightspeedOrder {
    #[serde(default, deserialize_with = "flexible_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "flexible_id")]
    pub number: Option<String>,
    #[serde(default, deserialize_with = "flexible_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "flexible_string")]
    pub updated_at: Option<String>,
    #[serde(default, deserialize_with = "flexible_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "flexible_string")]
    pub payment_status: Option<String>,
    #[serde(default, deserialize_with = "flexible_string")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "flexible_amount")]
    pub price_incl: Option<f64>,
    #[serde(default, deserialize_with = "flexible_amount")]
    pub price_excl: Option<f64>,
    #[serde(default, deserialize_with = "flexible_amount")]
    pub total: Option<f64>,
    #[serde(default, deserialize_with = "flexible_amount")]
    pub tax: Option<f64>,
    #[serde(default, deserialize_with = "flexible_amount")]
    pub shipping_cost: Option<f64>,
    #[serde(default, deserialize_with = "flexible_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "flexible_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "flexible_string")]
    pub mobile: Option<String>,
    #[serde(default, deserialize_with = "flexible_string")]
    pub firstname: Option<String>,
    #[serde(default, deserialize_with = "flexible_string")]
    pub lastname: Option<String>,
    #[serde(default, deserialize_with = "flexible_string")]
    pub address_billing_city: Option<String>,
    #[serde(default, deserialize_with = "flexible_string")]
    pub address_billing_zipcode: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub address_billing_country: Option<Country>,
    #[serde(default, deserialize_with = "lenient")]
    pub customer: Option<LightspeedCustomer>,
    /// Only present when the products were embedded. Webhooks carry a resource link here instead, which is dropped.
    #[serde(default, deserialize_with = "lenient")]
    pub products: Option<Vec<LightspeedOrderProduct>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Country {
    #[serde(default, deserialize_with = "flexible_string")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "flexible_string")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightspeedCustomer {
    #[serde(default, deserialize_with = "flexible_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "flexible_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "flexible_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "flexible_string")]
    pub mobile: Option<String>,
    #[serde(default, deserialize_with = "flexible_string")]
    pub firstname: Option<String>,
    #[serde(default, deserialize_with = "flexible_string")]
    pub lastname: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightspeedOrderProduct {
    #[serde(default, deserialize_with = "flexible_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "flexible_string")]
    pub article_code: Option<String>,
    #[serde(default, deserialize_with = "flexible_string", alias = "title")]
    pub product_title: Option<String>,
    #[serde(default, deserialize_with = "flexible_string", alias = "brand")]
    pub brand_title: Option<String>,
    #[serde(default, deserialize_with = "flexible_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "flexible_count")]
    pub quantity_ordered: Option<u32>,
    #[serde(default, deserialize_with = "flexible_amount")]
    pub base_price_incl: Option<f64>,
    #[serde(default, deserialize_with = "flexible_amount")]
    pub price_incl: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub variant: Option<ResourceLink>,
    #[serde(default, deserialize_with = "lenient")]
    pub product: Option<ResourceLink>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceLink {
    pub resource: Resource,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default, deserialize_with = "flexible_id")]
    pub id: Option<String>,
}

impl LightspeedOrder {
    /// Webhooks deliver either the bare order or an object wrapping it in an `order` field.
    pub fn from_webhook_value(value: &Value) -> Result<Self, LightspeedApiError> {
        let inner = value.get("order").filter(|v| v.is_object()).unwrap_or(value);
        if !inner.is_object() {
            return Err(LightspeedApiError::InvalidPayload("Order payload must be a JSON object".to_string()));
        }
        serde_json::from_value(inner.clone()).map_err(|e| LightspeedApiError::JsonError(e.to_string()))
    }

    /// The e-mail address on the order, falling back to the embedded customer record.
    pub fn customer_email(&self) -> Option<&str> {
        self.email.as_deref().or_else(|| self.customer.as_ref().and_then(|c| c.email.as_deref()))
    }

    pub fn customer_phone(&self) -> Option<&str> {
        self.phone
            .as_deref()
            .or(self.mobile.as_deref())
            .or_else(|| self.customer.as_ref().and_then(|c| c.phone.as_deref().or(c.mobile.as_deref())))
    }

    pub fn customer_firstname(&self) -> Option<&str> {
        self.firstname.as_deref().or_else(|| self.customer.as_ref().and_then(|c| c.firstname.as_deref()))
    }

    pub fn customer_lastname(&self) -> Option<&str> {
        self.lastname.as_deref().or_else(|| self.customer.as_ref().and_then(|c| c.lastname.as_deref()))
    }

    pub fn country_code(&self) -> Option<&str> {
        self.address_billing_country.as_ref().and_then(|c| c.code.as_deref())
    }

    /// When the order was placed. `updatedAt` stands in for `createdAt` on the rare payloads without one.
    pub fn created_timestamp(&self) -> Option<DateTime<Utc>> {
        self.created_at
            .as_deref()
            .and_then(parse_lightspeed_timestamp)
            .or_else(|| self.updated_at.as_deref().and_then(parse_lightspeed_timestamp))
    }

    /// The order total including tax, with the legacy `total` field as fallback.
    pub fn total_incl(&self) -> Option<f64> {
        self.price_incl.or(self.total).or(self.price_excl)
    }
}

impl LightspeedOrderProduct {
    /// The id Meta expects in `content_ids`: the variant, else the product, else the order line itself.
    pub fn content_id(&self) -> Option<&str> {
        self.variant
            .as_ref()
            .and_then(|v| v.resource.id.as_deref())
            .or_else(|| self.product.as_ref().and_then(|p| p.resource.id.as_deref()))
            .or(self.id.as_deref())
    }
}
