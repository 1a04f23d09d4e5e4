//! Lightspeed eCom as an [`OrderSource`].
use chrono::{Duration as ChronoDuration, Utc};
use conversion_engine::{
    db_types::{CustomerIdentity, LineItem, Order, OrderNumber, PaymentStatus},
    traits::{OrderSource, OrderSourceError},
};
use lightspeed_tools::{LightspeedApi, LightspeedApiError, LightspeedOrder, LightspeedOrderProduct, MAX_ORDERS_PER_PAGE};
use log::*;

use crate::errors::OrderConversionError;

pub fn order_from_lightspeed(value: LightspeedOrder) -> Result<Order, OrderConversionError> {
    trace!("🛒️ Converting Lightspeed order {:?} into an order", value.number);
    let number = value
        .number
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(OrderNumber::from)
        .ok_or(OrderConversionError::MissingOrderNumber)?;
    let total = value.total_incl().unwrap_or_else(|| {
        warn!("🛒️ Order {number} has no total. Reporting a value of 0.");
        0.0
    });
    let customer = CustomerIdentity {
        email: value.customer_email().map(String::from),
        phone: value.customer_phone().map(String::from),
        first_name: value.customer_firstname().map(String::from),
        last_name: value.customer_lastname().map(String::from),
        city: value.address_billing_city.clone(),
        zipcode: value.address_billing_zipcode.clone(),
        country: value.country_code().map(String::from),
    };
    let payment_status = value.payment_status.as_deref().map(PaymentStatus::from).unwrap_or(PaymentStatus::NotPaid);
    let line_items = value.products.as_ref().map(|products| products.iter().map(line_item_from_product).collect());
    Ok(Order {
        id: value.id.clone(),
        number,
        created_at: value.created_timestamp(),
        payment_status,
        currency: value.currency.clone().unwrap_or_default(),
        total,
        tax: value.tax,
        shipping: value.shipping_cost,
        customer,
        line_items,
    })
}

/// Parses a webhook body, which holds either a bare order or `{"order": {...}}`.
pub fn order_from_webhook_body(body: &serde_json::Value) -> Result<Order, OrderConversionError> {
    let order = LightspeedOrder::from_webhook_value(body).map_err(|e| OrderConversionError::InvalidPayload(e.to_string()))?;
    order_from_lightspeed(order)
}

pub fn line_item_from_product(product: &LightspeedOrderProduct) -> LineItem {
    let quantity = product.quantity_ordered.unwrap_or(1).max(1);
    LineItem {
        id: product.content_id().unwrap_or_default().to_string(),
        sku: product.article_code.clone().filter(|s| !s.trim().is_empty()),
        title: product.product_title.clone().unwrap_or_default(),
        quantity,
        unit_price: product.base_price_incl.or(product.price_incl.map(|p| p / f64::from(quantity))).unwrap_or_default(),
        brand: product.brand_title.clone(),
        category: product.category.clone(),
    }
}

fn source_error(e: LightspeedApiError) -> OrderSourceError {
    if e.is_auth_failure() {
        return OrderSourceError::Unauthorized(e.to_string());
    }
    match e {
        LightspeedApiError::RestRequestError(s) | LightspeedApiError::RestResponseError(s) => {
            OrderSourceError::Unreachable(s)
        },
        LightspeedApiError::JsonError(s) | LightspeedApiError::InvalidPayload(s) => OrderSourceError::InvalidData(s),
        e => OrderSourceError::Other(e.to_string()),
    }
}

/// Reads a tenant's orders through the Lightspeed REST API.
#[derive(Clone)]
pub struct LightspeedOrderSource {
    api: LightspeedApi,
}

impl LightspeedOrderSource {
    pub fn new(api: LightspeedApi) -> Self {
        Self { api }
    }
}

impl OrderSource for LightspeedOrderSource {
    async fn list_recent(&self, lookback_minutes: u64) -> Result<Vec<Order>, OrderSourceError> {
        let minutes = i64::try_from(lookback_minutes).unwrap_or(i64::MAX);
        let since = Utc::now() - ChronoDuration::minutes(minutes);
        let orders = self.api.fetch_recent_orders(since, MAX_ORDERS_PER_PAGE).await.map_err(source_error)?;
        let orders = orders
            .into_iter()
            .filter_map(|o| {
                order_from_lightspeed(o).map_err(|e| warn!("🛒️ Ignoring an order in the listing. {e}")).ok()
            })
            .collect();
        Ok(orders)
    }

    async fn fetch_line_items(&self, order_id: &str) -> Result<Vec<LineItem>, OrderSourceError> {
        let products = self.api.fetch_order_products(order_id).await.map_err(source_error)?;
        Ok(products.iter().map(line_item_from_product).collect())
    }
}
