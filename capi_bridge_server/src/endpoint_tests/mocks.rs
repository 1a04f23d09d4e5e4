use conversion_engine::{
    db_types::{LineItem, Order},
    traits::{OrderSource, OrderSourceError},
};
use mockall::mock;

mock! {
    pub OrderSource {}
    impl OrderSource for OrderSource {
        async fn list_recent(&self, lookback_minutes: u64) -> Result<Vec<Order>, OrderSourceError>;
        async fn fetch_line_items(&self, order_id: &str) -> Result<Vec<LineItem>, OrderSourceError>;
    }
}
