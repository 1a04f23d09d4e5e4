mod helpers;
mod secret;
mod shop_id;

pub use helpers::{parse_boolean_flag, parse_csv_list};
pub use secret::Secret;
pub use shop_id::{ShopId, ShopIdError};
