mod pii;

pub use pii::{hash_identity, hash_phone, normalize_country, normalize_identity};
