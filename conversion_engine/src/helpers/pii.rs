//! Hashing of personal data before it leaves the building.
//!
//! Values are trimmed and lowercased, then SHA-256 hashed and hex encoded. Both destinations match customers on
//! exactly this normalization, so `" Alice@Example.COM"` and `"alice@example.com"` must hash to the same thing.
use sha2::{Digest, Sha256};

/// Trims and lowercases a value. Returns `None` for empty input.
pub fn normalize_identity(value: &str) -> Option<String> {
    let normalized = value.trim().to_lowercase();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// SHA-256 of the normalized value as lowercase hex. Empty input has no hash.
pub fn hash_identity(value: &str) -> Option<String> {
    normalize_identity(value).map(|v| sha256_hex(&v))
}

/// Phone numbers are reduced to their digits before hashing, so `+31 (6) 1234-5678` and `31612345678` match.
pub fn hash_phone(value: &str) -> Option<String> {
    let digits = value.chars().filter(char::is_ascii_digit).collect::<String>();
    hash_identity(&digits)
}

/// Country codes are sent lowercased and in the clear.
pub fn normalize_country(value: &str) -> Option<String> {
    normalize_identity(value)
}

fn sha256_hex(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    format!("{digest:x}")
}
