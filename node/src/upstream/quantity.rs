//! Hex quantity codec for block heights and timestamps.
//!
//! The wire form is `0x` followed by lowercase hex digits with no zero padding
//! (`0x0` for zero). Decoding is lenient about case and leading zeros but never
//! about the prefix.

use thiserror::Error;

/// Errors decoding a hex quantity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("quantity `{0}` is missing the 0x prefix")]
    MissingPrefix(String),
    #[error("quantity has no digits")]
    Empty,
    #[error("quantity `{0}` is not a valid hex number")]
    Invalid(String),
    #[error("quantity `{0}` does not fit in 64 bits")]
    Overflow(String),
}

/// Encode an integer as a hex quantity.
pub fn encode(value: u64) -> String {
    format!("0x{value:x}")
}

/// Decode a hex quantity into an integer.
pub fn decode(raw: &str) -> Result<u64, QuantityError> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| QuantityError::MissingPrefix(raw.to_string()))?;
    if digits.is_empty() {
        return Err(QuantityError::Empty);
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(QuantityError::Invalid(raw.to_string()));
    }

    let significant = digits.trim_start_matches('0');
    if significant.len() > 16 {
        return Err(QuantityError::Overflow(raw.to_string()));
    }
    if significant.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(significant, 16).map_err(|_| QuantityError::Invalid(raw.to_string()))
}
