//! # Order number validation
//!
//! Order numbers are strings of ASCII digits (leading zeros are allowed) that carry a Luhn check digit in the last
//! position. Format and checksum failures are reported separately, since callers treat a garbled request differently
//! from a well-formed number that simply isn't a real order.
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderNumberError {
    #[error("Order number must be a non-empty string of digits. Got '{0}'")]
    InvalidFormat(String),
    #[error("Order number {0} failed the checksum test")]
    ChecksumFailed(String),
}

/// Checks that `raw` is structurally an order number and that its Luhn check digit is correct.
pub fn validate_order_number(raw: &str) -> Result<(), OrderNumberError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(OrderNumberError::InvalidFormat(raw.to_string()));
    }
    if !luhn_checksum_valid(raw) {
        return Err(OrderNumberError::ChecksumFailed(raw.to_string()));
    }
    Ok(())
}

/// Luhn (mod 10) checksum over a string of decimal digits.
///
/// Returns false for any non-digit character, so the result is meaningful for arbitrary input.
pub fn luhn_checksum_valid(digits: &str) -> bool {
    let mut sum = 0u32;
    for (i, b) in digits.bytes().rev().enumerate() {
        if !b.is_ascii_digit() {
            return false;
        }
        let mut d = u32::from(b - b'0');
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    sum % 10 == 0
}
