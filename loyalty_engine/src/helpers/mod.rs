mod order_number;
mod password;

pub use order_number::{luhn_checksum_valid, validate_order_number, OrderNumberError};
pub use password::{hash_password, new_salt, verify_password};
