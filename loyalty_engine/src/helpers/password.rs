use hmac::{digest::InvalidLength, Hmac, Mac};
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const SALT_LENGTH: usize = 16;

pub fn new_salt() -> String {
    thread_rng().sample_iter(&Alphanumeric).take(SALT_LENGTH).map(char::from).collect()
}

fn keyed_mac(salt: &str, password: &str) -> Result<HmacSha256, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(salt.as_bytes())?;
    mac.update(password.as_bytes());
    Ok(mac)
}

/// Hex-encoded HMAC-SHA256 of `password`, keyed with `salt`.
pub fn hash_password(salt: &str, password: &str) -> Result<String, InvalidLength> {
    let mac = keyed_mac(salt, password)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Checks `password` against a stored hash. The comparison runs in constant time.
pub fn verify_password(salt: &str, password: &str, expected_hash: &str) -> bool {
    let Ok(expected) = hex::decode(expected_hash) else {
        return false;
    };
    keyed_mac(salt, password).map(|mac| mac.verify_slice(&expected).is_ok()).unwrap_or(false)
}
