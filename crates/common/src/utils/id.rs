use rand::RngCore;
use rand::rngs::OsRng;
use uuid::Uuid;

use crate::constants::HMAC_SECRET_BYTES;

/// Generate an id for a visitor who has not identified themselves
///
/// Lowercase hyphenated UUID v4.
pub fn generate_anonymous_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a fresh mailbox HMAC secret as lowercase hex
pub fn generate_hmac_secret() -> String {
    let mut bytes = [0u8; HMAC_SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
