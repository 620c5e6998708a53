//! HMAC-SHA256 request signatures
//!
//! Three shapes share one primitive:
//! - a plain body signature (`verify_hmac`)
//! - a timestamped callback signature over `"{timestamp}.{body}"` with a
//!   replay window (`verify_timestamped_hmac`)
//! - a customer identity hash over `"{email}:{timestamp_ms}"` that an
//!   integrator computes server side and hands to the widget (`email_hash`)
//!
//! Signatures are lowercase hex. Comparison goes through `Mac::verify_slice`,
//! which is constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use crate::constants::HMAC_TIMESTAMP_TOLERANCE_SECS;
use crate::error::{Result, WidgetError};

type HmacSha256 = Hmac<Sha256>;

fn mac_for(secret: &str) -> Result<HmacSha256> {
    if secret.is_empty() {
        return Err(WidgetError::Internal("HMAC secret is empty".to_string()));
    }
    HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| WidgetError::Internal(format!("Invalid HMAC key: {}", e)))
}

/// Compute the lowercase hex HMAC-SHA256 of `message`
pub fn sign_hex(secret: &str, message: &[u8]) -> Result<String> {
    let mut mac = mac_for(secret)?;
    mac.update(message);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time check of a hex signature over `message`
fn verify_hex(secret: &str, message: &[u8], signature: &str) -> Result<()> {
    let provided = hex::decode(signature.trim())
        .map_err(|_| WidgetError::Authentication("signature is not hex".to_string()))?;

    let mut mac = mac_for(secret)?;
    mac.update(message);
    mac.verify_slice(&provided).map_err(|_| {
        debug!("HMAC signature mismatch");
        WidgetError::Authentication("signature mismatch".to_string())
    })
}

/// Strip an optional `sha256=` scheme prefix from a signature header
fn signature_value(header: Option<&str>) -> Result<&str> {
    let value = header.map(str::trim).unwrap_or_default();
    let value = value.strip_prefix("sha256=").unwrap_or(value);
    if value.is_empty() {
        return Err(WidgetError::Authentication("missing signature".to_string()));
    }
    Ok(value)
}

/// Verify a signature header over the raw request body
///
/// # Examples
///
/// ```
/// use widget_gate_common::signature::{sign_hex, verify_hmac};
///
/// let sig = sign_hex("secret", b"{\"ok\":true}").unwrap();
/// assert!(verify_hmac(b"{\"ok\":true}", Some(&sig), "secret").is_ok());
/// assert!(verify_hmac(b"{\"ok\":false}", Some(&sig), "secret").is_err());
/// assert!(verify_hmac(b"{\"ok\":true}", None, "secret").is_err());
/// ```
pub fn verify_hmac(body: &[u8], signature_header: Option<&str>, secret: &str) -> Result<()> {
    let signature = signature_value(signature_header)?;
    verify_hex(secret, body, signature)
}

/// Message bound by a timestamped signature
fn timestamped_message(timestamp: &str, body: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(timestamp.len() + 1 + body.len());
    message.extend_from_slice(timestamp.as_bytes());
    message.push(b'.');
    message.extend_from_slice(body);
    message
}

/// Sign `body` for delivery at `timestamp` (Unix seconds)
pub fn sign_timestamped(secret: &str, timestamp: i64, body: &[u8]) -> Result<String> {
    sign_hex(secret, &timestamped_message(&timestamp.to_string(), body))
}

/// Verify a timestamped signature, rejecting stale or future timestamps
///
/// The timestamp must parse as Unix seconds and lie within
/// [`HMAC_TIMESTAMP_TOLERANCE_SECS`] of `now` before the signature is checked.
pub fn verify_timestamped_hmac(
    body: &[u8],
    signature_header: Option<&str>,
    timestamp_header: Option<&str>,
    secret: &str,
    now: i64,
) -> Result<()> {
    let signature = signature_value(signature_header)?;

    let timestamp = timestamp_header
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| WidgetError::Authentication("missing timestamp".to_string()))?;

    let seconds: i64 = timestamp
        .parse()
        .map_err(|_| WidgetError::Authentication("timestamp is not numeric".to_string()))?;

    if now.abs_diff(seconds) > HMAC_TIMESTAMP_TOLERANCE_SECS.unsigned_abs() {
        debug!("Signed request outside replay window: ts={} now={}", seconds, now);
        return Err(WidgetError::Authentication(
            "timestamp outside tolerance".to_string(),
        ));
    }

    verify_hex(secret, &timestamped_message(timestamp, body), signature)
}

/// Hash an integrator computes to vouch for a customer's email
///
/// The signed content is `"{email}:{timestamp_ms}"`.
pub fn email_hash(email: &str, timestamp_ms: i64, secret: &str) -> Result<String> {
    sign_hex(secret, format!("{}:{}", email, timestamp_ms).as_bytes())
}

/// Verify a customer email hash and its freshness
///
/// `timestamp_ms` may be at most `max_age_secs` old and at most
/// `max_age_secs` ahead of `now_ms`.
pub fn verify_email_hash(
    email: &str,
    hash: &str,
    timestamp_ms: i64,
    secret: &str,
    now_ms: i64,
    max_age_secs: i64,
) -> Result<()> {
    let max_age_ms = u64::try_from(max_age_secs.saturating_mul(1000)).unwrap_or(0);
    if now_ms.abs_diff(timestamp_ms) > max_age_ms {
        return Err(WidgetError::Authentication(
            "email hash timestamp expired".to_string(),
        ));
    }

    let hash = signature_value(Some(hash))?;
    verify_hex(
        secret,
        format!("{}:{}", email, timestamp_ms).as_bytes(),
        hash,
    )
}
