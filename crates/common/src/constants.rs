/// Widget session lifetime (12 hours)
pub const SESSION_TTL_SECS: i64 = 12 * 60 * 60;

/// Accepted clock distance for timestamped server-to-server signatures (5 minutes)
pub const HMAC_TIMESTAMP_TOLERANCE_SECS: i64 = 5 * 60;

/// Maximum age of a customer email hash timestamp (1 hour)
pub const EMAIL_HASH_MAX_AGE_SECS: i64 = 60 * 60;

/// Origin allowed on every widget response
pub const CORS_ALLOW_ORIGIN: &str = "*";

/// Request headers the widget is allowed to send cross-origin
pub const CORS_ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Header carrying the hex HMAC of a signed callback
pub const SIGNATURE_HEADER: &str = "x-helper-signature";

/// Header carrying the Unix timestamp (seconds) bound into a signed callback
pub const TIMESTAMP_HEADER: &str = "x-helper-timestamp";

/// Maximum widget request body size (1 MB)
pub const MAX_BODY_SIZE_BYTES: usize = 1024 * 1024;

/// Length in bytes of a freshly generated per-mailbox HMAC secret
pub const HMAC_SECRET_BYTES: usize = 32;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_values() {
        const _: () = assert!(HMAC_TIMESTAMP_TOLERANCE_SECS < SESSION_TTL_SECS);
        const _: () = assert!(EMAIL_HASH_MAX_AGE_SECS < SESSION_TTL_SECS);
        const _: () = assert!(HMAC_SECRET_BYTES >= 32, "Secret must match the SHA-256 block");

        assert_eq!(SESSION_TTL_SECS, 43_200);
        assert_eq!(MAX_BODY_SIZE_BYTES, 1024 * 1024);
    }

    #[test]
    fn test_signature_headers_are_lowercase() {
        assert_eq!(SIGNATURE_HEADER, SIGNATURE_HEADER.to_lowercase());
        assert_eq!(TIMESTAMP_HEADER, TIMESTAMP_HEADER.to_lowercase());
    }
}
