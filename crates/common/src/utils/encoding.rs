use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::constants::MAX_BODY_SIZE_BYTES;
use crate::error::{Result, WidgetError};

/// Encode bytes to Base64 string
pub fn encode_body(body: &[u8]) -> String {
    STANDARD.encode(body)
}

/// Turn a gateway body into raw bytes
///
/// The gateway hands over text, Base64-encoded when the client sent binary.
/// Bodies larger than [`MAX_BODY_SIZE_BYTES`] are refused.
pub fn decode_body(body: Option<&str>, is_base64_encoded: bool) -> Result<Vec<u8>> {
    let Some(body) = body else {
        return Ok(Vec::new());
    };

    let bytes = if is_base64_encoded {
        STANDARD
            .decode(body)
            .map_err(|_| WidgetError::BadRequest("Invalid request body encoding".to_string()))?
    } else {
        body.as_bytes().to_vec()
    };

    if bytes.len() > MAX_BODY_SIZE_BYTES {
        return Err(WidgetError::PayloadTooLarge(bytes.len()));
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_absent_body() {
        assert!(decode_body(None, false).unwrap().is_empty());
        assert!(decode_body(None, true).unwrap().is_empty());
    }

    #[test]
    fn test_decode_plain_body() {
        let decoded = decode_body(Some(r#"{"mailboxSlug":"acme"}"#), false).unwrap();
        assert_eq!(decoded, br#"{"mailboxSlug":"acme"}"#);
    }

    #[test]
    fn test_decode_base64_body() {
        let encoded = encode_body(br#"{"name":"test","value":123}"#);
        assert_eq!(encoded, "eyJuYW1lIjoidGVzdCIsInZhbHVlIjoxMjN9");

        let decoded = decode_body(Some(&encoded), true).unwrap();
        assert_eq!(decoded, br#"{"name":"test","value":123}"#);
    }

    #[test]
    fn test_decode_invalid_base64() {
        let result = decode_body(Some("This is not valid base64!!!"), true);
        assert!(matches!(result, Err(WidgetError::BadRequest(_))));
    }

    #[test]
    fn test_decode_rejects_oversized_body() {
        let large = "a".repeat(MAX_BODY_SIZE_BYTES + 1);
        let result = decode_body(Some(&large), false);
        assert!(matches!(result, Err(WidgetError::PayloadTooLarge(n)) if n == MAX_BODY_SIZE_BYTES + 1));

        let at_limit = "a".repeat(MAX_BODY_SIZE_BYTES);
        assert!(decode_body(Some(&at_limit), false).is_ok());
    }
}
