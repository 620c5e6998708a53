//! Input validation for widget-supplied data
//!
//! Everything here runs before a value reaches a lookup, a signature check or
//! a log line, so malformed input is rejected at the boundary instead of
//! travelling further into the system.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Regex for validating mailbox slugs (lowercase, digits, `-` and `_`)
static MAILBOX_SLUG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9_-]{0,63}$").unwrap());

/// Regex for validating email addresses (one `@`, no whitespace, dotted domain)
static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// Regex for validating anonymous session IDs (UUID format)
static ANONYMOUS_SESSION_ID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}$").unwrap()
});

/// Maximum length for HTTP header values
pub const MAX_HEADER_VALUE_LENGTH: usize = 8192;

/// Maximum length for an email address (RFC 5321 path limit)
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length for a theme colour value
pub const MAX_THEME_VALUE_LENGTH: usize = 64;

/// Validation errors
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid mailbox slug: {0}")]
    InvalidMailboxSlug(String),

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Invalid anonymous session ID: {0}")]
    InvalidAnonymousSessionId(String),

    #[error("Header value too long: {0} bytes (max: {1})")]
    HeaderValueTooLong(usize, usize),

    #[error("Theme value too long: {0} bytes (max: {1})")]
    ThemeValueTooLong(usize, usize),
}

/// Truncate user input before echoing it into an error message
fn excerpt(value: &str) -> String {
    value.chars().take(50).collect()
}

/// Validate mailbox slug format
///
/// # Examples
///
/// ```
/// use widget_gate_common::validation::validate_mailbox_slug;
///
/// assert!(validate_mailbox_slug("acme").is_ok());
/// assert!(validate_mailbox_slug("Acme Corp").is_err());
/// assert!(validate_mailbox_slug("").is_err());
/// ```
pub fn validate_mailbox_slug(slug: &str) -> Result<(), ValidationError> {
    if !MAILBOX_SLUG_REGEX.is_match(slug) {
        return Err(ValidationError::InvalidMailboxSlug(excerpt(slug)));
    }
    Ok(())
}

/// Validate an email address
///
/// This is a shape check, not deliverability: it guards lookups and HMAC
/// inputs against whitespace, missing domains and oversized values.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.len() > MAX_EMAIL_LENGTH || !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail(excerpt(email)));
    }
    Ok(())
}

/// Validate anonymous session ID format
pub fn validate_anonymous_session_id(id: &str) -> Result<(), ValidationError> {
    if !ANONYMOUS_SESSION_ID_REGEX.is_match(id) {
        return Err(ValidationError::InvalidAnonymousSessionId(excerpt(id)));
    }
    Ok(())
}

/// Validate a theme colour value before it is embedded in a token
pub fn validate_theme_value(value: &str) -> Result<(), ValidationError> {
    if value.len() > MAX_THEME_VALUE_LENGTH {
        return Err(ValidationError::ThemeValueTooLong(
            value.len(),
            MAX_THEME_VALUE_LENGTH,
        ));
    }
    Ok(())
}

/// Sanitize HTTP header value
///
/// - Removes dangerous control characters (except tab)
/// - Enforces length limits
pub fn sanitize_header_value(value: &str) -> Result<String, ValidationError> {
    if value.len() > MAX_HEADER_VALUE_LENGTH {
        return Err(ValidationError::HeaderValueTooLong(
            value.len(),
            MAX_HEADER_VALUE_LENGTH,
        ));
    }

    let sanitized: String = value
        .chars()
        .filter(|c| !c.is_control() || *c == '\t')
        .collect();

    Ok(sanitized)
}
