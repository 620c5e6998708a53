//! Error handling and sanitization
//!
//! Infrastructure failures are logged in full and reach the client only as
//! `"Internal server error"`. Every other failure kind is turned into its
//! CORS-wrapped `{"error": ...}` envelope here.

use http::Method;
use tracing::{error, warn};
use widget_gate_common::{WidgetError, WidgetResponse, cors_error};

/// Convert an infrastructure failure into an opaque internal error
///
/// Logs the full error chain; the returned error's client message is generic.
///
/// # Examples
///
/// ```
/// use anyhow::anyhow;
/// use widget_gate_handler::error_handling::sanitize_error;
///
/// let err = anyhow!("Failed to query DynamoDB: AccessDeniedException");
/// let sanitized = sanitize_error(&err);
/// assert_eq!(sanitized.client_message(), "Internal server error");
/// ```
pub fn sanitize_error(e: &anyhow::Error) -> WidgetError {
    error!("Internal error: {:#}", e);
    WidgetError::Internal(format!("{:#}", e))
}

/// Build the client response for a failed request on `route`
pub fn error_response(err: &WidgetError, route: &str, methods: &[Method]) -> WidgetResponse {
    if err.is_internal() {
        error!("{} failed: {}", route, err);
    } else {
        warn!("{} rejected with {}: {}", route, err.status_code(), err);
    }
    cors_error(err, methods)
}
