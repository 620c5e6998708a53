use thiserror::Error;

use crate::validation::ValidationError;

/// Failure kinds at the widget API boundary
///
/// Every variant maps to one HTTP status and one client-facing message. The
/// `Display` text is for logs and may carry detail that must not reach the
/// client; use [`WidgetError::client_message`] when building a response.
#[derive(Error, Debug)]
pub enum WidgetError {
    #[error("Missing bearer credential")]
    MissingCredential,

    #[error("Invalid session token: {0}")]
    InvalidSession(String),

    #[error("Mailbox not found: {0}")]
    TenantNotFound(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Session carries no customer identity")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Request entity too large: {0} bytes")]
    PayloadTooLarge(usize),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WidgetError {
    /// HTTP status code for this failure
    pub fn status_code(&self) -> u16 {
        match self {
            WidgetError::MissingCredential
            | WidgetError::InvalidSession(_)
            | WidgetError::Authentication(_)
            | WidgetError::Unauthorized => 401,
            WidgetError::Forbidden(_) => 403,
            WidgetError::TenantNotFound(_) => 404,
            WidgetError::BadRequest(_) => 400,
            WidgetError::PayloadTooLarge(_) => 413,
            WidgetError::Internal(_) => 500,
        }
    }

    /// Message safe to put in the `{"error": ...}` envelope
    pub fn client_message(&self) -> String {
        match self {
            WidgetError::MissingCredential => "Missing authorization token".to_string(),
            WidgetError::InvalidSession(_) => "Invalid or expired token".to_string(),
            WidgetError::TenantNotFound(_) => "Mailbox not found".to_string(),
            WidgetError::Authentication(_) => "Invalid signature".to_string(),
            WidgetError::Unauthorized => "Not authorized - Invalid session".to_string(),
            WidgetError::Forbidden(reason) | WidgetError::BadRequest(reason) => reason.clone(),
            WidgetError::PayloadTooLarge(_) => "Request entity too large".to_string(),
            WidgetError::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// Whether the failure originates on the server side
    pub fn is_internal(&self) -> bool {
        matches!(self, WidgetError::Internal(_))
    }
}

impl From<ValidationError> for WidgetError {
    fn from(err: ValidationError) -> Self {
        WidgetError::BadRequest(err.to_string())
    }
}

impl From<serde_json::Error> for WidgetError {
    fn from(_: serde_json::Error) -> Self {
        WidgetError::BadRequest("Invalid request body".to_string())
    }
}

/// Type alias for Results using WidgetError
pub type Result<T> = std::result::Result<T, WidgetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WidgetError::TenantNotFound("acme".to_string());
        assert_eq!(err.to_string(), "Mailbox not found: acme");

        let err = WidgetError::MissingCredential;
        assert_eq!(err.to_string(), "Missing bearer credential");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(WidgetError::MissingCredential.status_code(), 401);
        assert_eq!(
            WidgetError::InvalidSession("expired".into()).status_code(),
            401
        );
        assert_eq!(WidgetError::TenantNotFound("x".into()).status_code(), 404);
        assert_eq!(
            WidgetError::Authentication("mismatch".into()).status_code(),
            401
        );
        assert_eq!(WidgetError::Unauthorized.status_code(), 401);
        assert_eq!(WidgetError::Forbidden("no".into()).status_code(), 403);
        assert_eq!(WidgetError::BadRequest("bad".into()).status_code(), 400);
        assert_eq!(WidgetError::PayloadTooLarge(10).status_code(), 413);
        assert_eq!(WidgetError::Internal("db".into()).status_code(), 500);
    }

    #[test]
    fn test_client_message_hides_detail() {
        let err = WidgetError::InvalidSession("ExpiredSignature".into());
        assert_eq!(err.client_message(), "Invalid or expired token");

        let err = WidgetError::Internal("DynamoDB throttled at 10.0.1.5".into());
        assert_eq!(err.client_message(), "Internal server error");
        assert!(err.is_internal());

        let err = WidgetError::TenantNotFound("secret-slug".into());
        assert!(!err.client_message().contains("secret-slug"));
    }

    #[test]
    fn test_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: WidgetError = json_err.into();
        assert!(matches!(err, WidgetError::BadRequest(_)));
        assert_eq!(err.client_message(), "Invalid request body");

        let err: WidgetError = ValidationError::InvalidEmail("nope".into()).into();
        assert_eq!(err.status_code(), 400);
    }
}
