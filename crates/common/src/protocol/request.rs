use http::Method;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

use crate::error::{Result, WidgetError};

/// A widget API request, independent of the hosting runtime
#[derive(Debug, Clone)]
pub struct WidgetRequest {
    /// HTTP method (GET, POST, OPTIONS, ...)
    pub method: Method,

    /// Request path without query string
    /// Example: "/api/widget/session"
    pub path: String,

    /// Query string parameters (first value wins)
    pub query: HashMap<String, String>,

    /// HTTP headers as a map of lowercase header name to list of values
    pub headers: HashMap<String, Vec<String>>,

    /// Raw request body
    pub body: Vec<u8>,
}

impl WidgetRequest {
    /// Create a new request with no headers, query or body
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: HashMap::new(),
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Add a header (name is stored lowercase)
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.into());
        self
    }

    /// Set a query string parameter
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Replace the body
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// First value of a header, looked up case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }

    /// Token from an `Authorization: Bearer <token>` header
    ///
    /// The scheme is matched case-insensitively; a blank token counts as absent.
    pub fn bearer_token(&self) -> Option<&str> {
        let value = self.header("authorization")?.trim();
        let (scheme, token) = value.split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }
        let token = token.trim();
        (!token.is_empty()).then_some(token)
    }

    /// Check if the request has a body
    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }

    /// Parse the body as JSON into `T`
    ///
    /// An empty or malformed body is a [`WidgetError::BadRequest`].
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        if !self.has_body() {
            return Err(WidgetError::BadRequest("Request body is required".to_string()));
        }
        Ok(serde_json::from_slice(&self.body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_widget_request_creation() {
        let req = WidgetRequest::new(Method::GET, "/api/widget/session");

        assert_eq!(req.method, Method::GET);
        assert_eq!(req.path, "/api/widget/session");
        assert!(req.headers.is_empty());
        assert!(req.query.is_empty());
        assert!(!req.has_body());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let req = WidgetRequest::new(Method::GET, "/")
            .with_header("Content-Type", "application/json")
            .with_header("X-Helper-Signature", "abc");

        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("CONTENT-TYPE"), Some("application/json"));
        assert_eq!(req.header("x-helper-signature"), Some("abc"));
        assert_eq!(req.header("missing"), None);
    }

    #[test]
    fn test_bearer_token_extraction() {
        let req = WidgetRequest::new(Method::GET, "/").with_header("Authorization", "Bearer abc.def");
        assert_eq!(req.bearer_token(), Some("abc.def"));

        let req = WidgetRequest::new(Method::GET, "/").with_header("authorization", "bearer  tok ");
        assert_eq!(req.bearer_token(), Some("tok"));
    }

    #[test]
    fn test_bearer_token_absent() {
        let none = WidgetRequest::new(Method::GET, "/");
        assert_eq!(none.bearer_token(), None);

        let basic = WidgetRequest::new(Method::GET, "/").with_header("authorization", "Basic dXNlcg==");
        assert_eq!(basic.bearer_token(), None);

        let blank = WidgetRequest::new(Method::GET, "/").with_header("authorization", "Bearer ");
        assert_eq!(blank.bearer_token(), None);

        let bare = WidgetRequest::new(Method::GET, "/").with_header("authorization", "Bearer");
        assert_eq!(bare.bearer_token(), None);
    }

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Body {
        name: String,
    }

    #[test]
    fn test_json_body() {
        let req = WidgetRequest::new(Method::POST, "/").with_body(r#"{"name":"widget"}"#);
        let body: Body = req.json().unwrap();
        assert_eq!(body.name, "widget");
    }

    #[test]
    fn test_json_body_rejects_bad_shape() {
        let empty = WidgetRequest::new(Method::POST, "/");
        assert!(matches!(
            empty.json::<Body>(),
            Err(WidgetError::BadRequest(_))
        ));

        let unknown = WidgetRequest::new(Method::POST, "/").with_body(r#"{"name":"w","extra":1}"#);
        assert!(unknown.json::<Body>().is_err());

        let garbage = WidgetRequest::new(Method::POST, "/").with_body("not json");
        assert!(garbage.json::<Body>().is_err());
    }
}
