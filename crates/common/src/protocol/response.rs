use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A widget API response, independent of the hosting runtime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetResponse {
    /// HTTP status code (200, 204, 401, ...)
    pub status_code: u16,

    /// Response headers as a map of header name to list of values
    pub headers: HashMap<String, Vec<String>>,

    /// Response body (JSON text, or empty)
    #[serde(default)]
    pub body: String,
}

impl WidgetResponse {
    /// Create a new response with no headers and no body
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            headers: HashMap::new(),
            body: String::new(),
        }
    }

    /// First value of a header, looked up case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }

    /// Parse the body as JSON
    pub fn json_body(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }

    /// Check if the response has a body
    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }

    /// Check if the response is successful (2xx status code)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Check if the response is a client error (4xx status code)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code)
    }

    /// Check if the response is a server error (5xx status code)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status_code)
    }
}
