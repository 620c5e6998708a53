//! Cross-origin envelope for widget responses
//!
//! The widget is embedded on arbitrary third-party sites, so every widget
//! endpoint answers with `Access-Control-Allow-Origin: *`. This is only sound
//! because authentication travels in the `Authorization` header or an HMAC
//! signature and never in cookies; the envelope refuses to emit `Set-Cookie`.

use http::Method;
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

use crate::constants::{CORS_ALLOW_HEADERS, CORS_ALLOW_ORIGIN};
use crate::error::{Result, WidgetError};
use crate::protocol::WidgetResponse;
use crate::validation::sanitize_header_value;

pub const ALLOW_ORIGIN: &str = "access-control-allow-origin";
pub const ALLOW_METHODS: &str = "access-control-allow-methods";
pub const ALLOW_HEADERS: &str = "access-control-allow-headers";

/// Status and extra headers a handler wants on its response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseInit {
    pub status: Option<u16>,
    pub headers: HashMap<String, String>,
}

impl ResponseInit {
    pub fn status(status: u16) -> Self {
        Self {
            status: Some(status),
            headers: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }
}

/// `"GET, PATCH, OPTIONS"` for `[GET, PATCH]`
fn allow_methods_value(methods: &[Method]) -> String {
    let mut names: Vec<&str> = methods
        .iter()
        .filter(|m| **m != Method::OPTIONS)
        .map(Method::as_str)
        .collect();
    names.dedup();
    names.push(Method::OPTIONS.as_str());
    names.join(", ")
}

/// The CORS header set for an endpoint serving `methods`
pub fn cors_headers(methods: &[Method]) -> HashMap<String, Vec<String>> {
    HashMap::from([
        (ALLOW_ORIGIN.to_string(), vec![CORS_ALLOW_ORIGIN.to_string()]),
        (ALLOW_METHODS.to_string(), vec![allow_methods_value(methods)]),
        (ALLOW_HEADERS.to_string(), vec![CORS_ALLOW_HEADERS.to_string()]),
    ])
}

/// Answer a preflight `OPTIONS` request
///
/// # Examples
///
/// ```
/// use http::Method;
/// use widget_gate_common::cors::cors_options;
///
/// let res = cors_options(&[Method::POST]);
/// assert_eq!(res.status_code, 204);
/// assert_eq!(res.header("access-control-allow-methods"), Some("POST, OPTIONS"));
/// ```
pub fn cors_options(methods: &[Method]) -> WidgetResponse {
    WidgetResponse {
        status_code: 204,
        headers: cors_headers(methods),
        body: String::new(),
    }
}

/// Wrap a JSON body in the CORS envelope
///
/// The status defaults to 200. Caller headers are merged over the defaults,
/// but the three CORS headers always keep their envelope values and
/// `set-cookie` is dropped.
pub fn cors_response<T: Serialize + ?Sized>(
    data: &T,
    init: ResponseInit,
    methods: &[Method],
) -> Result<WidgetResponse> {
    let body = serde_json::to_string(data)
        .map_err(|e| WidgetError::Internal(format!("Failed to serialize response: {}", e)))?;

    let mut headers: HashMap<String, Vec<String>> = HashMap::from([(
        "content-type".to_string(),
        vec!["application/json".to_string()],
    )]);

    for (name, value) in init.headers {
        let name = name.to_ascii_lowercase();
        if name == "set-cookie" {
            warn!("Dropping set-cookie from a wildcard-origin widget response");
            continue;
        }
        let value = sanitize_header_value(&value)?;
        headers.insert(name, vec![value]);
    }

    headers.extend(cors_headers(methods));

    Ok(WidgetResponse {
        status_code: init.status.unwrap_or(200),
        headers,
        body,
    })
}

/// The `{"error": ...}` envelope for a failure
pub fn cors_error(err: &WidgetError, methods: &[Method]) -> WidgetResponse {
    error_body(err.status_code(), &err.client_message(), methods)
}

/// The `{"error": ...}` envelope with an explicit status and message
pub fn error_body(status: u16, message: &str, methods: &[Method]) -> WidgetResponse {
    let body = serde_json::json!({ "error": message });
    let mut headers = cors_headers(methods);
    headers.insert(
        "content-type".to_string(),
        vec!["application/json".to_string()],
    );

    WidgetResponse {
        status_code: status,
        headers,
        body: body.to_string(),
    }
}
