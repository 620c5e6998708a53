//! Widget API Lambda handler
//!
//! Converts API Gateway proxy events into [`WidgetRequest`]s, routes them,
//! and wraps every answer (success or failure) in the CORS envelope.

use aws_lambda_events::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use aws_lambda_events::encodings::Body;
use http::Method;
use std::collections::HashMap;
use tracing::debug;
use widget_gate_common::cors::error_body;
use widget_gate_common::utils::{current_timestamp_millis, decode_body, headers_to_map, map_to_headers};
use widget_gate_common::{Result, SessionCodec, WidgetRequest, WidgetResponse, cors_options};

pub mod auth;
pub mod config;
pub mod error_handling;
pub mod handlers;
pub mod router;
pub mod store;

use config::HandlerConfig;
use error_handling::error_response;
use router::Route;
use store::MailboxStore;

/// Everything a request needs, built once at cold start
pub struct AppState<S> {
    pub codec: SessionCodec,
    pub store: S,
    pub config: HandlerConfig,
    /// Unix milliseconds
    clock: fn() -> i64,
}

impl<S: MailboxStore> AppState<S> {
    pub fn new(config: HandlerConfig, store: S) -> Self {
        let codec =
            SessionCodec::new(config.session_secret.as_bytes()).with_ttl(config.session_ttl);
        Self {
            codec,
            store,
            config,
            clock: current_timestamp_millis,
        }
    }

    /// Replace the wall clock
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    pub fn now_millis(&self) -> i64 {
        (self.clock)()
    }

    pub fn now_secs(&self) -> i64 {
        self.now_millis().div_euclid(1000)
    }
}

/// Build a [`WidgetRequest`] from an API Gateway event
///
/// Base64 bodies are decoded and the body size limit is enforced here.
pub fn build_widget_request(request: &ApiGatewayProxyRequest) -> Result<WidgetRequest> {
    let path = request.path.as_deref().unwrap_or("/").to_string();

    let mut query = HashMap::new();
    for (key, value) in request.query_string_parameters.iter() {
        query
            .entry(key.to_string())
            .or_insert_with(|| value.to_string());
    }

    let mut headers = headers_to_map(&request.multi_value_headers);
    for (name, values) in headers_to_map(&request.headers) {
        headers.entry(name).or_insert(values);
    }

    let body = decode_body(request.body.as_deref(), request.is_base64_encoded)?;

    Ok(WidgetRequest {
        method: request.http_method.clone(),
        path,
        query,
        headers,
        body,
    })
}

/// Convert a [`WidgetResponse`] into the API Gateway response shape
pub fn build_api_gateway_response(response: WidgetResponse) -> ApiGatewayProxyResponse {
    let body = if response.has_body() {
        Some(Body::Text(response.body))
    } else {
        None
    };

    ApiGatewayProxyResponse {
        status_code: response.status_code as i64,
        headers: map_to_headers(&response.headers),
        multi_value_headers: Default::default(),
        body,
        is_base64_encoded: false,
    }
}

/// Methods to advertise for `path`; unknown paths only advertise `OPTIONS`
pub fn methods_for_path(path: &str) -> &'static [Method] {
    Route::match_path(path).map(|r| r.methods()).unwrap_or(&[])
}

/// Route a request and produce its response
///
/// `OPTIONS` on a known path is answered before any authentication.
pub async fn handle_request<S: MailboxStore>(
    state: &AppState<S>,
    request: WidgetRequest,
) -> WidgetResponse {
    let Some(route) = Route::match_path(&request.path) else {
        debug!("No route for {} {}", request.method, request.path);
        return error_body(404, "Not found", &[]);
    };
    let methods = route.methods();

    if request.method == Method::OPTIONS {
        return cors_options(methods);
    }

    if !methods.contains(&request.method) {
        debug!("{} does not serve {}", route.name(), request.method);
        return error_body(405, "Method not allowed", methods);
    }

    let result = match &route {
        Route::WidgetSession if request.method == Method::POST => {
            handlers::handle_mint_session(state, &request).await
        }
        Route::WidgetSession => handlers::handle_describe_session(state, &request).await,
        Route::ChatCustomer => handlers::handle_customer(state, &request).await,
        Route::MailboxWebhook { slug } => handlers::handle_webhook(state, &request, slug).await,
    };

    match result {
        Ok(response) => {
            debug!("{} answered {}", route.name(), response.status_code);
            response
        }
        Err(err) => error_response(&err, route.name(), methods),
    }
}

/// Handle one API Gateway event end to end
pub async fn handle_api_gateway_event<S: MailboxStore>(
    state: &AppState<S>,
    event: &ApiGatewayProxyRequest,
) -> ApiGatewayProxyResponse {
    let response = match build_widget_request(event) {
        Ok(request) => handle_request(state, request).await,
        Err(err) => {
            let path = event.path.as_deref().unwrap_or("/");
            error_response(&err, path, methods_for_path(path))
        }
    };
    build_api_gateway_response(response)
}
