//! Shared types for the widget session gateway
//!
//! Session tokens, HMAC signatures, the CORS response envelope and the
//! runtime-independent request/response types used by both the Lambda
//! handler and the `wgctl` CLI.

pub mod constants;
pub mod cors;
pub mod error;
pub mod models;
pub mod protocol;
pub mod session;
pub mod signature;
pub mod utils;
pub mod validation;

pub use cors::{ResponseInit, cors_error, cors_options, cors_response};
pub use error::{Result, WidgetError};
pub use models::{CustomerFilter, Mailbox, WidgetDisplayMode};
pub use protocol::{WidgetRequest, WidgetResponse};
pub use session::{SessionCodec, WidgetSession, WidgetSessionParams, WidgetTheme};
pub use utils::{
    current_timestamp_millis, current_timestamp_secs, decode_body, encode_body,
    generate_anonymous_session_id, generate_hmac_secret, headers_to_map, map_to_headers,
};
