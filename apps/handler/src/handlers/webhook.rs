//! `POST /api/mailboxes/{slug}/webhook`
//!
//! Server-to-server callbacks signed with the mailbox HMAC secret over
//! `"{timestamp}.{body}"`. Events are acknowledged and logged.

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};
use widget_gate_common::validation::validate_mailbox_slug;
use widget_gate_common::{
    ResponseInit, Result, WidgetError, WidgetRequest, WidgetResponse, cors_response,
};

use crate::AppState;
use crate::auth::authenticate_signed_request;
use crate::router::WEBHOOK_METHODS;
use crate::store::MailboxStore;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

pub async fn handle_webhook<S: MailboxStore>(
    state: &AppState<S>,
    request: &WidgetRequest,
    slug: &str,
) -> Result<WidgetResponse> {
    validate_mailbox_slug(slug)?;

    // Body is parsed only once the signature checks out
    let mailbox = authenticate_signed_request(request, state, slug).await?;

    let event: WebhookEvent = request.json().map_err(|e| {
        debug!("Malformed webhook body for mailbox {}: {}", slug, e);
        WidgetError::BadRequest("Invalid webhook payload".to_string())
    })?;

    if event.event.trim().is_empty() {
        return Err(WidgetError::BadRequest("Invalid webhook payload".to_string()));
    }

    info!(
        "Received webhook event {} for mailbox {} ({} bytes)",
        event.event,
        mailbox.slug,
        request.body.len()
    );

    cors_response(
        &json!({ "received": true, "event": event.event }),
        ResponseInit::default(),
        WEBHOOK_METHODS,
    )
}
