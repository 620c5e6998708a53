//! Widget session endpoint
//!
//! `POST /api/widget/session` mints a session for a visitor on a mailbox's
//! widget. Identified visitors must present an email hash signed with the
//! mailbox HMAC secret; anonymous visitors keep their anonymous session id
//! across token refreshes when they send back a still-valid token.
//!
//! `GET /api/widget/session` describes the session behind a bearer token.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, error, info};
use widget_gate_common::signature::verify_email_hash;
use widget_gate_common::utils::generate_anonymous_session_id;
use widget_gate_common::validation::validate_mailbox_slug;
use widget_gate_common::{
    Mailbox, ResponseInit, Result, WidgetError, WidgetRequest, WidgetResponse, WidgetSession,
    WidgetSessionParams, WidgetTheme, cors_response,
};

use crate::AppState;
use crate::auth::{authenticate_widget_request, resolve_mailbox};
use crate::router::SESSION_METHODS;
use crate::store::MailboxStore;

/// What the integrator's page reports about the visitor
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CustomerMetadata {
    #[serde(default)]
    pub name: Option<String>,
    /// Revenue or lifetime value, compared against the mailbox display minimum
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub links: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MintSessionRequest {
    pub mailbox_slug: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_hash: Option<String>,
    /// Unix milliseconds the email hash was computed at
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub customer_metadata: Option<CustomerMetadata>,
    /// Token the widget currently holds, if any
    #[serde(default)]
    pub current_token: Option<String>,
    #[serde(default, rename = "currentURL")]
    pub current_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MintSessionResponse {
    pub token: String,
    pub show_widget: bool,
    /// RFC 3339 expiry of `token`
    pub expires_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MailboxSummary<'a> {
    slug: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    widget_host: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct DescribeSessionResponse<'a> {
    session: &'a WidgetSession,
    mailbox: MailboxSummary<'a>,
}

fn parse_mint_request(request: &WidgetRequest) -> Result<MintSessionRequest> {
    request.json().map_err(|e| {
        debug!("Rejecting session request body: {}", e);
        WidgetError::BadRequest("Invalid request parameters".to_string())
    })
}

fn rfc3339(timestamp: i64) -> Result<String> {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.to_rfc3339())
        .ok_or_else(|| WidgetError::Internal(format!("Timestamp out of range: {}", timestamp)))
}

/// Theme stored on the mailbox, checked before it is embedded in a token
///
/// A bad stored value is a server-side data problem, not a client error.
fn mailbox_theme(mailbox: &Mailbox) -> Result<Option<WidgetTheme>> {
    let Some(theme) = mailbox.theme.clone() else {
        return Ok(None);
    };
    theme.validate().map_err(|e| {
        error!("Mailbox {} has an invalid stored theme: {}", mailbox.slug, e);
        WidgetError::Internal(format!("Invalid theme stored for mailbox {}", mailbox.slug))
    })?;
    Ok(Some(theme))
}

/// Anonymous session id to carry forward from the token the widget holds
///
/// Only a token that still verifies, belongs to the same mailbox and is
/// itself anonymous donates its id.
fn reusable_anonymous_id<S: MailboxStore>(
    state: &AppState<S>,
    current_token: Option<&str>,
    mailbox_slug: &str,
) -> Option<String> {
    let token = current_token.map(str::trim).filter(|t| !t.is_empty())?;
    let session = state.codec.verify_session_at(token, state.now_secs()).ok()?;
    if session.mailbox_slug != mailbox_slug || !session.is_anonymous {
        return None;
    }
    session.anonymous_session_id
}

fn identified_params(
    mailbox: &Mailbox,
    email: &str,
    body: &MintSessionRequest,
    now_ms: i64,
    max_age_secs: i64,
) -> Result<WidgetSessionParams> {
    let (Some(hash), Some(timestamp)) = (body.email_hash.as_deref(), body.timestamp) else {
        return Err(WidgetError::Authentication(
            "email hash and timestamp are required with an email".to_string(),
        ));
    };

    verify_email_hash(
        email,
        hash,
        timestamp,
        &mailbox.widget_hmac_secret,
        now_ms,
        max_age_secs,
    )?;

    Ok(WidgetSessionParams::new(mailbox.slug.clone()).with_email(email))
}

/// `POST /api/widget/session`
pub async fn handle_mint_session<S: MailboxStore>(
    state: &AppState<S>,
    request: &WidgetRequest,
) -> Result<WidgetResponse> {
    let body = parse_mint_request(request)?;
    validate_mailbox_slug(&body.mailbox_slug)?;

    let mailbox = resolve_mailbox(state, &body.mailbox_slug).await?;

    let email = body
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());

    let params = match email {
        Some(email) => identified_params(
            &mailbox,
            email,
            &body,
            state.now_millis(),
            state.config.email_hash_max_age_secs,
        )?,
        None => {
            let anonymous_id = reusable_anonymous_id(state, body.current_token.as_deref(), &mailbox.slug)
                .unwrap_or_else(generate_anonymous_session_id);
            WidgetSessionParams::new(mailbox.slug.clone()).with_anonymous_session_id(anonymous_id)
        }
    };

    let customer_value = body.customer_metadata.as_ref().and_then(|m| m.value);
    let show_widget = mailbox.should_show_widget(customer_value);

    let mut params = params
        .with_show_widget(show_widget)
        .with_whitelabel(mailbox.is_whitelabel);
    if let Some(theme) = mailbox_theme(&mailbox)? {
        params = params.with_theme(theme);
    }

    let issued_at = state.now_secs();
    let token = state.codec.create_session_at(params, issued_at)?;

    info!(
        "Minted {} widget session for mailbox {} (page: {})",
        if email.is_some() { "identified" } else { "anonymous" },
        mailbox.slug,
        body.current_url.as_deref().unwrap_or("-")
    );

    let response = MintSessionResponse {
        token,
        show_widget,
        expires_at: rfc3339(state.codec.expires_at(issued_at))?,
    };

    cors_response(
        &response,
        ResponseInit::default().with_header("cache-control", "no-store"),
        SESSION_METHODS,
    )
}

/// `GET /api/widget/session`
pub async fn handle_describe_session<S: MailboxStore>(
    state: &AppState<S>,
    request: &WidgetRequest,
) -> Result<WidgetResponse> {
    let ctx = authenticate_widget_request(request, state).await?;

    let response = DescribeSessionResponse {
        session: &ctx.session,
        mailbox: MailboxSummary {
            slug: &ctx.mailbox.slug,
            name: &ctx.mailbox.name,
            widget_host: ctx.mailbox.widget_host.as_deref(),
        },
    };

    cors_response(&response, ResponseInit::default(), SESSION_METHODS)
}
