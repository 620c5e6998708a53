//! Widget request authentication
//!
//! Bearer-authenticated calls go Received → token → session → tenant. Signed
//! server-to-server calls resolve the tenant first and then check the
//! timestamped HMAC against that tenant's secret.

use tracing::{debug, warn};
use widget_gate_common::constants::{SIGNATURE_HEADER, TIMESTAMP_HEADER};
use widget_gate_common::signature::verify_timestamped_hmac;
use widget_gate_common::{Mailbox, Result, WidgetError, WidgetRequest, WidgetSession};

use crate::AppState;
use crate::error_handling::sanitize_error;
use crate::store::MailboxStore;

/// Identity established for a bearer-authenticated widget call
#[derive(Debug, Clone)]
pub struct WidgetAuthContext {
    pub session: WidgetSession,
    pub mailbox: Mailbox,
}

/// Pull the bearer token out of the `Authorization` header
pub fn extract_bearer_token(request: &WidgetRequest) -> Result<&str> {
    request.bearer_token().ok_or_else(|| {
        debug!("Request without bearer token");
        WidgetError::MissingCredential
    })
}

/// Resolve a mailbox by slug
///
/// A store failure is an internal error, never a 404.
pub async fn resolve_mailbox<S: MailboxStore>(state: &AppState<S>, slug: &str) -> Result<Mailbox> {
    match state.store.find_by_slug(slug).await {
        Ok(Some(mailbox)) => Ok(mailbox),
        Ok(None) => {
            warn!("Mailbox not found: {}", slug);
            Err(WidgetError::TenantNotFound(slug.to_string()))
        }
        Err(e) => Err(sanitize_error(&e)),
    }
}

/// Authenticate a widget call carrying a session token
pub async fn authenticate_widget_request<S: MailboxStore>(
    request: &WidgetRequest,
    state: &AppState<S>,
) -> Result<WidgetAuthContext> {
    let token = extract_bearer_token(request)?;
    let session = state.codec.verify_session_at(token, state.now_secs())?;
    let mailbox = resolve_mailbox(state, &session.mailbox_slug).await?;

    debug!(
        "Authenticated widget session for mailbox {} (anonymous: {})",
        mailbox.slug, session.is_anonymous
    );

    Ok(WidgetAuthContext { session, mailbox })
}

/// Authenticate a server-to-server call signed with the mailbox secret
pub async fn authenticate_signed_request<S: MailboxStore>(
    request: &WidgetRequest,
    state: &AppState<S>,
    slug: &str,
) -> Result<Mailbox> {
    let mailbox = resolve_mailbox(state, slug).await?;

    verify_timestamped_hmac(
        &request.body,
        request.header(SIGNATURE_HEADER),
        request.header(TIMESTAMP_HEADER),
        &mailbox.widget_hmac_secret,
        state.now_secs(),
    )
    .inspect_err(|e| warn!("Signed request for mailbox {} rejected: {}", slug, e))?;

    Ok(mailbox)
}
