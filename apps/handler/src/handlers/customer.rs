//! `GET /api/chat/customer`
//!
//! Tells the widget which customer its session speaks for. Conversation
//! listings are scoped with the same filter. With `?ownerEmail=` the widget
//! asks whether a record owned by that email is visible to the session.

use tracing::{debug, warn};
use widget_gate_common::{
    CustomerFilter, ResponseInit, Result, WidgetError, WidgetRequest, WidgetResponse,
    cors_response,
};

use crate::AppState;
use crate::auth::authenticate_widget_request;
use crate::router::CUSTOMER_METHODS;
use crate::store::MailboxStore;

pub async fn handle_customer<S: MailboxStore>(
    state: &AppState<S>,
    request: &WidgetRequest,
) -> Result<WidgetResponse> {
    let ctx = authenticate_widget_request(request, state).await?;

    let filter = CustomerFilter::from_session(&ctx.session).ok_or_else(|| {
        warn!(
            "Session for mailbox {} has neither email nor anonymous id",
            ctx.mailbox.slug
        );
        WidgetError::Unauthorized
    })?;

    if let Some(owner) = request.query.get("ownerEmail").map(|o| o.trim()) {
        let owner = (!owner.is_empty()).then_some(owner);
        if !filter.can_access(owner) {
            debug!(
                "Customer of mailbox {} denied record owned by {:?}",
                ctx.mailbox.slug, owner
            );
            return Err(WidgetError::Forbidden(
                "Customer does not own this record".to_string(),
            ));
        }
    }

    cors_response(&filter, ResponseInit::default(), CUSTOMER_METHODS)
}
