use serde::Serialize;

use crate::session::WidgetSession;

/// Which customer records a widget session may see
///
/// Identified visitors are scoped by email, anonymous visitors by the
/// anonymous session id minted into their token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CustomerFilter {
    #[serde(rename = "email")]
    Email { email: String },
    #[serde(rename = "anonymous", rename_all = "camelCase")]
    AnonymousSession { anonymous_session_id: String },
}

impl CustomerFilter {
    /// Derive the filter from a verified session
    ///
    /// Returns `None` when the session carries neither an email nor an
    /// anonymous session id; callers answer such sessions with 401.
    pub fn from_session(session: &WidgetSession) -> Option<Self> {
        if let Some(email) = session.email.as_deref().filter(|e| !e.is_empty()) {
            return Some(CustomerFilter::Email {
                email: email.to_string(),
            });
        }
        if session.is_anonymous
            && let Some(id) = session
                .anonymous_session_id
                .as_deref()
                .filter(|id| !id.is_empty())
        {
            return Some(CustomerFilter::AnonymousSession {
                anonymous_session_id: id.to_string(),
            });
        }
        None
    }

    /// Whether a record owned by `owner_email` is visible to this customer
    ///
    /// Anonymous visitors only see records without an owner email; identified
    /// visitors only see their own.
    pub fn can_access(&self, owner_email: Option<&str>) -> bool {
        match self {
            CustomerFilter::Email { email } => owner_email == Some(email.as_str()),
            CustomerFilter::AnonymousSession { .. } => owner_email.is_none(),
        }
    }
}
