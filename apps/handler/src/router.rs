//! Path routing for the widget API

use http::Method;
use once_cell::sync::Lazy;
use regex::Regex;

pub const SESSION_METHODS: &[Method] = &[Method::GET, Method::POST];
pub const CUSTOMER_METHODS: &[Method] = &[Method::GET];
pub const WEBHOOK_METHODS: &[Method] = &[Method::POST];

static WEBHOOK_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/api/mailboxes/([^/]+)/webhook$").expect("Invalid webhook path regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/api/widget/session`
    WidgetSession,
    /// `/api/chat/customer`
    ChatCustomer,
    /// `/api/mailboxes/{slug}/webhook`
    MailboxWebhook { slug: String },
}

impl Route {
    /// Match a request path; a single trailing slash is ignored
    pub fn match_path(path: &str) -> Option<Route> {
        let path = match path.strip_suffix('/') {
            Some(stripped) if !stripped.is_empty() => stripped,
            _ => path,
        };

        match path {
            "/api/widget/session" => Some(Route::WidgetSession),
            "/api/chat/customer" => Some(Route::ChatCustomer),
            _ => WEBHOOK_PATH.captures(path).map(|caps| Route::MailboxWebhook {
                slug: caps[1].to_string(),
            }),
        }
    }

    /// Methods this route serves, besides `OPTIONS`
    pub fn methods(&self) -> &'static [Method] {
        match self {
            Route::WidgetSession => SESSION_METHODS,
            Route::ChatCustomer => CUSTOMER_METHODS,
            Route::MailboxWebhook { .. } => WEBHOOK_METHODS,
        }
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Route::WidgetSession => "widget-session",
            Route::ChatCustomer => "chat-customer",
            Route::MailboxWebhook { .. } => "mailbox-webhook",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_static_routes() {
        assert_eq!(
            Route::match_path("/api/widget/session"),
            Some(Route::WidgetSession)
        );
        assert_eq!(
            Route::match_path("/api/widget/session/"),
            Some(Route::WidgetSession)
        );
        assert_eq!(
            Route::match_path("/api/chat/customer"),
            Some(Route::ChatCustomer)
        );
    }

    #[test]
    fn test_match_webhook_route() {
        assert_eq!(
            Route::match_path("/api/mailboxes/acme/webhook"),
            Some(Route::MailboxWebhook {
                slug: "acme".to_string()
            })
        );
        assert_eq!(Route::match_path("/api/mailboxes//webhook"), None);
        assert_eq!(Route::match_path("/api/mailboxes/a/b/webhook"), None);
    }

    #[test]
    fn test_unknown_paths() {
        for path in ["/", "", "/api", "/api/widget", "/api/widget/session/extra"] {
            assert_eq!(Route::match_path(path), None, "Should not match {}", path);
        }
    }

    #[test]
    fn test_route_methods() {
        assert_eq!(Route::WidgetSession.methods(), &[Method::GET, Method::POST]);
        assert_eq!(Route::ChatCustomer.methods(), &[Method::GET]);
        assert_eq!(
            Route::MailboxWebhook {
                slug: "acme".to_string()
            }
            .methods(),
            &[Method::POST]
        );
    }
}
