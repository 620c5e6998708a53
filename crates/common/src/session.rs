//! Widget session tokens
//!
//! A session is a signed, time-limited JWT carrying the visitor's identity
//! and widget entitlements. Nothing is stored server side: any instance
//! holding the signing secret can verify a token on its own.
//!
//! `is_anonymous` is never accepted from a caller. It is derived from the
//! presence of an email when the token is minted and re-checked against the
//! email when the token is verified.

use std::fmt;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::SESSION_TTL_SECS;
use crate::error::{Result, WidgetError};
use crate::utils::current_timestamp_secs;
use crate::validation::{
    validate_anonymous_session_id, validate_email, validate_mailbox_slug, validate_theme_value,
};

/// Colour overrides applied by the widget
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WidgetTheme {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
}

impl WidgetTheme {
    /// Check every colour value against the length limit
    pub fn validate(&self) -> Result<()> {
        for value in [
            &self.background,
            &self.foreground,
            &self.primary,
            &self.accent,
        ]
        .into_iter()
        .flatten()
        {
            validate_theme_value(value)?;
        }
        Ok(())
    }
}

/// What the server supplies when minting a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetSessionParams {
    pub mailbox_slug: String,
    pub show_widget: bool,
    pub is_whitelabel: bool,
    pub theme: Option<WidgetTheme>,
    pub email: Option<String>,
    pub anonymous_session_id: Option<String>,
}

impl WidgetSessionParams {
    /// Params for an anonymous visitor of `mailbox_slug` with the widget shown
    pub fn new(mailbox_slug: impl Into<String>) -> Self {
        Self {
            mailbox_slug: mailbox_slug.into(),
            show_widget: true,
            is_whitelabel: false,
            theme: None,
            email: None,
            anonymous_session_id: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_anonymous_session_id(mut self, id: impl Into<String>) -> Self {
        self.anonymous_session_id = Some(id.into());
        self
    }

    pub fn with_theme(mut self, theme: WidgetTheme) -> Self {
        self.theme = Some(theme);
        self
    }

    pub fn with_show_widget(mut self, show_widget: bool) -> Self {
        self.show_widget = show_widget;
        self
    }

    pub fn with_whitelabel(mut self, is_whitelabel: bool) -> Self {
        self.is_whitelabel = is_whitelabel;
        self
    }

    /// Drop an empty email so that it counts as absent
    fn normalized(mut self) -> Self {
        if self.email.as_deref().is_some_and(|e| e.trim().is_empty()) {
            self.email = None;
        }
        self
    }

    fn validate(&self) -> Result<()> {
        validate_mailbox_slug(&self.mailbox_slug)?;
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(id) = &self.anonymous_session_id {
            validate_anonymous_session_id(id)?;
        }
        if let Some(theme) = &self.theme {
            theme.validate()?;
        }
        Ok(())
    }
}

/// A verified widget session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub mailbox_slug: String,
    pub is_anonymous: bool,
    pub is_whitelabel: bool,
    pub show_widget: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<WidgetTheme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymous_session_id: Option<String>,
}

impl WidgetSession {
    fn from_params(params: WidgetSessionParams) -> Self {
        Self {
            is_anonymous: params.email.is_none(),
            email: params.email,
            mailbox_slug: params.mailbox_slug,
            is_whitelabel: params.is_whitelabel,
            show_widget: params.show_widget,
            theme: params.theme,
            anonymous_session_id: params.anonymous_session_id,
        }
    }

    /// The params this session was minted from
    pub fn params(&self) -> WidgetSessionParams {
        WidgetSessionParams {
            mailbox_slug: self.mailbox_slug.clone(),
            show_widget: self.show_widget,
            is_whitelabel: self.is_whitelabel,
            theme: self.theme.clone(),
            email: self.email.clone(),
            anonymous_session_id: self.anonymous_session_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionClaims {
    #[serde(flatten)]
    session: WidgetSession,
    iat: i64,
    exp: i64,
}

/// Mints and verifies widget session tokens with a server-held secret
#[derive(Clone)]
pub struct SessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCodec")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl SessionCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl_secs: SESSION_TTL_SECS,
        }
    }

    /// Override the session lifetime
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        self
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Expiry timestamp of a token issued at `issued_at`
    pub fn expires_at(&self, issued_at: i64) -> i64 {
        issued_at.saturating_add(self.ttl_secs)
    }

    /// Mint a token valid from now
    pub fn create_session(&self, params: WidgetSessionParams) -> Result<String> {
        self.create_session_at(params, current_timestamp_secs())
    }

    /// Mint a token as if issued at `issued_at` (Unix seconds)
    pub fn create_session_at(&self, params: WidgetSessionParams, issued_at: i64) -> Result<String> {
        let params = params.normalized();
        params.validate()?;

        let claims = SessionClaims {
            session: WidgetSession::from_params(params),
            iat: issued_at,
            exp: self.expires_at(issued_at),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| WidgetError::Internal(format!("Failed to sign session: {}", e)))
    }

    /// Verify a token against the current time
    pub fn verify_session(&self, token: &str) -> Result<WidgetSession> {
        self.verify_session_at(token, current_timestamp_secs())
    }

    /// Verify a token against `now` (Unix seconds)
    ///
    /// Fails with [`WidgetError::InvalidSession`] on a bad signature, a
    /// malformed token, an expired token, or an anonymity flag that does not
    /// match the email.
    pub fn verify_session_at(&self, token: &str, now: i64) -> Result<WidgetSession> {
        // Expiry is checked below against the supplied clock
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                debug!("Session token rejected: {}", e);
                WidgetError::InvalidSession(e.to_string())
            })?
            .claims;

        if now >= claims.exp {
            debug!("Session token expired at {}", claims.exp);
            return Err(WidgetError::InvalidSession("token expired".to_string()));
        }

        let session = claims.session;
        if session.is_anonymous != session.email.is_none() {
            return Err(WidgetError::InvalidSession(
                "anonymity flag does not match email".to_string(),
            ));
        }

        Ok(session)
    }
}
