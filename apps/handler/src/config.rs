//! Cold-start configuration
//!
//! Read once from the environment in `main` and handed to [`crate::AppState`].

use anyhow::{Context, Result, anyhow, bail};
use std::fmt;
use std::time::Duration;
use widget_gate_common::constants::{EMAIL_HASH_MAX_AGE_SECS, SESSION_TTL_SECS};

const DEFAULT_MAILBOXES_TABLE: &str = "mailboxes";

#[derive(Clone)]
pub struct HandlerConfig {
    /// Server-held key for session tokens
    pub session_secret: String,
    pub mailboxes_table: String,
    pub session_ttl: Duration,
    /// How far an email hash timestamp may drift from now, in seconds
    pub email_hash_max_age_secs: i64,
}

impl fmt::Debug for HandlerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerConfig")
            .field("session_secret", &"<redacted>")
            .field("mailboxes_table", &self.mailboxes_table)
            .field("session_ttl", &self.session_ttl)
            .field("email_hash_max_age_secs", &self.email_hash_max_age_secs)
            .finish()
    }
}

impl HandlerConfig {
    pub fn new(session_secret: impl Into<String>) -> Self {
        Self {
            session_secret: session_secret.into(),
            mailboxes_table: DEFAULT_MAILBOXES_TABLE.to_string(),
            session_ttl: Duration::from_secs(SESSION_TTL_SECS as u64),
            email_hash_max_age_secs: EMAIL_HASH_MAX_AGE_SECS,
        }
    }

    /// Load from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let session_secret = lookup("WIDGET_SESSION_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| anyhow!("WIDGET_SESSION_SECRET environment variable not set"))?;

        let mut config = Self::new(session_secret);

        if let Some(table) = lookup("MAILBOXES_TABLE_NAME").filter(|t| !t.is_empty()) {
            config.mailboxes_table = table;
        }

        if let Some(ttl) = lookup("WIDGET_SESSION_TTL_SECS") {
            let secs: u64 = ttl
                .trim()
                .parse()
                .context("WIDGET_SESSION_TTL_SECS must be a whole number of seconds")?;
            if secs == 0 {
                bail!("WIDGET_SESSION_TTL_SECS must be positive");
            }
            config.session_ttl = Duration::from_secs(secs);
        }

        if let Some(max_age) = lookup("EMAIL_HASH_MAX_AGE_SECS") {
            let secs: i64 = max_age
                .trim()
                .parse()
                .context("EMAIL_HASH_MAX_AGE_SECS must be a whole number of seconds")?;
            if secs <= 0 {
                bail!("EMAIL_HASH_MAX_AGE_SECS must be positive");
            }
            config.email_hash_max_age_secs = secs;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<HandlerConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        HandlerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("WIDGET_SESSION_SECRET", "s3cret")]).unwrap();

        assert_eq!(config.session_secret, "s3cret");
        assert_eq!(config.mailboxes_table, "mailboxes");
        assert_eq!(config.session_ttl, Duration::from_secs(12 * 3600));
        assert_eq!(config.email_hash_max_age_secs, 3600);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("WIDGET_SESSION_SECRET", "s3cret"),
            ("MAILBOXES_TABLE_NAME", "widget-mailboxes-prod"),
            ("WIDGET_SESSION_TTL_SECS", "600"),
            ("EMAIL_HASH_MAX_AGE_SECS", "120"),
        ])
        .unwrap();

        assert_eq!(config.mailboxes_table, "widget-mailboxes-prod");
        assert_eq!(config.session_ttl, Duration::from_secs(600));
        assert_eq!(config.email_hash_max_age_secs, 120);
    }

    #[test]
    fn test_missing_secret() {
        let err = load(&[]).unwrap_err();
        assert!(err.to_string().contains("WIDGET_SESSION_SECRET"));

        assert!(load(&[("WIDGET_SESSION_SECRET", "  ")]).is_err());
    }

    #[test]
    fn test_invalid_numbers() {
        assert!(load(&[("WIDGET_SESSION_SECRET", "s"), ("WIDGET_SESSION_TTL_SECS", "soon")]).is_err());
        assert!(load(&[("WIDGET_SESSION_SECRET", "s"), ("WIDGET_SESSION_TTL_SECS", "0")]).is_err());
        assert!(load(&[("WIDGET_SESSION_SECRET", "s"), ("EMAIL_HASH_MAX_AGE_SECS", "-5")]).is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = HandlerConfig::new("super-secret-key");
        assert!(!format!("{:?}", config).contains("super-secret-key"));
    }
}
