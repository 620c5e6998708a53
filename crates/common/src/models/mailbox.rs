use serde::{Deserialize, Serialize};
use std::fmt;

use crate::session::WidgetTheme;

/// When the widget launcher is shown to a visitor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetDisplayMode {
    #[default]
    Always,
    Off,
    /// Only for customers whose reported value reaches the mailbox minimum
    RevenueBased,
}

/// A tenant's support inbox, as stored in the mailboxes table
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mailbox {
    pub id: i64,

    /// Unique slug used to address the mailbox
    pub slug: String,

    /// Display name
    pub name: String,

    /// Shared secret for customer email hashes and signed callbacks
    #[serde(rename = "widgetHMACSecret")]
    pub widget_hmac_secret: String,

    #[serde(default)]
    pub widget_display_mode: WidgetDisplayMode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget_display_min_value: Option<f64>,

    /// Origin the widget is normally embedded on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget_host: Option<String>,

    #[serde(default)]
    pub is_whitelabel: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<WidgetTheme>,
}

impl fmt::Debug for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailbox")
            .field("id", &self.id)
            .field("slug", &self.slug)
            .field("name", &self.name)
            .field("widget_hmac_secret", &"<redacted>")
            .field("widget_display_mode", &self.widget_display_mode)
            .field("widget_display_min_value", &self.widget_display_min_value)
            .field("widget_host", &self.widget_host)
            .field("is_whitelabel", &self.is_whitelabel)
            .finish_non_exhaustive()
    }
}

impl Mailbox {
    /// Create a mailbox with default widget settings
    pub fn new(
        id: i64,
        slug: impl Into<String>,
        name: impl Into<String>,
        widget_hmac_secret: impl Into<String>,
    ) -> Self {
        Self {
            id,
            slug: slug.into(),
            name: name.into(),
            widget_hmac_secret: widget_hmac_secret.into(),
            widget_display_mode: WidgetDisplayMode::default(),
            widget_display_min_value: None,
            widget_host: None,
            is_whitelabel: false,
            theme: None,
        }
    }

    pub fn with_display_mode(mut self, mode: WidgetDisplayMode, min_value: Option<f64>) -> Self {
        self.widget_display_mode = mode;
        self.widget_display_min_value = min_value;
        self
    }

    pub fn with_theme(mut self, theme: WidgetTheme) -> Self {
        self.theme = Some(theme);
        self
    }

    pub fn with_widget_host(mut self, host: impl Into<String>) -> Self {
        self.widget_host = Some(host.into());
        self
    }

    pub fn with_whitelabel(mut self, is_whitelabel: bool) -> Self {
        self.is_whitelabel = is_whitelabel;
        self
    }

    /// Decide whether the launcher is shown for a customer of `customer_value`
    pub fn should_show_widget(&self, customer_value: Option<f64>) -> bool {
        match self.widget_display_mode {
            WidgetDisplayMode::Always => true,
            WidgetDisplayMode::Off => false,
            WidgetDisplayMode::RevenueBased => match (customer_value, self.widget_display_min_value)
            {
                (_, None) => true,
                (Some(value), Some(min)) => value >= min,
                (None, Some(_)) => false,
            },
        }
    }
}
