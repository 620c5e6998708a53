//! Tenant lookup
//!
//! The handler resolves a mailbox by slug on every authenticated call. The
//! production store reads the mailboxes DynamoDB table; tests and local runs
//! use the in-memory store.

use anyhow::{Context, Result};
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;
use std::future::Future;
use tracing::debug;
use widget_gate_common::Mailbox;

/// Read access to mailbox records
pub trait MailboxStore: Send + Sync {
    /// Look a mailbox up by slug; `Ok(None)` when no such mailbox exists
    fn find_by_slug(&self, slug: &str) -> impl Future<Output = Result<Option<Mailbox>>> + Send;
}

/// Mailboxes table keyed by `slug`
pub struct DynamoMailboxStore {
    client: DynamoDbClient,
    table_name: String,
}

impl DynamoMailboxStore {
    pub fn new(client: DynamoDbClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

impl MailboxStore for DynamoMailboxStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Mailbox>> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("slug", AttributeValue::S(slug.to_string()))
            .send()
            .await
            .context("Failed to get mailbox from DynamoDB")?;

        let Some(item) = result.item else {
            debug!("No mailbox item for slug {}", slug);
            return Ok(None);
        };

        let mailbox: Mailbox =
            serde_dynamo::from_item(item).context("Failed to decode mailbox item")?;
        Ok(Some(mailbox))
    }
}

/// Mailboxes held in process memory
#[derive(Debug, Default, Clone)]
pub struct InMemoryMailboxStore {
    mailboxes: HashMap<String, Mailbox>,
}

impl InMemoryMailboxStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mailbox(mut self, mailbox: Mailbox) -> Self {
        self.insert(mailbox);
        self
    }

    pub fn insert(&mut self, mailbox: Mailbox) {
        self.mailboxes.insert(mailbox.slug.clone(), mailbox);
    }
}

impl MailboxStore for InMemoryMailboxStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Mailbox>> {
        Ok(self.mailboxes.get(slug).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_lookup() {
        let store = InMemoryMailboxStore::new()
            .with_mailbox(Mailbox::new(1, "acme", "Acme", "secret-a"))
            .with_mailbox(Mailbox::new(2, "globex", "Globex", "secret-g"));

        let found = store.find_by_slug("globex").await.unwrap().unwrap();
        assert_eq!(found.id, 2);
        assert_eq!(found.widget_hmac_secret, "secret-g");

        assert!(store.find_by_slug("initech").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_replaces_by_slug() {
        let mut store = InMemoryMailboxStore::new();
        store.insert(Mailbox::new(1, "acme", "Acme", "old"));
        store.insert(Mailbox::new(1, "acme", "Acme Support", "new"));

        let found = store.find_by_slug("acme").await.unwrap().unwrap();
        assert_eq!(found.name, "Acme Support");
        assert_eq!(found.widget_hmac_secret, "new");
    }

    #[test]
    fn test_mailbox_decodes_from_dynamo_item() {
        let item: HashMap<String, AttributeValue> = HashMap::from([
            ("id".to_string(), AttributeValue::N("42".to_string())),
            ("slug".to_string(), AttributeValue::S("acme".to_string())),
            ("name".to_string(), AttributeValue::S("Acme".to_string())),
            (
                "widgetHMACSecret".to_string(),
                AttributeValue::S("secret".to_string()),
            ),
            (
                "widgetDisplayMode".to_string(),
                AttributeValue::S("revenue_based".to_string()),
            ),
            (
                "widgetDisplayMinValue".to_string(),
                AttributeValue::N("100".to_string()),
            ),
            ("isWhitelabel".to_string(), AttributeValue::Bool(true)),
        ]);

        let mailbox: Mailbox = serde_dynamo::from_item(item).unwrap();
        assert_eq!(mailbox.id, 42);
        assert_eq!(mailbox.slug, "acme");
        assert_eq!(mailbox.widget_display_min_value, Some(100.0));
        assert!(mailbox.is_whitelabel);
        assert!(!mailbox.should_show_widget(Some(99.0)));
    }
}
