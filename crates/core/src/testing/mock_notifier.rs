//! Mock notifier for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::notifier::{NotifyError, Notifier};

/// A recorded email for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub address: String,
    pub subject: String,
    pub body: String,
}

/// Mock implementation of the Notifier trait.
///
/// Records every message it accepts. SMS delivery and individual email
/// addresses can be made to fail.
pub struct MockNotifier {
    sms: Arc<RwLock<Vec<String>>>,
    emails: Arc<RwLock<Vec<SentEmail>>>,
    fail_sms: Arc<RwLock<bool>>,
    failing_addresses: Arc<RwLock<HashSet<String>>>,
}

impl std::fmt::Debug for MockNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockNotifier")
            .field("sms", &"<sms>")
            .field("emails", &"<emails>")
            .finish()
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            sms: Arc::new(RwLock::new(Vec::new())),
            emails: Arc::new(RwLock::new(Vec::new())),
            fail_sms: Arc::new(RwLock::new(false)),
            failing_addresses: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Texts of all SMS sent.
    pub async fn sent_sms(&self) -> Vec<String> {
        self.sms.read().await.clone()
    }

    /// All emails sent.
    pub async fn sent_emails(&self) -> Vec<SentEmail> {
        self.emails.read().await.clone()
    }

    /// Make every SMS fail.
    pub async fn set_sms_failure(&self, fail: bool) {
        *self.fail_sms.write().await = fail;
    }

    /// Make emails to one address fail.
    pub async fn fail_email_to(&self, address: &str) {
        self.failing_addresses
            .write()
            .await
            .insert(address.to_string());
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send_sms(&self, text: &str) -> Result<(), NotifyError> {
        if *self.fail_sms.read().await {
            return Err(NotifyError::ConnectionFailed("mock sms failure".to_string()));
        }
        self.sms.write().await.push(text.to_string());
        Ok(())
    }

    async fn send_email(&self, address: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        if self.failing_addresses.read().await.contains(address) {
            return Err(NotifyError::ApiError(format!("HTTP 400: rejected {}", address)));
        }
        self.emails.write().await.push(SentEmail {
            address: address.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
