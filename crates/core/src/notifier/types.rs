//! Types for notification delivery.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while sending a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification channel not configured: {0}")]
    NotConfigured(String),

    #[error("Notification request failed: {0}")]
    ConnectionFailed(String),

    #[error("Notification API error: {0}")]
    ApiError(String),
}

impl From<reqwest::Error> for NotifyError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() {
            NotifyError::ConnectionFailed(e.to_string())
        } else {
            NotifyError::ApiError(e.to_string())
        }
    }
}

/// Trait for notification backends.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a text message to the configured recipient.
    async fn send_sms(&self, text: &str) -> Result<(), NotifyError>;

    /// Send a plain-text email to one address.
    async fn send_email(&self, address: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}
