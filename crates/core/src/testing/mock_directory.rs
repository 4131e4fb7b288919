//! Mock deal directory for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::deal::{DealRow, Subscriber};
use crate::directory::{DirectoryClient, DirectoryError};

/// Mock implementation of the DirectoryClient trait.
///
/// Holds deal rows and subscribers in memory. Persisted identifiers are
/// written back onto the stored rows and recorded for assertions.
pub struct MockDirectory {
    deals: Arc<RwLock<Vec<DealRow>>>,
    subscribers: Arc<RwLock<Vec<Subscriber>>>,
    /// Recorded (row_id, iata_code) writes, successful ones only.
    persisted: Arc<RwLock<Vec<(u64, String)>>>,
    fetch_deals_error: Arc<RwLock<Option<String>>>,
    fetch_subscribers_error: Arc<RwLock<Option<String>>>,
    /// Rows whose writes fail, with the error message.
    persist_errors: Arc<RwLock<HashMap<u64, String>>>,
}

impl std::fmt::Debug for MockDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockDirectory")
            .field("deals", &"<deals>")
            .field("subscribers", &"<subscribers>")
            .field("persisted", &"<persisted>")
            .finish()
    }
}

impl Default for MockDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self {
            deals: Arc::new(RwLock::new(Vec::new())),
            subscribers: Arc::new(RwLock::new(Vec::new())),
            persisted: Arc::new(RwLock::new(Vec::new())),
            fetch_deals_error: Arc::new(RwLock::new(None)),
            fetch_subscribers_error: Arc::new(RwLock::new(None)),
            persist_errors: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Set the deal rows.
    pub async fn set_deals(&self, deals: Vec<DealRow>) {
        *self.deals.write().await = deals;
    }

    /// Set the subscribers.
    pub async fn set_subscribers(&self, subscribers: Vec<Subscriber>) {
        *self.subscribers.write().await = subscribers;
    }

    /// Current deal rows, including persisted identifiers.
    pub async fn deals(&self) -> Vec<DealRow> {
        self.deals.read().await.clone()
    }

    /// Get recorded identifier writes.
    pub async fn persisted(&self) -> Vec<(u64, String)> {
        self.persisted.read().await.clone()
    }

    /// Make `fetch_deals` fail.
    pub async fn set_fetch_deals_error(&self, message: &str) {
        *self.fetch_deals_error.write().await = Some(message.to_string());
    }

    /// Make `fetch_subscribers` fail.
    pub async fn set_fetch_subscribers_error(&self, message: &str) {
        *self.fetch_subscribers_error.write().await = Some(message.to_string());
    }

    /// Make writes to one row fail.
    pub async fn set_persist_error(&self, row_id: u64, message: &str) {
        self.persist_errors
            .write()
            .await
            .insert(row_id, message.to_string());
    }
}

#[async_trait]
impl DirectoryClient for MockDirectory {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_deals(&self) -> Result<Vec<DealRow>, DirectoryError> {
        if let Some(message) = self.fetch_deals_error.read().await.clone() {
            return Err(DirectoryError::ConnectionFailed(message));
        }
        Ok(self.deals.read().await.clone())
    }

    async fn fetch_subscribers(&self) -> Result<Vec<Subscriber>, DirectoryError> {
        if let Some(message) = self.fetch_subscribers_error.read().await.clone() {
            return Err(DirectoryError::ConnectionFailed(message));
        }
        Ok(self.subscribers.read().await.clone())
    }

    async fn persist_identifier(
        &self,
        row_id: u64,
        canonical_id: &str,
    ) -> Result<(), DirectoryError> {
        if let Some(message) = self.persist_errors.read().await.get(&row_id) {
            return Err(DirectoryError::ApiError(message.clone()));
        }

        let mut deals = self.deals.write().await;
        let row = deals
            .iter_mut()
            .find(|r| r.id == row_id)
            .ok_or_else(|| DirectoryError::ApiError(format!("HTTP 404: no row {}", row_id)))?;
        row.iata_code = Some(canonical_id.to_string());
        drop(deals);

        self.persisted
            .write()
            .await
            .push((row_id, canonical_id.to_string()));
        Ok(())
    }
}
