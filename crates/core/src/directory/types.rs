//! Types for deal directory operations.

use async_trait::async_trait;
use thiserror::Error;

use crate::deal::{DealRow, Subscriber};

/// Errors that can occur during directory operations.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Directory connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Directory API error: {0}")]
    ApiError(String),

    #[error("Failed to parse directory response: {0}")]
    ParseError(String),

    #[error("Request timeout")]
    Timeout,
}

impl From<reqwest::Error> for DirectoryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            DirectoryError::Timeout
        } else if e.is_connect() {
            DirectoryError::ConnectionFailed(e.to_string())
        } else if e.is_decode() {
            DirectoryError::ParseError(e.to_string())
        } else {
            DirectoryError::ApiError(e.to_string())
        }
    }
}

/// Trait for deal directory backends.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// All tracked deal rows.
    async fn fetch_deals(&self) -> Result<Vec<DealRow>, DirectoryError>;

    /// Everyone who should receive deal emails.
    async fn fetch_subscribers(&self) -> Result<Vec<Subscriber>, DirectoryError>;

    /// Store a resolved IATA code on the originating row.
    async fn persist_identifier(
        &self,
        row_id: u64,
        canonical_id: &str,
    ) -> Result<(), DirectoryError>;
}
