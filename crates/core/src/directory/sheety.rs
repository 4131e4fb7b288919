//! Sheety (Google Sheets REST) directory implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::config::DirectoryConfig;
use crate::deal::{DealRow, Subscriber};

use super::{DirectoryClient, DirectoryError};

/// Sheety directory client.
pub struct SheetyDirectory {
    client: Client,
    config: DirectoryConfig,
}

impl SheetyDirectory {
    /// Create a new Sheety directory client.
    pub fn new(config: DirectoryConfig) -> Result<Self, DirectoryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self { client, config })
    }

    /// URL of a single row on the prices sheet.
    fn row_url(&self, row_id: u64) -> String {
        format!(
            "{}/{}",
            self.config.prices_endpoint.trim_end_matches('/'),
            row_id
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, DirectoryError> {
        let response = self
            .client
            .get(url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .send()
            .await?;

        let response = check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| DirectoryError::ParseError(e.to_string()))
    }
}

async fn check_status(response: Response) -> Result<Response, DirectoryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(DirectoryError::ApiError(format!(
        "HTTP {}: {}",
        status,
        body.chars().take(200).collect::<String>()
    )))
}

#[async_trait]
impl DirectoryClient for SheetyDirectory {
    fn name(&self) -> &str {
        "sheety"
    }

    async fn fetch_deals(&self) -> Result<Vec<DealRow>, DirectoryError> {
        let sheet: PricesSheet = self.get_json(&self.config.prices_endpoint).await?;
        debug!(rows = sheet.prices.len(), "Fetched deal rows");
        Ok(sheet.prices)
    }

    async fn fetch_subscribers(&self) -> Result<Vec<Subscriber>, DirectoryError> {
        let sheet: UsersSheet = self.get_json(&self.config.users_endpoint).await?;
        debug!(rows = sheet.users.len(), "Fetched subscribers");
        Ok(sheet.users)
    }

    async fn persist_identifier(
        &self,
        row_id: u64,
        canonical_id: &str,
    ) -> Result<(), DirectoryError> {
        let body = PriceUpdate {
            price: PriceUpdateFields {
                iata_code: canonical_id,
            },
        };

        let response = self
            .client
            .put(self.row_url(row_id))
            .basic_auth(&self.config.username, Some(&self.config.password))
            .json(&body)
            .send()
            .await?;

        check_status(response).await?;
        debug!(row_id, iata_code = canonical_id, "Persisted IATA code");
        Ok(())
    }
}

// Sheety API payloads

#[derive(Debug, Deserialize)]
struct PricesSheet {
    #[serde(default)]
    prices: Vec<DealRow>,
}

#[derive(Debug, Deserialize)]
struct UsersSheet {
    #[serde(default)]
    users: Vec<Subscriber>,
}

#[derive(Debug, Serialize)]
struct PriceUpdate<'a> {
    price: PriceUpdateFields<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PriceUpdateFields<'a> {
    iata_code: &'a str,
}
