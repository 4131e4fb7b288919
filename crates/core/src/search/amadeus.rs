//! Amadeus self-service API search backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::SearchConfig;
use crate::deal::PriceQuote;

use super::{AccessToken, PriceQuery, SearchClient, SearchError};

/// Currency requested for fare quotes unless overridden.
const DEFAULT_CURRENCY: &str = "INR";

/// Amadeus search backend implementation.
pub struct AmadeusClient {
    client: Client,
    config: SearchConfig,
    currency: String,
}

impl AmadeusClient {
    /// Create a new AmadeusClient with the given configuration.
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            config,
            currency: DEFAULT_CURRENCY.to_string(),
        })
    }

    /// Quote fares in a different currency.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Build the query string for a flight offers search.
    fn offer_params(&self, query: &PriceQuery) -> Vec<(&'static str, String)> {
        vec![
            ("originLocationCode", query.origin.clone()),
            ("destinationLocationCode", query.destination.clone()),
            ("departureDate", query.departure.format("%Y-%m-%d").to_string()),
            ("returnDate", query.return_date.format("%Y-%m-%d").to_string()),
            ("adults", "1".to_string()),
            ("currencyCode", self.currency.clone()),
            ("max", "1".to_string()),
            ("nonStop", query.direct_only.to_string()),
        ]
    }
}

#[async_trait]
impl SearchClient for AmadeusClient {
    fn name(&self) -> &str {
        "amadeus"
    }

    async fn authenticate(&self) -> Result<AccessToken, SearchError> {
        debug!("Requesting Amadeus access token");

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.config.api_key.as_str()),
            ("client_secret", self.config.api_secret.as_str()),
        ];

        let response = self
            .client
            .post(&self.config.token_endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| SearchError::AuthenticationFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::AuthenticationFailed(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| {
                SearchError::AuthenticationFailed(format!("Invalid token response: {}", e))
            })?;

        if token.access_token.is_empty() {
            return Err(SearchError::AuthenticationFailed("Empty access token".to_string()));
        }

        debug!(expires_in = ?token.expires_in, "Amadeus token acquired");
        Ok(AccessToken::new(token.access_token))
    }

    async fn resolve_identifier(
        &self,
        token: &AccessToken,
        city_name: &str,
    ) -> Result<Option<String>, SearchError> {
        debug!(city = city_name, "Looking up IATA code");

        let response = self
            .client
            .get(&self.config.city_endpoint)
            .bearer_auth(token.secret())
            .query(&[("keyword", city_name), ("max", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::ApiError(format!("HTTP {}", status)));
        }

        let cities: CityResponse = response
            .json()
            .await
            .map_err(|e| SearchError::ParseError(e.to_string()))?;

        Ok(first_iata_code(cities))
    }

    async fn check_price(
        &self,
        token: &AccessToken,
        query: &PriceQuery,
    ) -> Result<Option<PriceQuote>, SearchError> {
        debug!(
            origin = %query.origin,
            destination = %query.destination,
            leg = query.leg(),
            "Searching flight offers"
        );

        let response = self
            .client
            .get(&self.config.flight_endpoint)
            .bearer_auth(token.secret())
            .query(&self.offer_params(query))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::ApiError(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let offers: OffersResponse = response
            .json()
            .await
            .map_err(|e| SearchError::ParseError(e.to_string()))?;

        cheapest_offer(offers)
    }
}

fn first_iata_code(response: CityResponse) -> Option<String> {
    response
        .data
        .into_iter()
        .next()
        .and_then(|location| location.iata_code)
        .filter(|code| !code.trim().is_empty())
}

/// The backend is asked for a single offer, already sorted by price.
fn cheapest_offer(response: OffersResponse) -> Result<Option<PriceQuote>, SearchError> {
    let Some(offer) = response.data.into_iter().next() else {
        return Ok(None);
    };

    let price = offer.price.grand_total.trim().parse::<f64>().map_err(|e| {
        SearchError::ParseError(format!(
            "Invalid grand total '{}': {}",
            offer.price.grand_total, e
        ))
    })?;

    let segments = offer
        .itineraries
        .first()
        .map(|itinerary| itinerary.segments.len())
        .ok_or_else(|| SearchError::ParseError("Offer has no itineraries".to_string()))?;

    Ok(Some(PriceQuote {
        price,
        stops: segments.saturating_sub(1) as u32,
    }))
}

// Amadeus API response types

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct CityResponse {
    #[serde(default)]
    data: Vec<CityLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CityLocation {
    #[serde(default)]
    iata_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OffersResponse {
    #[serde(default)]
    data: Vec<FlightOffer>,
}

#[derive(Debug, Deserialize)]
struct FlightOffer {
    price: OfferPrice,
    #[serde(default)]
    itineraries: Vec<Itinerary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OfferPrice {
    grand_total: String,
}

#[derive(Debug, Deserialize)]
struct Itinerary {
    #[serde(default)]
    segments: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn config() -> SearchConfig {
        SearchConfig {
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            token_endpoint: "https://test.api.amadeus.com/v1/security/oauth2/token".to_string(),
            city_endpoint: "https://test.api.amadeus.com/v1/reference-data/locations/cities"
                .to_string(),
            flight_endpoint: "https://test.api.amadeus.com/v2/shopping/flight-offers".to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_offer_params() {
        let client = AmadeusClient::new(config()).unwrap().with_currency("EUR");
        let query = PriceQuery {
            origin: "HYD".to_string(),
            destination: "CDG".to_string(),
            departure: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            return_date: NaiveDate::from_ymd_opt(2026, 2, 4).unwrap(),
            direct_only: false,
        };

        let params = client.offer_params(&query);
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("originLocationCode"), Some("HYD"));
        assert_eq!(get("destinationLocationCode"), Some("CDG"));
        assert_eq!(get("departureDate"), Some("2026-01-05"));
        assert_eq!(get("returnDate"), Some("2026-02-04"));
        assert_eq!(get("currencyCode"), Some("EUR"));
        assert_eq!(get("max"), Some("1"));
        assert_eq!(get("nonStop"), Some("false"));
    }

    #[test]
    fn test_first_iata_code() {
        let response: CityResponse = serde_json::from_str(
            r#"{"data": [{"name": "PARIS", "iataCode": "PAR"}, {"iataCode": "XXX"}]}"#,
        )
        .unwrap();
        assert_eq!(first_iata_code(response), Some("PAR".to_string()));

        let empty: CityResponse = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert_eq!(first_iata_code(empty), None);

        let missing: CityResponse = serde_json::from_str(r#"{"meta": {}}"#).unwrap();
        assert_eq!(first_iata_code(missing), None);

        let no_code: CityResponse =
            serde_json::from_str(r#"{"data": [{"name": "Nowhere"}]}"#).unwrap();
        assert_eq!(first_iata_code(no_code), None);
    }

    #[test]
    fn test_cheapest_offer_counts_stops() {
        let response: OffersResponse = serde_json::from_str(
            r#"{
                "data": [{
                    "price": {"grandTotal": "35120.50", "currency": "INR"},
                    "itineraries": [
                        {"segments": [{"id": "1"}, {"id": "2"}]},
                        {"segments": [{"id": "3"}]}
                    ]
                }]
            }"#,
        )
        .unwrap();

        let quote = cheapest_offer(response).unwrap().unwrap();
        assert_eq!(quote.price, 35120.50);
        assert_eq!(quote.stops, 1);
    }

    #[test]
    fn test_cheapest_offer_empty_is_none() {
        let response: OffersResponse = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(cheapest_offer(response).unwrap().is_none());
    }

    #[test]
    fn test_cheapest_offer_bad_price_is_parse_error() {
        let response: OffersResponse = serde_json::from_str(
            r#"{"data": [{"price": {"grandTotal": "n/a"}, "itineraries": [{"segments": [{}]}]}]}"#,
        )
        .unwrap();
        let err = cheapest_offer(response).unwrap_err();
        assert!(matches!(err, SearchError::ParseError(_)));
    }
}
