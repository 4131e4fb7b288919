//! Types for the flight search system.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::deal::PriceQuote;

/// Bearer credential obtained once per run.
///
/// Produced by [`SearchClient::authenticate`] before any lookup or price
/// check and shared read-only by every unit afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token value for the `Authorization: Bearer` header.
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AccessToken").field(&"<redacted>").finish()
    }
}

/// Round-trip fare query for one route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuery {
    /// Origin IATA code.
    pub origin: String,
    /// Destination IATA code.
    pub destination: String,
    /// Outbound date.
    pub departure: NaiveDate,
    /// Inbound date.
    pub return_date: NaiveDate,
    /// Restrict results to non-stop itineraries.
    pub direct_only: bool,
}

impl PriceQuery {
    /// Same route and dates with a different stop restriction.
    pub fn with_direct_only(&self, direct_only: bool) -> Self {
        Self {
            direct_only,
            ..self.clone()
        }
    }

    /// Short label for logs.
    pub fn leg(&self) -> &'static str {
        if self.direct_only {
            "direct"
        } else {
            "indirect"
        }
    }
}

/// Errors that can occur during search operations.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search backend authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Search backend connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Search backend API error: {0}")]
    ApiError(String),

    #[error("Failed to parse search response: {0}")]
    ParseError(String),

    #[error("Request timeout")]
    Timeout,
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SearchError::Timeout
        } else if e.is_connect() {
            SearchError::ConnectionFailed(e.to_string())
        } else if e.is_decode() {
            SearchError::ParseError(e.to_string())
        } else {
            SearchError::ApiError(e.to_string())
        }
    }
}

/// Trait for flight search backends.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Obtain the credential used by every later call.
    async fn authenticate(&self) -> Result<AccessToken, SearchError>;

    /// Look up the IATA code for a city name. `Ok(None)` when nothing matches.
    async fn resolve_identifier(
        &self,
        token: &AccessToken,
        city_name: &str,
    ) -> Result<Option<String>, SearchError>;

    /// Cheapest offer for the query. `Ok(None)` when the backend has no offer.
    async fn check_price(
        &self,
        token: &AccessToken,
        query: &PriceQuery,
    ) -> Result<Option<PriceQuote>, SearchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> PriceQuery {
        PriceQuery {
            origin: "HYD".to_string(),
            destination: "CDG".to_string(),
            departure: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            return_date: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            direct_only: true,
        }
    }

    #[test]
    fn test_with_direct_only_keeps_route() {
        let direct = query();
        let indirect = direct.with_direct_only(false);

        assert!(!indirect.direct_only);
        assert_eq!(indirect.origin, direct.origin);
        assert_eq!(indirect.destination, direct.destination);
        assert_eq!(indirect.departure, direct.departure);
        assert_eq!(indirect.return_date, direct.return_date);
        assert_eq!(direct.leg(), "direct");
        assert_eq!(indirect.leg(), "indirect");
    }

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken::new("super-secret");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("super-secret"));
        assert_eq!(token.secret(), "super-secret");
    }

    #[test]
    fn test_error_display() {
        let err = SearchError::AuthenticationFailed("HTTP 401".to_string());
        assert_eq!(
            err.to_string(),
            "Search backend authentication failed: HTTP 401"
        );
        assert_eq!(SearchError::Timeout.to_string(), "Request timeout");
    }
}
