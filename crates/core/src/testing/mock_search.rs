//! Mock flight search client for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::deal::PriceQuote;
use crate::search::{AccessToken, PriceQuery, SearchClient, SearchError};

/// Token handed out by [`MockSearchClient::authenticate`].
pub const MOCK_TOKEN: &str = "mock-token";

/// A recorded identifier lookup for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedLookup {
    /// The city name that was looked up.
    pub city_name: String,
    /// When the lookup was made.
    pub timestamp: Instant,
}

/// A recorded price check for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedCheck {
    /// The query that was checked.
    pub query: PriceQuery,
    /// When the check started.
    pub timestamp: Instant,
}

/// Configured reply. `Err` carries the message of a connection failure.
type Reply<T> = Result<Option<T>, String>;

/// Mock implementation of the SearchClient trait.
///
/// Provides controllable behavior for testing:
/// - Per-city identifier lookups and per-route, per-leg price replies
/// - Track lookups and price checks for assertions
/// - Simulate failures, slow lookups and slow checks
///
/// Anything not configured answers "nothing found".
///
/// # Example
///
/// ```rust,ignore
/// use faretrack_core::testing::{MockSearchClient, fixtures};
///
/// let search = MockSearchClient::new();
/// search.set_identifier("Paris", "CDG").await;
/// search.set_price("CDG", true, fixtures::quote(450.0, 0)).await;
///
/// // Run the tracker...
///
/// let checks = search.checks_for("CDG").await;
/// assert_eq!(checks.len(), 1);
/// assert!(checks[0].direct_only);
/// ```
pub struct MockSearchClient {
    /// If set, authentication fails with this message.
    auth_error: Arc<RwLock<Option<String>>>,
    /// Number of authenticate calls.
    auth_calls: AtomicUsize,
    /// Lookup replies by city name.
    identifiers: Arc<RwLock<HashMap<String, Reply<String>>>>,
    /// Price replies by (destination, direct_only).
    prices: Arc<RwLock<HashMap<(String, bool), Reply<PriceQuote>>>>,
    /// Recorded lookups.
    lookups: Arc<RwLock<Vec<RecordedLookup>>>,
    /// Recorded price checks.
    checks: Arc<RwLock<Vec<RecordedCheck>>>,
    /// Simulated latency for each identifier lookup.
    lookup_delay: Arc<RwLock<Option<Duration>>>,
    /// Lookups currently running.
    active_lookups: AtomicUsize,
    /// Highest number of lookups running at once.
    max_active_lookups: AtomicUsize,
    /// Simulated latency for each price check.
    check_delay: Arc<RwLock<Option<Duration>>>,
    /// Price checks currently running.
    active_checks: AtomicUsize,
    /// Highest number of price checks running at once.
    max_active_checks: AtomicUsize,
}

impl std::fmt::Debug for MockSearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSearchClient")
            .field("auth_calls", &self.auth_calls.load(Ordering::SeqCst))
            .field("identifiers", &"<identifiers>")
            .field("prices", &"<prices>")
            .field("lookups", &"<lookups>")
            .field("checks", &"<checks>")
            .field("max_active_lookups", &self.max_active_lookups.load(Ordering::SeqCst))
            .field("max_active_checks", &self.max_active_checks.load(Ordering::SeqCst))
            .finish()
    }
}

impl Default for MockSearchClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSearchClient {
    /// Create a new mock that finds nothing.
    pub fn new() -> Self {
        Self {
            auth_error: Arc::new(RwLock::new(None)),
            auth_calls: AtomicUsize::new(0),
            identifiers: Arc::new(RwLock::new(HashMap::new())),
            prices: Arc::new(RwLock::new(HashMap::new())),
            lookups: Arc::new(RwLock::new(Vec::new())),
            checks: Arc::new(RwLock::new(Vec::new())),
            lookup_delay: Arc::new(RwLock::new(None)),
            active_lookups: AtomicUsize::new(0),
            max_active_lookups: AtomicUsize::new(0),
            check_delay: Arc::new(RwLock::new(None)),
            active_checks: AtomicUsize::new(0),
            max_active_checks: AtomicUsize::new(0),
        }
    }

    /// Make authentication fail with the given message.
    pub async fn set_auth_error(&self, message: &str) {
        *self.auth_error.write().await = Some(message.to_string());
    }

    /// Resolve a city name to an IATA code.
    pub async fn set_identifier(&self, city_name: &str, code: &str) {
        self.identifiers
            .write()
            .await
            .insert(city_name.to_string(), Ok(Some(code.to_string())));
    }

    /// Make the lookup for a city fail.
    pub async fn set_lookup_error(&self, city_name: &str, message: &str) {
        self.identifiers
            .write()
            .await
            .insert(city_name.to_string(), Err(message.to_string()));
    }

    /// Return an offer for a destination on one leg.
    pub async fn set_price(&self, destination: &str, direct_only: bool, quote: PriceQuote) {
        self.prices
            .write()
            .await
            .insert((destination.to_string(), direct_only), Ok(Some(quote)));
    }

    /// Make the price check for a destination on one leg fail.
    pub async fn set_price_error(&self, destination: &str, direct_only: bool, message: &str) {
        self.prices
            .write()
            .await
            .insert((destination.to_string(), direct_only), Err(message.to_string()));
    }

    /// Delay every identifier lookup by `delay`.
    pub async fn set_lookup_delay(&self, delay: Duration) {
        *self.lookup_delay.write().await = Some(delay);
    }

    /// Delay every price check by `delay`.
    pub async fn set_check_delay(&self, delay: Duration) {
        *self.check_delay.write().await = Some(delay);
    }

    /// Number of authenticate calls.
    pub fn auth_calls(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }

    /// Get recorded lookups.
    pub async fn recorded_lookups(&self) -> Vec<RecordedLookup> {
        self.lookups.read().await.clone()
    }

    /// Get recorded price checks.
    pub async fn recorded_checks(&self) -> Vec<RecordedCheck> {
        self.checks.read().await.clone()
    }

    /// Price checks issued for one destination, in call order.
    pub async fn checks_for(&self, destination: &str) -> Vec<PriceQuery> {
        self.checks
            .read()
            .await
            .iter()
            .filter(|c| c.query.destination == destination)
            .map(|c| c.query.clone())
            .collect()
    }

    /// Highest number of identifier lookups that were running at the same time.
    pub fn max_concurrent_lookups(&self) -> usize {
        self.max_active_lookups.load(Ordering::SeqCst)
    }

    /// Highest number of price checks that were running at the same time.
    pub fn max_concurrent_checks(&self) -> usize {
        self.max_active_checks.load(Ordering::SeqCst)
    }

    fn verify_token(token: &AccessToken) -> Result<(), SearchError> {
        if token.secret() == MOCK_TOKEN {
            Ok(())
        } else {
            Err(SearchError::AuthenticationFailed("unknown token".to_string()))
        }
    }
}

#[async_trait]
impl SearchClient for MockSearchClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn authenticate(&self) -> Result<AccessToken, SearchError> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = self.auth_error.read().await.clone() {
            return Err(SearchError::AuthenticationFailed(message));
        }

        Ok(AccessToken::new(MOCK_TOKEN))
    }

    async fn resolve_identifier(
        &self,
        token: &AccessToken,
        city_name: &str,
    ) -> Result<Option<String>, SearchError> {
        Self::verify_token(token)?;

        self.lookups.write().await.push(RecordedLookup {
            city_name: city_name.to_string(),
            timestamp: Instant::now(),
        });

        let active = self.active_lookups.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active_lookups.fetch_max(active, Ordering::SeqCst);

        let delay = *self.lookup_delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.active_lookups.fetch_sub(1, Ordering::SeqCst);

        match self.identifiers.read().await.get(city_name) {
            Some(Ok(code)) => Ok(code.clone()),
            Some(Err(message)) => Err(SearchError::ConnectionFailed(message.clone())),
            None => Ok(None),
        }
    }

    async fn check_price(
        &self,
        token: &AccessToken,
        query: &PriceQuery,
    ) -> Result<Option<PriceQuote>, SearchError> {
        Self::verify_token(token)?;

        self.checks.write().await.push(RecordedCheck {
            query: query.clone(),
            timestamp: Instant::now(),
        });

        let active = self.active_checks.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active_checks.fetch_max(active, Ordering::SeqCst);

        let delay = *self.check_delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.active_checks.fetch_sub(1, Ordering::SeqCst);

        let key = (query.destination.clone(), query.direct_only);
        match self.prices.read().await.get(&key) {
            Some(Ok(quote)) => Ok(*quote),
            Some(Err(message)) => Err(SearchError::ConnectionFailed(message.clone())),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_unconfigured_finds_nothing() {
        let search = MockSearchClient::new();
        let token = search.authenticate().await.unwrap();

        assert_eq!(search.resolve_identifier(&token, "Paris").await.unwrap(), None);
        let query = fixtures::price_query("CDG", true);
        assert_eq!(search.check_price(&token, &query).await.unwrap(), None);
        assert_eq!(search.auth_calls(), 1);
    }

    #[tokio::test]
    async fn test_configured_replies() {
        let search = MockSearchClient::new();
        search.set_identifier("Paris", "CDG").await;
        search.set_price("CDG", false, fixtures::quote(700.0, 1)).await;
        search.set_price_error("CDG", true, "boom").await;

        let token = search.authenticate().await.unwrap();
        assert_eq!(
            search.resolve_identifier(&token, "Paris").await.unwrap(),
            Some("CDG".to_string())
        );

        let direct = search
            .check_price(&token, &fixtures::price_query("CDG", true))
            .await;
        assert!(matches!(direct, Err(SearchError::ConnectionFailed(_))));

        let indirect = search
            .check_price(&token, &fixtures::price_query("CDG", false))
            .await
            .unwrap();
        assert_eq!(indirect, Some(fixtures::quote(700.0, 1)));

        let checks = search.checks_for("CDG").await;
        assert_eq!(checks.len(), 2);
        assert!(checks[0].direct_only);
        assert!(!checks[1].direct_only);
        assert_eq!(search.recorded_lookups().await.len(), 1);
    }

    #[tokio::test]
    async fn test_tracks_overlapping_lookups() {
        let search = MockSearchClient::new();
        search.set_lookup_delay(Duration::from_millis(20)).await;
        let token = search.authenticate().await.unwrap();

        let (a, b) = tokio::join!(
            search.resolve_identifier(&token, "Paris"),
            search.resolve_identifier(&token, "Rome"),
        );
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(search.max_concurrent_lookups(), 2);

        search.resolve_identifier(&token, "Lima").await.unwrap();
        assert_eq!(search.max_concurrent_lookups(), 2);
    }

    #[tokio::test]
    async fn test_auth_error() {
        let search = MockSearchClient::new();
        search.set_auth_error("bad credentials").await;

        let err = search.authenticate().await.unwrap_err();
        assert!(matches!(err, SearchError::AuthenticationFailed(_)));
    }

    #[tokio::test]
    async fn test_rejects_foreign_token() {
        let search = MockSearchClient::new();
        let token = AccessToken::new("other");

        let err = search.resolve_identifier(&token, "Paris").await.unwrap_err();
        assert!(matches!(err, SearchError::AuthenticationFailed(_)));
        assert!(search.recorded_lookups().await.is_empty());
    }
}
