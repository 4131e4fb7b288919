//! Types for tracked deals.

use serde::{de, Deserialize, Deserializer, Serialize};

/// A deal row as stored in the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealRow {
    /// Directory row ID, used to write identifier corrections back.
    pub id: u64,
    /// Destination city display name.
    pub city: String,
    /// Destination IATA code. Missing, null or blank when it still needs
    /// resolution.
    #[serde(default)]
    pub iata_code: Option<String>,
    /// Notification threshold. Sheet cells may hold it as text.
    #[serde(deserialize_with = "deserialize_price")]
    pub lowest_price: f64,
}

fn deserialize_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPrice {
        Number(f64),
        Text(String),
    }

    match RawPrice::deserialize(deserializer)? {
        RawPrice::Number(price) => Ok(price),
        RawPrice::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid price '{}'", text))),
    }
}

/// A subscriber that receives deal emails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub email: String,
}

/// Cheapest offer returned by a price check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Grand total in the configured currency.
    pub price: f64,
    /// Number of stops on the outbound itinerary.
    pub stops: u32,
}

/// In-memory state for one tracked route during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct DealRecord {
    city_name: String,
    canonical_id: Option<String>,
    target_price: f64,
    source_row_id: u64,
    observed_price: Option<f64>,
    observed_stops: Option<u32>,
}

impl DealRecord {
    /// Create a record for a destination. An empty identifier counts as missing.
    pub fn new(
        city_name: impl Into<String>,
        canonical_id: Option<String>,
        target_price: f64,
        source_row_id: u64,
    ) -> Self {
        Self {
            city_name: city_name.into(),
            canonical_id: canonical_id
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty()),
            target_price,
            source_row_id,
            observed_price: None,
            observed_stops: None,
        }
    }

    pub fn city_name(&self) -> &str {
        &self.city_name
    }

    pub fn canonical_id(&self) -> Option<&str> {
        self.canonical_id.as_deref()
    }

    pub fn target_price(&self) -> f64 {
        self.target_price
    }

    pub fn source_row_id(&self) -> u64 {
        self.source_row_id
    }

    pub fn observed_price(&self) -> Option<f64> {
        self.observed_price
    }

    pub fn observed_stops(&self) -> Option<u32> {
        self.observed_stops
    }

    /// Whether the record still lacks a canonical identifier.
    pub fn needs_resolution(&self) -> bool {
        self.canonical_id.is_none()
    }

    /// Record a resolved identifier. Blank codes are ignored.
    pub fn set_canonical_id(&mut self, canonical_id: impl Into<String>) {
        let canonical_id = canonical_id.into();
        let trimmed = canonical_id.trim();
        if !trimmed.is_empty() {
            self.canonical_id = Some(trimmed.to_string());
        }
    }

    /// Record the offer found by the price search.
    pub fn record_quote(&mut self, quote: PriceQuote) {
        self.observed_price = Some(quote.price);
        self.observed_stops = Some(quote.stops);
    }

    /// Whether the observed price is strictly below the target.
    pub fn is_below_target(&self) -> bool {
        self.observed_price
            .map(|price| price < self.target_price)
            .unwrap_or(false)
    }
}

impl From<DealRow> for DealRecord {
    fn from(row: DealRow) -> Self {
        Self::new(row.city, row.iata_code, row.lowest_price, row.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_iata_code_needs_resolution() {
        let row: DealRow = serde_json::from_str(
            r#"{"id": 2, "city": "Paris", "iataCode": "", "lowestPrice": 500}"#,
        )
        .unwrap();
        let record = DealRecord::from(row);

        assert_eq!(record.city_name(), "Paris");
        assert_eq!(record.source_row_id(), 2);
        assert!(record.needs_resolution());
        assert!(record.canonical_id().is_none());
    }

    #[test]
    fn test_missing_iata_code_needs_resolution() {
        let row: DealRow =
            serde_json::from_str(r#"{"id": 3, "city": "Berlin", "lowestPrice": 42.5}"#).unwrap();
        assert_eq!(row.iata_code, None);
        assert_eq!(row.lowest_price, 42.5);
        assert!(DealRecord::from(row).needs_resolution());
    }

    #[test]
    fn test_null_iata_code_needs_resolution() {
        let row: DealRow = serde_json::from_str(
            r#"{"id": 2, "city": "Paris", "iataCode": null, "lowestPrice": 500}"#,
        )
        .unwrap();
        assert_eq!(row.iata_code, None);
        assert!(DealRecord::from(row).needs_resolution());
    }

    #[test]
    fn test_lowest_price_as_text() {
        let row: DealRow = serde_json::from_str(
            r#"{"id": 4, "city": "Rome", "iataCode": "FCO", "lowestPrice": " 250.5 "}"#,
        )
        .unwrap();
        assert_eq!(row.lowest_price, 250.5);

        let bad = serde_json::from_str::<DealRow>(
            r#"{"id": 4, "city": "Rome", "lowestPrice": "cheap"}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_present_iata_code_is_kept() {
        let record = DealRecord::new("Tokyo", Some(" NRT ".to_string()), 300.0, 7);
        assert_eq!(record.canonical_id(), Some("NRT"));
        assert!(!record.needs_resolution());
    }

    #[test]
    fn test_set_canonical_id_ignores_blank() {
        let mut record = DealRecord::new("Paris", None, 500.0, 1);
        record.set_canonical_id("  ");
        assert!(record.needs_resolution());

        record.set_canonical_id("CDG");
        assert_eq!(record.canonical_id(), Some("CDG"));
    }

    #[test]
    fn test_record_quote_and_threshold() {
        let mut record = DealRecord::new("Paris", Some("CDG".to_string()), 500.0, 1);
        assert!(!record.is_below_target());

        record.record_quote(PriceQuote {
            price: 450.0,
            stops: 0,
        });
        assert_eq!(record.observed_price(), Some(450.0));
        assert_eq!(record.observed_stops(), Some(0));
        assert!(record.is_below_target());
    }

    #[test]
    fn test_price_equal_to_target_is_not_a_deal() {
        let mut record = DealRecord::new("Rome", Some("FCO".to_string()), 300.0, 4);
        record.record_quote(PriceQuote {
            price: 300.0,
            stops: 1,
        });
        assert!(!record.is_below_target());
    }
}
