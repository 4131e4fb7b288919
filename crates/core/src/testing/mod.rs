//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the directory, search and
//! notifier traits, so a full tracking run can be exercised without any
//! external service.
//!
//! # Example
//!
//! ```rust,ignore
//! use faretrack_core::testing::{fixtures, MockDirectory, MockNotifier, MockSearchClient};
//!
//! let directory = MockDirectory::new();
//! let search = MockSearchClient::new();
//! let notifier = MockNotifier::new();
//!
//! // Configure mock responses
//! directory.set_deals(vec![fixtures::deal_row(2, "Paris", "", 500.0)]).await;
//! search.set_identifier("Paris", "CDG").await;
//! search.set_price("CDG", true, fixtures::quote(450.0, 0)).await;
//!
//! // Build a DealTracker around them...
//! ```

mod mock_directory;
mod mock_notifier;
mod mock_search;

pub use mock_directory::MockDirectory;
pub use mock_notifier::{MockNotifier, SentEmail};
pub use mock_search::{MockSearchClient, RecordedCheck, RecordedLookup, MOCK_TOKEN};

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::NaiveDate;

    use crate::deal::{DealRow, PriceQuote, Subscriber};
    use crate::search::PriceQuery;
    use crate::tracker::TravelWindow;

    /// Create a deal row. Pass an empty `iata_code` for an unresolved deal.
    pub fn deal_row(id: u64, city: &str, iata_code: &str, lowest_price: f64) -> DealRow {
        DealRow {
            id,
            city: city.to_string(),
            iata_code: Some(iata_code.to_string()),
            lowest_price,
        }
    }

    /// Create `count` subscribers with distinct addresses.
    pub fn subscribers(count: usize) -> Vec<Subscriber> {
        (1..=count)
            .map(|i| Subscriber {
                email: format!("subscriber{}@example.com", i),
            })
            .collect()
    }

    pub fn quote(price: f64, stops: u32) -> PriceQuote {
        PriceQuote { price, stops }
    }

    /// Fixed travel dates: 2026-02-01 to 2026-03-03.
    pub fn travel_window() -> TravelWindow {
        TravelWindow {
            departure: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap_or_default(),
            return_date: NaiveDate::from_ymd_opt(2026, 3, 3).unwrap_or_default(),
        }
    }

    /// A query from HYD within [`travel_window`].
    pub fn price_query(destination: &str, direct_only: bool) -> PriceQuery {
        let window = travel_window();
        PriceQuery {
            origin: "HYD".to_string(),
            destination: destination.to_string(),
            departure: window.departure,
            return_date: window.return_date,
            direct_only,
        }
    }
}
