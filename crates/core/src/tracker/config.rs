//! Tracker configuration.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Configuration for a tracking run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// IATA code every route departs from.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Days from today until the outbound flight.
    #[serde(default = "default_departure_offset")]
    pub departure_offset_days: u32,

    /// Days between outbound and return flights.
    #[serde(default = "default_trip_length")]
    pub trip_length_days: u32,

    /// Maximum price checks in flight at once, across all deals.
    /// Deals beyond this limit wait for a free slot.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_searches: usize,

    /// Currency for fare quotes and notification text.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_origin() -> String {
    "HYD".to_string()
}

fn default_departure_offset() -> u32 {
    1 // tomorrow
}

fn default_trip_length() -> u32 {
    30
}

fn default_max_concurrent() -> usize {
    10
}

fn default_currency() -> String {
    "INR".to_string()
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            departure_offset_days: default_departure_offset(),
            trip_length_days: default_trip_length(),
            max_concurrent_searches: default_max_concurrent(),
            currency: default_currency(),
        }
    }
}

impl TrackerConfig {
    /// Outbound and return dates for a run starting on `today`.
    pub fn travel_window(&self, today: NaiveDate) -> TravelWindow {
        let departure = today + Days::new(self.departure_offset_days as u64);
        TravelWindow {
            departure,
            return_date: departure + Days::new(self.trip_length_days as u64),
        }
    }
}

/// Fixed dates shared by every price check in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelWindow {
    pub departure: NaiveDate,
    pub return_date: NaiveDate,
}
