//! Types for the deal tracker.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::deal::{DealRecord, PriceQuote};
use crate::directory::DirectoryError;
use crate::search::SearchError;

/// Errors that abort a tracking run.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The search backend refused our credentials.
    #[error("authentication failed: {0}")]
    Authentication(#[source] SearchError),

    /// The search permit pool was closed while units were waiting.
    #[error("search permit pool closed")]
    LimiterClosed,
}

/// Result of trying to resolve one deal's IATA code.
#[derive(Debug)]
pub enum Resolution {
    /// The deal already had a code; nothing was looked up.
    AlreadyResolved,
    /// The code was found and written back to the directory.
    Resolved(String),
    /// The search backend has no match for the city name.
    NotFound,
    /// The lookup itself failed.
    LookupFailed(SearchError),
    /// The code was found but could not be written back.
    PersistFailed {
        canonical_id: String,
        error: DirectoryError,
    },
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::AlreadyResolved => "already_resolved",
            Resolution::Resolved(_) => "resolved",
            Resolution::NotFound => "not_found",
            Resolution::LookupFailed(_) => "lookup_failed",
            Resolution::PersistFailed { .. } => "persist_failed",
        }
    }
}

/// Result of one price check leg.
///
/// `NoOffer` and `Failed` both send the unit on to the fallback leg; they are
/// kept apart for logs and metrics only.
#[derive(Debug)]
pub enum CheckOutcome {
    Found(PriceQuote),
    NoOffer,
    Failed(SearchError),
}

impl CheckOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckOutcome::Found(_) => "found",
            CheckOutcome::NoOffer => "no_offer",
            CheckOutcome::Failed(_) => "failed",
        }
    }

    pub fn into_quote(self) -> Option<PriceQuote> {
        match self {
            CheckOutcome::Found(quote) => Some(quote),
            CheckOutcome::NoOffer | CheckOutcome::Failed(_) => None,
        }
    }
}

/// Stages a search unit passes through, for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStage {
    Pending,
    PermitAcquired,
    DirectChecked,
    IndirectChecked,
    ResultFound,
    NoResult,
    Notified,
    Done,
}

impl SearchStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchStage::Pending => "pending",
            SearchStage::PermitAcquired => "permit_acquired",
            SearchStage::DirectChecked => "direct_checked",
            SearchStage::IndirectChecked => "indirect_checked",
            SearchStage::ResultFound => "result_found",
            SearchStage::NoResult => "no_result",
            SearchStage::Notified => "notified",
            SearchStage::Done => "done",
        }
    }
}

/// Final outcome for one deal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DealOutcome {
    /// Below target; alerts went out.
    Notified {
        sms_sent: bool,
        emails_sent: usize,
        emails_failed: usize,
    },
    /// A fare was found but it is not below target.
    NoDeal,
    /// Neither the direct nor the indirect check returned a fare.
    NoResult,
    /// No IATA code, so no search unit ran.
    Unresolved,
}

impl DealOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DealOutcome::Notified { .. } => "notified",
            DealOutcome::NoDeal => "no_deal",
            DealOutcome::NoResult => "no_result",
            DealOutcome::Unresolved => "unresolved",
        }
    }

    /// Whether a search unit ran for this deal.
    pub fn searched(&self) -> bool {
        !matches!(self, DealOutcome::Unresolved)
    }
}

/// Per-deal line of the run report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealReport {
    pub city_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_id: Option<String>,
    pub target_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_stops: Option<u32>,
    #[serde(flatten)]
    pub outcome: DealOutcome,
}

impl DealReport {
    pub fn new(deal: &DealRecord, outcome: DealOutcome) -> Self {
        Self {
            city_name: deal.city_name().to_string(),
            canonical_id: deal.canonical_id().map(str::to_string),
            target_price: deal.target_price(),
            observed_price: deal.observed_price(),
            observed_stops: deal.observed_stops(),
            outcome,
        }
    }
}

/// Summary of a complete tracking run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub origin: String,
    pub departure: NaiveDate,
    pub return_date: NaiveDate,
    pub subscribers: usize,
    pub deals: Vec<DealReport>,
}

impl RunReport {
    /// Number of search units that ran to completion.
    pub fn search_units(&self) -> usize {
        self.deals.iter().filter(|d| d.outcome.searched()).count()
    }

    pub fn notified(&self) -> usize {
        self.count(|o| matches!(o, DealOutcome::Notified { .. }))
    }

    pub fn no_deal(&self) -> usize {
        self.count(|o| matches!(o, DealOutcome::NoDeal))
    }

    pub fn no_result(&self) -> usize {
        self.count(|o| matches!(o, DealOutcome::NoResult))
    }

    pub fn unresolved(&self) -> usize {
        self.count(|o| matches!(o, DealOutcome::Unresolved))
    }

    /// Report line for a city, if it was tracked.
    pub fn deal(&self, city_name: &str) -> Option<&DealReport> {
        self.deals.iter().find(|d| d.city_name == city_name)
    }

    fn count(&self, predicate: impl Fn(&DealOutcome) -> bool) -> usize {
        self.deals.iter().filter(|d| predicate(&d.outcome)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcomes: Vec<DealOutcome>) -> RunReport {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        RunReport {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            origin: "HYD".to_string(),
            departure: today,
            return_date: today,
            subscribers: 0,
            deals: outcomes
                .into_iter()
                .enumerate()
                .map(|(i, outcome)| DealReport {
                    city_name: format!("City {}", i),
                    canonical_id: None,
                    target_price: 100.0,
                    observed_price: None,
                    observed_stops: None,
                    outcome,
                })
                .collect(),
        }
    }

    #[test]
    fn test_report_counters() {
        let report = report(vec![
            DealOutcome::Notified {
                sms_sent: true,
                emails_sent: 2,
                emails_failed: 0,
            },
            DealOutcome::NoDeal,
            DealOutcome::NoResult,
            DealOutcome::Unresolved,
            DealOutcome::Unresolved,
        ]);

        assert_eq!(report.search_units(), 3);
        assert_eq!(report.notified(), 1);
        assert_eq!(report.no_deal(), 1);
        assert_eq!(report.no_result(), 1);
        assert_eq!(report.unresolved(), 2);
        assert!(report.deal("City 3").is_some());
        assert!(report.deal("Atlantis").is_none());
    }

    #[test]
    fn test_deal_report_serialization() {
        let line = DealReport {
            city_name: "Paris".to_string(),
            canonical_id: Some("CDG".to_string()),
            target_price: 500.0,
            observed_price: Some(450.0),
            observed_stops: Some(0),
            outcome: DealOutcome::Notified {
                sms_sent: true,
                emails_sent: 3,
                emails_failed: 1,
            },
        };

        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["outcome"], "notified");
        assert_eq!(json["emails_sent"], 3);
        assert_eq!(json["canonical_id"], "CDG");

        let parsed: DealReport = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, line);
    }

    #[test]
    fn test_unresolved_report_skips_missing_fields() {
        let deal = DealRecord::new("Atlantis", None, 100.0, 9);
        let json = serde_json::to_string(&DealReport::new(&deal, DealOutcome::Unresolved)).unwrap();
        assert!(!json.contains("canonical_id"));
        assert!(!json.contains("observed_price"));
        assert!(json.contains("\"outcome\":\"unresolved\""));
    }

    #[test]
    fn test_error_display() {
        let err = TrackerError::Authentication(SearchError::AuthenticationFailed(
            "HTTP 401".to_string(),
        ));
        assert_eq!(
            err.to_string(),
            "authentication failed: Search backend authentication failed: HTTP 401"
        );
    }
}
