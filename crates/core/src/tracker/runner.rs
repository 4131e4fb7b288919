//! Deal tracker implementation.
//!
//! A run goes through two phases:
//! - Resolution: unbounded fan-out, one lookup per deal missing an IATA code
//! - Search: one unit per resolved deal, bounded by the shared permit pool
//!
//! The search phase starts only after every resolution unit has finished.

use std::sync::Arc;

use chrono::{Local, Utc};
use futures::future::join_all;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::deal::{DealRecord, PriceQuote, Subscriber};
use crate::directory::DirectoryClient;
use crate::metrics;
use crate::notifier::Notifier;
use crate::search::{AccessToken, PriceQuery, SearchClient};

use super::config::{TrackerConfig, TravelWindow};
use super::limiter::PermitPool;
use super::resolver::resolve_identifiers;
use super::types::{
    CheckOutcome, DealOutcome, DealReport, RunReport, SearchStage, TrackerError,
};

const EMAIL_SUBJECT: &str = "Flight Deal!";

/// Tracks fares for every deal in the directory and alerts on price drops.
pub struct DealTracker {
    config: TrackerConfig,
    directory: Arc<dyn DirectoryClient>,
    search: Arc<dyn SearchClient>,
    notifier: Arc<dyn Notifier>,
    limiter: PermitPool,
    travel_window: Option<TravelWindow>,
}

impl DealTracker {
    /// Create a new tracker. The permit pool is sized from
    /// `max_concurrent_searches`.
    pub fn new(
        config: TrackerConfig,
        directory: Arc<dyn DirectoryClient>,
        search: Arc<dyn SearchClient>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let limiter = PermitPool::new(config.max_concurrent_searches);

        Self {
            config,
            directory,
            search,
            notifier,
            limiter,
            travel_window: None,
        }
    }

    /// Use fixed travel dates instead of deriving them from today's date.
    pub fn with_travel_window(mut self, window: TravelWindow) -> Self {
        self.travel_window = Some(window);
        self
    }

    /// The permit pool shared by search units.
    pub fn limiter(&self) -> &PermitPool {
        &self.limiter
    }

    /// Run one full tracking pass.
    ///
    /// Fails only if authentication fails. Every other error is absorbed per
    /// deal and shows up in the report.
    pub async fn run(&self) -> Result<RunReport, TrackerError> {
        let started_at = Utc::now();
        let window = self
            .travel_window
            .unwrap_or_else(|| self.config.travel_window(Local::now().date_naive()));

        info!(
            origin = %self.config.origin,
            departure = %window.departure,
            return_date = %window.return_date,
            max_concurrent = self.limiter.capacity(),
            "Starting tracking run"
        );

        let token = self.search.authenticate().await.map_err(|e| {
            error!(provider = self.search.name(), error = %e, "Authentication failed");
            TrackerError::Authentication(e)
        })?;
        debug!(provider = self.search.name(), "Authenticated");

        let (mut deals, subscribers) = tokio::join!(self.load_deals(), self.load_subscribers());
        info!(
            deals = deals.len(),
            subscribers = subscribers.len(),
            "Loaded directory"
        );

        resolve_identifiers(
            &mut deals,
            self.search.as_ref(),
            self.directory.as_ref(),
            &token,
        )
        .await;

        let outcomes = self
            .search_deals(&mut deals, &token, &subscribers, window)
            .await;

        let report = RunReport {
            run_id: Uuid::new_v4(),
            started_at,
            finished_at: Utc::now(),
            origin: self.config.origin.clone(),
            departure: window.departure,
            return_date: window.return_date,
            subscribers: subscribers.len(),
            deals: deals
                .iter()
                .zip(outcomes)
                .map(|(deal, outcome)| DealReport::new(deal, outcome))
                .collect(),
        };

        info!(
            search_units = report.search_units(),
            notified = report.notified(),
            no_deal = report.no_deal(),
            no_result = report.no_result(),
            unresolved = report.unresolved(),
            peak_permits = self.limiter.peak(),
            "Tracking run complete"
        );

        Ok(report)
    }

    /// Run one search unit per resolved deal and wait for all of them.
    ///
    /// Returns one outcome per deal, in input order. Deals without an IATA
    /// code are skipped and reported as [`DealOutcome::Unresolved`].
    pub async fn search_deals(
        &self,
        deals: &mut [DealRecord],
        token: &AccessToken,
        subscribers: &[Subscriber],
        window: TravelWindow,
    ) -> Vec<DealOutcome> {
        join_all(
            deals
                .iter_mut()
                .map(|deal| self.search_one(deal, token, subscribers, window)),
        )
        .await
    }

    async fn load_deals(&self) -> Vec<DealRecord> {
        match self.directory.fetch_deals().await {
            Ok(rows) => rows.into_iter().map(DealRecord::from).collect(),
            Err(e) => {
                error!(directory = self.directory.name(), error = %e, "Failed to fetch deals");
                Vec::new()
            }
        }
    }

    async fn load_subscribers(&self) -> Vec<Subscriber> {
        match self.directory.fetch_subscribers().await {
            Ok(subscribers) => subscribers,
            Err(e) => {
                error!(directory = self.directory.name(), error = %e, "Failed to fetch subscribers");
                Vec::new()
            }
        }
    }

    async fn search_one(
        &self,
        deal: &mut DealRecord,
        token: &AccessToken,
        subscribers: &[Subscriber],
        window: TravelWindow,
    ) -> DealOutcome {
        let Some(destination) = deal.canonical_id().map(str::to_string) else {
            info!(city = %deal.city_name(), "Skipping deal without IATA code");
            return DealOutcome::Unresolved;
        };
        let city = deal.city_name().to_string();
        let mut stage = SearchStage::Pending;

        let query = PriceQuery {
            origin: self.config.origin.clone(),
            destination,
            departure: window.departure,
            return_date: window.return_date,
            direct_only: true,
        };

        // Permit is held for the checks only, not for notification.
        let quote = {
            let _permit = match self.limiter.acquire().await {
                Ok(permit) => permit,
                Err(e) => {
                    warn!(city = %city, error = %e, "Could not acquire search permit");
                    transition(&city, &mut stage, SearchStage::NoResult);
                    metrics::SEARCH_UNITS
                        .with_label_values(&[DealOutcome::NoResult.as_str()])
                        .inc();
                    return DealOutcome::NoResult;
                }
            };
            transition(&city, &mut stage, SearchStage::PermitAcquired);

            let direct = self.check(token, &query).await;
            transition(&city, &mut stage, SearchStage::DirectChecked);

            match direct.into_quote() {
                Some(quote) => Some(quote),
                None => {
                    let indirect = self.check(token, &query.with_direct_only(false)).await;
                    transition(&city, &mut stage, SearchStage::IndirectChecked);
                    indirect.into_quote()
                }
            }
        };

        let Some(quote) = quote else {
            transition(&city, &mut stage, SearchStage::NoResult);
            info!(city = %city, destination = %query.destination, "No flights found");
            metrics::SEARCH_UNITS
                .with_label_values(&[DealOutcome::NoResult.as_str()])
                .inc();
            return DealOutcome::NoResult;
        };
        transition(&city, &mut stage, SearchStage::ResultFound);

        deal.record_quote(quote);
        info!(
            city = %city,
            destination = %query.destination,
            price = quote.price,
            stops = quote.stops,
            target_price = deal.target_price(),
            "Fare found"
        );

        let outcome = if deal.is_below_target() {
            let outcome = self.notify(&city, quote, &query, subscribers).await;
            transition(&city, &mut stage, SearchStage::Notified);
            outcome
        } else {
            info!(
                city = %city,
                price = quote.price,
                target_price = deal.target_price(),
                "Price not below target, no alert"
            );
            DealOutcome::NoDeal
        };
        transition(&city, &mut stage, SearchStage::Done);

        metrics::SEARCH_UNITS
            .with_label_values(&[outcome.as_str()])
            .inc();
        outcome
    }

    async fn check(&self, token: &AccessToken, query: &PriceQuery) -> CheckOutcome {
        let leg = query.leg();
        let timer = metrics::PRICE_CHECK_DURATION
            .with_label_values(&[leg])
            .start_timer();

        let outcome = match self.search.check_price(token, query).await {
            Ok(Some(quote)) => CheckOutcome::Found(quote),
            Ok(None) => CheckOutcome::NoOffer,
            Err(e) => CheckOutcome::Failed(e),
        };
        timer.observe_duration();

        match &outcome {
            CheckOutcome::Found(quote) => debug!(
                destination = %query.destination,
                direct_only = query.direct_only,
                price = quote.price,
                stops = quote.stops,
                "Offer found"
            ),
            CheckOutcome::NoOffer => debug!(
                destination = %query.destination,
                direct_only = query.direct_only,
                "No offer"
            ),
            CheckOutcome::Failed(e) => warn!(
                destination = %query.destination,
                direct_only = query.direct_only,
                error = %e,
                "Price check failed"
            ),
        }

        metrics::PRICE_CHECKS
            .with_label_values(&[leg, outcome.as_str()])
            .inc();
        outcome
    }

    /// Send one SMS and one email per subscriber. Failures are counted,
    /// never propagated.
    async fn notify(
        &self,
        city: &str,
        quote: PriceQuote,
        query: &PriceQuery,
        subscribers: &[Subscriber],
    ) -> DealOutcome {
        let currency = &self.config.currency;

        let sms_sent = match self
            .notifier
            .send_sms(&sms_text(currency, quote, query))
            .await
        {
            Ok(()) => {
                metrics::NOTIFICATIONS
                    .with_label_values(&["sms", "sent"])
                    .inc();
                true
            }
            Err(e) => {
                warn!(city, error = %e, "Failed to send SMS");
                metrics::NOTIFICATIONS
                    .with_label_values(&["sms", "failed"])
                    .inc();
                false
            }
        };

        let body = email_body(currency, city, quote, query);
        let results = join_all(
            subscribers
                .iter()
                .map(|s| self.notifier.send_email(&s.email, EMAIL_SUBJECT, &body)),
        )
        .await;

        let mut emails_sent = 0;
        let mut emails_failed = 0;
        for (subscriber, result) in subscribers.iter().zip(results) {
            match result {
                Ok(()) => {
                    emails_sent += 1;
                    metrics::NOTIFICATIONS
                        .with_label_values(&["email", "sent"])
                        .inc();
                }
                Err(e) => {
                    emails_failed += 1;
                    warn!(city, to = %subscriber.email, error = %e, "Failed to send email");
                    metrics::NOTIFICATIONS
                        .with_label_values(&["email", "failed"])
                        .inc();
                }
            }
        }

        info!(
            city,
            price = quote.price,
            sms_sent,
            emails_sent,
            emails_failed,
            "Deal alert sent"
        );

        DealOutcome::Notified {
            sms_sent,
            emails_sent,
            emails_failed,
        }
    }
}

fn transition(city: &str, stage: &mut SearchStage, next: SearchStage) {
    debug!(city, from = stage.as_str(), to = next.as_str(), "Search unit transition");
    *stage = next;
}

fn sms_text(currency: &str, quote: PriceQuote, query: &PriceQuery) -> String {
    format!(
        "Low price! {} {:.2} {}->{} ({}-{})",
        currency, quote.price, query.origin, query.destination, query.departure, query.return_date
    )
}

fn email_body(currency: &str, city: &str, quote: PriceQuote, query: &PriceQuery) -> String {
    format!(
        "Only {} {:.2} to {}!\n\n{} -> {}, {} to {}, {} stop(s).",
        currency,
        quote.price,
        city,
        query.origin,
        query.destination,
        query.departure,
        query.return_date,
        quote.stops
    )
}
