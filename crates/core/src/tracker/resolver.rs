//! Identifier resolution phase.

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::deal::DealRecord;
use crate::directory::DirectoryClient;
use crate::metrics;
use crate::search::{AccessToken, SearchClient};

use super::Resolution;

/// Resolve missing IATA codes for every deal concurrently.
///
/// Each deal without a code gets one lookup. A found code is written back to
/// the directory first and only then set on the record, so a failed write
/// leaves the deal unresolved for this run. Returns one [`Resolution`] per
/// deal, in input order, once every lookup has finished.
pub async fn resolve_identifiers(
    deals: &mut [DealRecord],
    search: &dyn SearchClient,
    directory: &dyn DirectoryClient,
    token: &AccessToken,
) -> Vec<Resolution> {
    let pending = deals.iter().filter(|d| d.needs_resolution()).count();
    if pending > 0 {
        info!(pending, "Resolving missing IATA codes");
    }

    let resolutions = join_all(
        deals
            .iter_mut()
            .map(|deal| resolve_one(deal, search, directory, token)),
    )
    .await;

    let resolved = resolutions
        .iter()
        .filter(|r| matches!(r, Resolution::Resolved(_)))
        .count();
    if pending > 0 {
        info!(pending, resolved, "Resolution phase complete");
    }

    resolutions
}

async fn resolve_one(
    deal: &mut DealRecord,
    search: &dyn SearchClient,
    directory: &dyn DirectoryClient,
    token: &AccessToken,
) -> Resolution {
    if !deal.needs_resolution() {
        return Resolution::AlreadyResolved;
    }

    let resolution = match search.resolve_identifier(token, deal.city_name()).await {
        Ok(Some(code)) => {
            match directory
                .persist_identifier(deal.source_row_id(), &code)
                .await
            {
                Ok(()) => {
                    debug!(city = %deal.city_name(), iata_code = %code, "Resolved IATA code");
                    deal.set_canonical_id(code.as_str());
                    Resolution::Resolved(code)
                }
                Err(e) => {
                    warn!(
                        city = %deal.city_name(),
                        iata_code = %code,
                        row_id = deal.source_row_id(),
                        error = %e,
                        "Failed to persist IATA code, skipping deal"
                    );
                    Resolution::PersistFailed {
                        canonical_id: code,
                        error: e,
                    }
                }
            }
        }
        Ok(None) => {
            warn!(city = %deal.city_name(), "No IATA code found for city");
            Resolution::NotFound
        }
        Err(e) => {
            warn!(city = %deal.city_name(), error = %e, "IATA code lookup failed");
            Resolution::LookupFailed(e)
        }
    };

    metrics::IDENTIFIER_LOOKUPS
        .with_label_values(&[resolution.as_str()])
        .inc();

    resolution
}
