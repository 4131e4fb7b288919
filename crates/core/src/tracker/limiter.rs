//! Permit pool bounding concurrent price checks.

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::warn;

use crate::metrics;

use super::TrackerError;

/// Counting limiter shared by every search unit of a run.
///
/// At most `capacity` permits are out at once. Waiters are served by the
/// underlying semaphore in FIFO order. Capacity is at least 1.
pub struct PermitPool {
    semaphore: Semaphore,
    capacity: usize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl PermitPool {
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            warn!("Search permit capacity of 0 would block every search, using 1");
            1
        } else {
            capacity
        };

        Self {
            semaphore: Semaphore::new(capacity),
            capacity,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits currently held.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of permits held at once since creation.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Wait for a free permit. The permit is returned when the guard drops.
    pub async fn acquire(&self) -> Result<SearchPermit<'_>, TrackerError> {
        let permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| TrackerError::LimiterClosed)?;

        let held = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(held, Ordering::SeqCst);
        metrics::SEARCH_PERMITS_IN_USE.inc();

        Ok(SearchPermit {
            _permit: permit,
            pool: self,
        })
    }

    /// Reject all current and future waiters.
    pub fn close(&self) {
        self.semaphore.close();
    }
}

impl std::fmt::Debug for PermitPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermitPool")
            .field("capacity", &self.capacity)
            .field("in_flight", &self.in_flight())
            .field("peak", &self.peak())
            .finish()
    }
}

/// Held permit. Released on drop, on every exit path.
pub struct SearchPermit<'a> {
    _permit: SemaphorePermit<'a>,
    pool: &'a PermitPool,
}

impl Drop for SearchPermit<'_> {
    fn drop(&mut self) {
        self.pool.in_flight.fetch_sub(1, Ordering::SeqCst);
        metrics::SEARCH_PERMITS_IN_USE.dec();
    }
}
