//! Deal tracker.
//!
//! Drives a tracking run end to end: authenticate once, load deals and
//! subscribers, resolve missing IATA codes, then run a bounded number of
//! price checks at a time and alert on deals below their target price.

mod config;
mod limiter;
mod resolver;
mod runner;
mod types;

pub use config::{TrackerConfig, TravelWindow};
pub use limiter::{PermitPool, SearchPermit};
pub use resolver::resolve_identifiers;
pub use runner::DealTracker;
pub use types::*;
