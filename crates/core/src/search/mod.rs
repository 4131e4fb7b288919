//! Flight search abstraction.
//!
//! This module provides a `SearchClient` trait for authenticating against a
//! flight search backend, resolving city names to IATA codes, and checking
//! the cheapest round-trip fare for a route.

mod amadeus;
mod types;

pub use amadeus::AmadeusClient;
pub use types::*;
