//! Tracked routes and the rows they are built from.
//!
//! A `DealRecord` lives for a single run: it is created from a directory row,
//! filled in by identifier resolution and the price search, then dropped.

mod types;

pub use types::*;
