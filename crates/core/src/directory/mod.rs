//! Deal directory abstraction.
//!
//! This module provides a `DirectoryClient` trait for reading tracked deals
//! and subscribers from a shared spreadsheet-style store, and for writing
//! resolved IATA codes back to it.

mod sheety;
mod types;

pub use sheety::SheetyDirectory;
pub use types::*;
