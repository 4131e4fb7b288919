//! Deal notifications.
//!
//! This module provides a `Notifier` trait for the two channels a deal alert
//! goes out on: a single SMS to the account owner and one email per subscriber.

mod http;
mod types;

pub use http::HttpNotifier;
pub use types::*;
