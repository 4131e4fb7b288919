pub mod config;
pub mod deal;
pub mod directory;
pub mod metrics;
pub mod notifier;
pub mod search;
pub mod testing;
pub mod tracker;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use deal::{DealRecord, DealRow, PriceQuote, Subscriber};
pub use directory::{DirectoryClient, DirectoryError, SheetyDirectory};
pub use notifier::{HttpNotifier, Notifier, NotifyError};
pub use search::{AccessToken, AmadeusClient, PriceQuery, SearchClient, SearchError};
pub use tracker::{DealOutcome, DealTracker, RunReport, TrackerConfig, TrackerError};
