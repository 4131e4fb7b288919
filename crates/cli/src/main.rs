mod metrics;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use faretrack_core::{
    load_config, validate_config, AmadeusClient, DealTracker, HttpNotifier, RunReport,
    SanitizedConfig, SheetyDirectory,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "FARETRACK_CONFIG";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("faretrack.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(
        version = VERSION,
        config_hash = &config_hash[..16],
        "Configuration loaded successfully"
    );

    let sanitized = serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default();
    info!(config = %sanitized, "Effective configuration");

    if config.notifier.sms.is_none() {
        info!("No SMS channel configured, deal texts will be skipped");
    }
    if config.notifier.email.is_none() {
        info!("No email channel configured, deal emails will be skipped");
    }

    // Create collaborators
    let directory = Arc::new(
        SheetyDirectory::new(config.directory.clone())
            .context("Failed to create directory client")?,
    );
    let search = Arc::new(
        AmadeusClient::new(config.search.clone())
            .context("Failed to create search client")?
            .with_currency(config.tracker.currency.clone()),
    );
    let notifier = Arc::new(
        HttpNotifier::new(config.notifier.clone()).context("Failed to create notifier")?,
    );

    let tracker = DealTracker::new(config.tracker.clone(), directory, search, notifier);
    let result = tracker.run().await;

    // Metrics are written even when the run aborts
    if let Some(path) = &config.output.metrics_path {
        export_metrics(path, result.as_ref().ok()).await;
    }

    let report = result.context("Tracking run failed")?;

    if let Some(path) = &config.output.report_path {
        write_report(path, &report).await?;
        info!("Run report written to {:?}", path);
    }

    Ok(())
}

/// Write run metrics to `path`. A failed write is logged and does not stop
/// the report from being written.
async fn export_metrics(path: &Path, report: Option<&RunReport>) -> bool {
    if let Some(report) = report {
        metrics::DEALS_TRACKED.set(report.deals.len() as i64);
    }
    metrics::LAST_RUN_TIMESTAMP.set(Utc::now().timestamp());

    match metrics::write_metrics(path).await {
        Ok(()) => {
            info!("Metrics written to {:?}", path);
            true
        }
        Err(e) => {
            error!("Failed to write metrics to {:?}: {:#}", path, e);
            false
        }
    }
}

async fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize run report")?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write run report to {:?}", path))
}
