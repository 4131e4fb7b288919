use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::tracker::TrackerConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tracker: TrackerConfig,
    pub directory: DirectoryConfig,
    pub search: SearchConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Deal directory (spreadsheet API) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DirectoryConfig {
    /// Endpoint listing deal rows; row updates go to `{prices_endpoint}/{id}`.
    pub prices_endpoint: String,
    /// Endpoint listing subscribers.
    pub users_endpoint: String,
    /// Basic auth username.
    pub username: String,
    /// Basic auth password.
    pub password: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

/// Flight search API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// OAuth client ID.
    pub api_key: String,
    /// OAuth client secret.
    pub api_secret: String,
    /// OAuth token endpoint (client credentials grant).
    pub token_endpoint: String,
    /// City/airport lookup endpoint.
    pub city_endpoint: String,
    /// Flight offers endpoint.
    pub flight_endpoint: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

/// Notification channels. Either channel may be left out.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifierConfig {
    #[serde(default)]
    pub sms: Option<SmsConfig>,
    #[serde(default)]
    pub email: Option<EmailConfig>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            sms: None,
            email: None,
            timeout_secs: default_timeout(),
        }
    }
}

/// Twilio SMS configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmsConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Sending (virtual) number.
    pub from_number: String,
    /// Receiving (verified) number.
    pub to_number: String,
    #[serde(default = "default_sms_base_url")]
    pub base_url: String,
}

fn default_sms_base_url() -> String {
    "https://api.twilio.com".to_string()
}

/// Transactional email API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmailConfig {
    pub api_key: String,
    pub sender_email: String,
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
    #[serde(default = "default_email_base_url")]
    pub base_url: String,
}

fn default_sender_name() -> String {
    "Flight Club".to_string()
}

fn default_email_base_url() -> String {
    "https://api.brevo.com".to_string()
}

/// Where run artifacts are written
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    /// JSON run report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_path: Option<PathBuf>,
    /// Prometheus text exposition, written once the run finishes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics_path: Option<PathBuf>,
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub tracker: TrackerConfig,
    pub directory: SanitizedDirectoryConfig,
    pub search: SanitizedSearchConfig,
    pub notifier: SanitizedNotifierConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedDirectoryConfig {
    pub prices_endpoint: String,
    pub users_endpoint: String,
    pub credentials_configured: bool,
    pub timeout_secs: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSearchConfig {
    pub token_endpoint: String,
    pub city_endpoint: String,
    pub flight_endpoint: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedNotifierConfig {
    pub sms_configured: bool,
    pub email_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_sender: Option<String>,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            tracker: config.tracker.clone(),
            directory: SanitizedDirectoryConfig {
                prices_endpoint: config.directory.prices_endpoint.clone(),
                users_endpoint: config.directory.users_endpoint.clone(),
                credentials_configured: !config.directory.username.is_empty()
                    && !config.directory.password.is_empty(),
                timeout_secs: config.directory.timeout_secs,
            },
            search: SanitizedSearchConfig {
                token_endpoint: config.search.token_endpoint.clone(),
                city_endpoint: config.search.city_endpoint.clone(),
                flight_endpoint: config.search.flight_endpoint.clone(),
                api_key_configured: !config.search.api_key.is_empty()
                    && !config.search.api_secret.is_empty(),
                timeout_secs: config.search.timeout_secs,
            },
            notifier: SanitizedNotifierConfig {
                sms_configured: config.notifier.sms.is_some(),
                email_configured: config.notifier.email.is_some(),
                email_sender: config
                    .notifier
                    .email
                    .as_ref()
                    .map(|e| e.sender_email.clone()),
            },
            output: config.output.clone(),
        }
    }
}
