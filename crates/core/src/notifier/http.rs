//! HTTP notifier: Twilio for SMS, Brevo for email.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use tracing::debug;

use crate::config::{EmailConfig, NotifierConfig, SmsConfig};

use super::{Notifier, NotifyError};

/// Notifier backed by the Twilio Messages API and the Brevo transactional
/// email API. Either channel may be absent.
pub struct HttpNotifier {
    client: Client,
    sms: Option<SmsConfig>,
    email: Option<EmailConfig>,
}

impl HttpNotifier {
    /// Create a new notifier from configuration.
    pub fn new(config: NotifierConfig) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            sms: config.sms,
            email: config.email,
        })
    }

    fn messages_url(sms: &SmsConfig) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            sms.base_url.trim_end_matches('/'),
            urlencoding::encode(&sms.account_sid)
        )
    }

    fn email_url(email: &EmailConfig) -> String {
        format!("{}/v3/smtp/email", email.base_url.trim_end_matches('/'))
    }
}

async fn check_status(response: Response) -> Result<(), NotifyError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    Err(NotifyError::ApiError(format!(
        "HTTP {}: {}",
        status,
        body.chars().take(200).collect::<String>()
    )))
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send_sms(&self, text: &str) -> Result<(), NotifyError> {
        let sms = self
            .sms
            .as_ref()
            .ok_or_else(|| NotifyError::NotConfigured("sms".to_string()))?;

        let params = [
            ("From", sms.from_number.as_str()),
            ("To", sms.to_number.as_str()),
            ("Body", text),
        ];

        let response = self
            .client
            .post(Self::messages_url(sms))
            .basic_auth(&sms.account_sid, Some(&sms.auth_token))
            .form(&params)
            .send()
            .await?;

        check_status(response).await?;
        debug!(to = %sms.to_number, "SMS sent");
        Ok(())
    }

    async fn send_email(&self, address: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        let email = self
            .email
            .as_ref()
            .ok_or_else(|| NotifyError::NotConfigured("email".to_string()))?;

        let payload = BrevoPayload {
            sender: BrevoContact {
                name: Some(&email.sender_name),
                email: &email.sender_email,
            },
            to: vec![BrevoContact {
                name: None,
                email: address,
            }],
            subject,
            text_content: body,
        };

        let response = self
            .client
            .post(Self::email_url(email))
            .header("api-key", &email.api_key)
            .json(&payload)
            .send()
            .await?;

        check_status(response).await?;
        debug!(to = address, "Email sent");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct BrevoContact<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    email: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoPayload<'a> {
    sender: BrevoContact<'a>,
    to: Vec<BrevoContact<'a>>,
    subject: &'a str,
    text_content: &'a str,
}
