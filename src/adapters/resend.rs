use crate::config::toml_config::NotifyConfig;
use crate::domain::model::Email;
use crate::domain::ports::Mailer;
use crate::utils::error::{Result, ShopperError};
use async_trait::async_trait;
use reqwest::Client;

/// Sends email through the Resend HTTP API.
#[derive(Debug, Clone)]
pub struct ResendMailer {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ResendMailer {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// `None` when no Resend key is configured.
    pub fn from_config(config: &NotifyConfig) -> Option<Self> {
        config
            .resend_api_key
            .as_deref()
            .map(|key| Self::new(&config.resend_base_url, key))
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &Email) -> Result<()> {
        let endpoint = format!("{}/emails", self.base_url);
        tracing::debug!("📧 Sending '{}' to {} via Resend", email.subject, email.to);

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ShopperError::NotificationError {
                message: format!("Resend returned {}: {}", status, body.trim()),
            });
        }

        Ok(())
    }
}
