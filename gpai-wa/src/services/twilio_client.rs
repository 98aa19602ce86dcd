//! Twilio outbound message delivery
//!
//! Used by the extraction worker, whose results arrive after the webhook
//! response has already gone out; the webhook path itself replies inline
//! with TwiML. Messages are sent in order, one Messages.json POST each.

use anyhow::Result;
use async_trait::async_trait;
use gpai_common::config::TwilioConfig;
use thiserror::Error;
use tracing::debug;

use super::MessageSender;

/// Twilio client errors
#[derive(Debug, Error)]
pub enum TwilioError {
    /// HTTP request failed
    #[error("Twilio request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API returned a non-success status
    #[error("Twilio API error (HTTP {0}): {1}")]
    Api(u16, String),
}

pub struct TwilioClient {
    http: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl TwilioClient {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            account_sid: config.account_sid,
            auth_token: config.auth_token,
            from_number: config.from_number,
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.account_sid
        )
    }

    async fn send_one(&self, to: &str, body: &str) -> std::result::Result<(), TwilioError> {
        let response = self
            .http
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("From", self.from_number.as_str()), ("To", to), ("Body", body)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(TwilioError::Api(status.as_u16(), detail));
        }
        debug!(to, "Outbound message delivered");
        Ok(())
    }
}

#[async_trait]
impl MessageSender for TwilioClient {
    async fn send_messages(&self, to: &str, messages: &[String]) -> Result<()> {
        for message in messages {
            self.send_one(to, message).await?;
        }
        Ok(())
    }
}
