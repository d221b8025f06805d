//! Email delivery
//!
//! Senders report failures in a `SendOutcome` instead of returning an error so a
//! bulk dispatch can keep going.

use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::error;
use crate::config::EmailConfig;
use crate::utils::errors::Result;

/// Result of one provider call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendOutcome {
    pub fn sent() -> Self {
        Self { success: true, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> SendOutcome;
}

#[derive(Serialize)]
struct EmailPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// JSON-over-HTTP email provider with bearer authentication
#[derive(Clone)]
pub struct HttpEmailSender {
    client: Client,
    api_url: String,
    api_key: String,
    from_address: String,
}

impl HttpEmailSender {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> SendOutcome {
        let payload = EmailPayload {
            from: &self.from_address,
            to,
            subject,
            html: html_body,
        };

        let res = match self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
        {
            Ok(res) => res,
            Err(e) => {
                let msg = format!("Email service connection error: {}", e);
                error!("{}", msg);
                return SendOutcome::failed(msg);
            }
        };

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Email service failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return SendOutcome::failed(msg);
        }

        SendOutcome::sent()
    }
}
