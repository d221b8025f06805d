//! SMS delivery through a template-based provider

use std::collections::HashMap;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::error;
use crate::config::SmsConfig;
use crate::services::email::SendOutcome;
use crate::utils::errors::Result;
use crate::utils::helpers::normalize_phone;

#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Send a templated message; `vars` fill the provider template
    async fn send(&self, phone: &str, vars: &HashMap<String, String>) -> SendOutcome;
}

#[derive(Serialize)]
struct Recipient<'a> {
    mobiles: String,
    #[serde(flatten)]
    vars: &'a HashMap<String, String>,
}

#[derive(Serialize)]
struct FlowPayload<'a> {
    template_id: &'a str,
    short_url: &'a str,
    recipients: Vec<Recipient<'a>>,
}

#[derive(Clone)]
pub struct HttpSmsSender {
    client: Client,
    api_url: String,
    api_key: String,
    template_id: String,
    default_country_code: String,
}

impl HttpSmsSender {
    pub fn new(config: &SmsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            template_id: config.template_id.clone(),
            default_country_code: config.default_country_code.clone(),
        })
    }
}

#[async_trait]
impl SmsSender for HttpSmsSender {
    async fn send(&self, phone: &str, vars: &HashMap<String, String>) -> SendOutcome {
        let mobiles = match normalize_phone(phone, &self.default_country_code) {
            Some(mobiles) => mobiles,
            None => return SendOutcome::failed(format!("Invalid phone number: {}", phone)),
        };

        let payload = FlowPayload {
            template_id: &self.template_id,
            short_url: "0",
            recipients: vec![Recipient { mobiles, vars }],
        };

        let res = match self
            .client
            .post(&self.api_url)
            .header("authkey", &self.api_key)
            .json(&payload)
            .send()
            .await
        {
            Ok(res) => res,
            Err(e) => {
                let msg = format!("SMS service connection error: {}", e);
                error!("{}", msg);
                return SendOutcome::failed(msg);
            }
        };

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("SMS service failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return SendOutcome::failed(msg);
        }

        SendOutcome::sent()
    }
}
