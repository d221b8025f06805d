//! Mock email/SMS provider HTTP server
//!
//! Uses wiremock to stand in for the external providers the HTTP senders call.

use serde_json::json;
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};
use guestlist::config::{EmailConfig, SmsConfig};

pub struct ProviderMockServer {
    pub server: MockServer,
}

impl ProviderMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn email_config(&self) -> EmailConfig {
        EmailConfig {
            enabled: true,
            api_url: format!("{}/emails", self.server.uri()),
            api_key: "test-email-key".to_string(),
            from_address: "invites@example.com".to_string(),
            timeout_seconds: 5,
        }
    }

    pub fn sms_config(&self) -> SmsConfig {
        SmsConfig {
            enabled: true,
            api_url: format!("{}/flow", self.server.uri()),
            api_key: "test-sms-key".to_string(),
            template_id: "tmpl-123".to_string(),
            default_country_code: "91".to_string(),
            timeout_seconds: 5,
        }
    }

    pub async fn mock_email_success(&self) {
        Mock::given(method("POST"))
            .and(path("/emails"))
            .and(header("Authorization", "Bearer test-email-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "msg_1" })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_email_failure(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(ResponseTemplate::new(status).set_body_string("provider unavailable"))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_sms_success(&self) {
        Mock::given(method("POST"))
            .and(path("/flow"))
            .and(header("authkey", "test-sms-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "type": "success" })))
            .mount(&self.server)
            .await;
    }

    /// Bodies of all requests received so far, parsed as JSON
    pub async fn received_json(&self) -> Vec<serde_json::Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|r| serde_json::from_slice(&r.body).ok())
            .collect()
    }
}
