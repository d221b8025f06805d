//! HTTP email and SMS sender tests against a mock provider

mod helpers;

use std::collections::HashMap;
use helpers::*;
use tokio_test::assert_ok;
use guestlist::services::{EmailSender, HttpEmailSender, HttpSmsSender, SmsSender};

#[tokio::test]
async fn test_email_sender_posts_with_bearer_auth() {
    let mock = ProviderMockServer::new().await;
    mock.mock_email_success().await;
    let sender = assert_ok!(HttpEmailSender::new(&mock.email_config()));

    let outcome = sender.send("ada@example.com", "You're invited", "<p>Hi</p>").await;

    assert!(outcome.success);
    assert_eq!(outcome.error, None);
    let bodies = mock.received_json().await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["to"], "ada@example.com");
    assert_eq!(bodies[0]["from"], "invites@example.com");
    assert_eq!(bodies[0]["subject"], "You're invited");
}

#[tokio::test]
async fn test_email_sender_reports_provider_errors() {
    let mock = ProviderMockServer::new().await;
    mock.mock_email_failure(503).await;
    let sender = assert_ok!(HttpEmailSender::new(&mock.email_config()));

    let outcome = sender.send("ada@example.com", "Subject", "<p>Body</p>").await;

    assert!(!outcome.success);
    let error = outcome.error.expect("error message");
    assert!(error.contains("503"));
    assert!(error.contains("provider unavailable"));
}

#[tokio::test]
async fn test_email_sender_reports_connection_errors() {
    let mut config = ProviderMockServer::new().await.email_config();
    // Nothing listens on port 9 locally
    config.api_url = "http://127.0.0.1:9/emails".to_string();
    let sender = HttpEmailSender::new(&config).unwrap();

    let outcome = sender.send("ada@example.com", "Subject", "<p>Body</p>").await;
    assert!(!outcome.success);
    assert!(outcome.error.unwrap().contains("connection error"));
}

#[tokio::test]
async fn test_sms_sender_normalizes_phone_and_sends_template_vars() {
    let mock = ProviderMockServer::new().await;
    mock.mock_sms_success().await;
    let sender = assert_ok!(HttpSmsSender::new(&mock.sms_config()));

    let mut vars = HashMap::new();
    vars.insert("name".to_string(), "Ada".to_string());
    vars.insert("link".to_string(), "https://example.com/invite/abc".to_string());
    let outcome = sender.send("098765-43210", &vars).await;

    assert!(outcome.success);
    let bodies = mock.received_json().await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["template_id"], "tmpl-123");
    let recipient = &bodies[0]["recipients"][0];
    assert_eq!(recipient["mobiles"], "919876543210");
    assert_eq!(recipient["name"], "Ada");
    assert_eq!(recipient["link"], "https://example.com/invite/abc");
}

#[tokio::test]
async fn test_sms_sender_rejects_unusable_numbers_without_calling_provider() {
    let mock = ProviderMockServer::new().await;
    mock.mock_sms_success().await;
    let sender = assert_ok!(HttpSmsSender::new(&mock.sms_config()));

    let outcome = sender.send("12-34", &HashMap::new()).await;

    assert!(!outcome.success);
    assert!(mock.received_json().await.is_empty());
}
