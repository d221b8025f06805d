//! In-process email and SMS senders that record every call

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use async_trait::async_trait;
use guestlist::services::{EmailSender, SendOutcome, SmsSender};

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Email sender that fails for a configurable set of recipients
#[derive(Default)]
pub struct MockEmailSender {
    failing: Mutex<HashSet<String>>,
    sent: Mutex<Vec<SentEmail>>,
}

impl MockEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, address: &str) {
        self.failing.lock().unwrap().insert(address.to_string());
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for MockEmailSender {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> SendOutcome {
        if self.failing.lock().unwrap().contains(to) {
            return SendOutcome::failed(format!("mailbox unavailable: {}", to));
        }
        self.sent.lock().unwrap().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        });
        SendOutcome::sent()
    }
}

/// SMS sender that fails for a configurable set of numbers
#[derive(Default)]
pub struct MockSmsSender {
    failing: Mutex<HashSet<String>>,
    sent: Mutex<Vec<(String, HashMap<String, String>)>>,
}

impl MockSmsSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, phone: &str) {
        self.failing.lock().unwrap().insert(phone.to_string());
    }

    pub fn sent(&self) -> Vec<(String, HashMap<String, String>)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SmsSender for MockSmsSender {
    async fn send(&self, phone: &str, vars: &HashMap<String, String>) -> SendOutcome {
        if self.failing.lock().unwrap().contains(phone) {
            return SendOutcome::failed("carrier rejected message");
        }
        self.sent.lock().unwrap().push((phone.to_string(), vars.clone()));
        SendOutcome::sent()
    }
}
