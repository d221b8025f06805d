//! Invitation message formatting
//!
//! Builds invitation links, code-renderer URLs and the per-channel message
//! bodies from simple `{placeholder}` templates.

use std::collections::HashMap;
use url::Url;
use crate::config::InvitationConfig;
use crate::models::{Event, Guest};
use crate::utils::errors::Result;
use crate::utils::helpers::escape_html;

const EMAIL_SUBJECT_TEMPLATE: &str = "You're invited: {event_name}";

const EMAIL_BODY_TEMPLATE: &str = "<p>Hi {guest_name},</p>\
<p>You're on the guest list for <strong>{event_name}</strong> on {event_date} at {event_time}, {venue_name}.</p>\
<p><a href=\"{invitation_link}\">View your invitation</a></p>\
<p>Show this code at the door:</p>\
<p><img src=\"{code_url}\" alt=\"{check_in_token}\" width=\"240\" height=\"240\"></p>\
<p style=\"font-family:monospace;font-size:18px\">{check_in_token}</p>";

/// A ready-to-send email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub subject: String,
    pub html_body: String,
}

#[derive(Debug, Clone)]
pub struct InvitationComposer {
    public_base_url: Url,
    code_renderer_url: Url,
}

fn format_template(template: &str, parameters: &HashMap<String, String>) -> String {
    let mut formatted = template.to_string();
    for (key, value) in parameters {
        let placeholder = format!("{{{}}}", key);
        formatted = formatted.replace(&placeholder, value);
    }
    formatted
}

impl InvitationComposer {
    pub fn new(config: &InvitationConfig) -> Result<Self> {
        Ok(Self {
            public_base_url: Url::parse(&config.public_base_url)?,
            code_renderer_url: Url::parse(&config.code_renderer_url)?,
        })
    }

    /// Self-service deep link carrying the invite token
    pub fn invitation_link(&self, invite_token: &str) -> String {
        let base = self.public_base_url.as_str().trim_end_matches('/');
        format!("{}/invite/{}", base, urlencoding::encode(invite_token))
    }

    /// External renderer URL producing a scannable image of the check-in code
    pub fn code_url(&self, check_in_token: &str) -> String {
        let mut url = self.code_renderer_url.clone();
        url.query_pairs_mut()
            .append_pair("size", "240x240")
            .append_pair("data", check_in_token);
        url.to_string()
    }

    fn parameters(&self, guest: &Guest, event: &Event, venue_name: Option<&str>, invite_token: &str) -> HashMap<String, String> {
        let event_time = match (event.time_start, event.time_end) {
            (Some(start), Some(end)) => format!("{} - {}", start.format("%-I:%M %p"), end.format("%-I:%M %p")),
            (Some(start), None) => start.format("%-I:%M %p").to_string(),
            _ => "All day".to_string(),
        };

        let mut parameters = HashMap::new();
        parameters.insert("guest_name".to_string(), guest.name.clone());
        parameters.insert("event_name".to_string(), event.name.clone());
        parameters.insert("event_date".to_string(), event.date.format("%a, %b %-d %Y").to_string());
        parameters.insert("event_time".to_string(), event_time);
        parameters.insert("venue_name".to_string(), venue_name.unwrap_or("the venue").to_string());
        parameters.insert("invitation_link".to_string(), self.invitation_link(invite_token));
        parameters.insert("code_url".to_string(), self.code_url(&guest.check_in_token));
        parameters.insert("check_in_token".to_string(), guest.check_in_token.clone());
        parameters
    }

    pub fn compose_email(&self, guest: &Guest, event: &Event, venue_name: Option<&str>, invite_token: &str) -> EmailMessage {
        let parameters = self.parameters(guest, event, venue_name, invite_token);
        let escaped: HashMap<String, String> = parameters
            .iter()
            .map(|(k, v)| (k.clone(), escape_html(v)))
            .collect();

        EmailMessage {
            subject: format_template(EMAIL_SUBJECT_TEMPLATE, &parameters),
            html_body: format_template(EMAIL_BODY_TEMPLATE, &escaped),
        }
    }

    /// Template variables for the SMS provider
    pub fn compose_sms_vars(&self, guest: &Guest, event: &Event, venue_name: Option<&str>, invite_token: &str) -> HashMap<String, String> {
        let parameters = self.parameters(guest, event, venue_name, invite_token);
        let mut vars = HashMap::new();
        for (var, key) in [
            ("name", "guest_name"),
            ("event", "event_name"),
            ("date", "event_date"),
            ("time", "event_time"),
            ("venue", "venue_name"),
            ("link", "invitation_link"),
        ] {
            if let Some(value) = parameters.get(key) {
                vars.insert(var.to_string(), value.clone());
            }
        }
        vars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn composer() -> InvitationComposer {
        InvitationComposer::new(&Settings::default().invitations).unwrap()
    }

    #[test]
    fn test_format_template() {
        let mut parameters = HashMap::new();
        parameters.insert("name".to_string(), "Ada".to_string());
        assert_eq!(format_template("Hi {name}, {missing}", &parameters), "Hi Ada, {missing}");
    }

    #[test]
    fn test_invitation_link() {
        assert_eq!(composer().invitation_link("abc123"), "http://localhost:3000/invite/abc123");
    }

    #[test]
    fn test_code_url_encodes_token() {
        let url = Url::parse(&composer().code_url("GL-ABCD2345")).unwrap();
        let data = url.query_pairs().find(|(k, _)| k == "data").map(|(_, v)| v.into_owned());
        assert_eq!(data.as_deref(), Some("GL-ABCD2345"));
    }
}
