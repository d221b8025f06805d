//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rand::Rng;

/// Format a timestamp as a 12-hour wall-clock time in the given zone, e.g. "9:05 PM"
pub fn format_check_in_time(timestamp: DateTime<Utc>, tz: Tz) -> String {
    timestamp.with_timezone(&tz).format("%-I:%M %p").to_string()
}

/// Trim and uppercase a scanned or typed check-in code
pub fn normalize_token(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Validate email format
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.') && email.len() > 5,
        None => false,
    }
}

/// Normalize a phone number for SMS dispatch.
///
/// Strips everything but digits and prefixes `default_country_code` when the
/// number carries no international prefix. Returns `None` when the result cannot
/// be a valid E.164 number (fewer than 8 or more than 15 digits).
pub fn normalize_phone(raw: &str, default_country_code: &str) -> Option<String> {
    let trimmed = raw.trim();
    let has_plus = trimmed.starts_with('+');
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();

    if digits.is_empty() {
        return None;
    }

    let normalized = if has_plus {
        digits
    } else if let Some(rest) = digits.strip_prefix("00") {
        rest.to_string()
    } else if digits.starts_with('0') {
        format!("{}{}", default_country_code, digits.trim_start_matches('0'))
    } else if digits.len() <= 10 {
        format!("{}{}", default_country_code, digits)
    } else {
        digits
    };

    if (8..=15).contains(&normalized.len()) {
        Some(normalized)
    } else {
        None
    }
}

/// Generate a random string drawn from `alphabet`
pub fn generate_random_string<R: Rng + ?Sized>(rng: &mut R, alphabet: &[u8], length: usize) -> String {
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..alphabet.len());
            alphabet[idx] as char
        })
        .collect()
}

/// Escape text for inclusion in an HTML email body
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
