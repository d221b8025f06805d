//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use chrono_tz::Tz;
use crate::utils::errors::{GuestListError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_database_config(&settings.database)?;
    validate_logging_config(&settings.logging)?;
    validate_lifecycle_config(&settings.lifecycle)?;
    validate_token_config(&settings.tokens)?;
    validate_invitation_config(&settings.invitations)?;

    if settings.email.enabled {
        validate_email_config(&settings.email)?;
    }

    if settings.sms.enabled {
        validate_sms_config(&settings.sms)?;
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(GuestListError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(GuestListError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(GuestListError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(GuestListError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(GuestListError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}

const MAX_WINDOW_DAYS: i64 = 3650;
const MAX_WINDOW_HOURS: i64 = 8760;

/// Validate lifecycle windows
fn validate_lifecycle_config(config: &super::LifecycleConfig) -> Result<()> {
    if config.retention_days <= 0 || config.purge_days <= 0 {
        return Err(GuestListError::Config(
            "Retention and purge windows must be positive".to_string()
        ));
    }

    if config.retention_days > MAX_WINDOW_DAYS || config.purge_days > MAX_WINDOW_DAYS {
        return Err(GuestListError::Config(
            format!("Retention and purge windows must be at most {} days", MAX_WINDOW_DAYS)
        ));
    }

    if config.recently_cancelled_hours <= 0 {
        return Err(GuestListError::Config(
            "Recently cancelled window must be positive".to_string()
        ));
    }

    if config.recently_cancelled_hours > MAX_WINDOW_HOURS {
        return Err(GuestListError::Config(
            format!("Recently cancelled window must be at most {} hours", MAX_WINDOW_HOURS)
        ));
    }

    if config.sweep_interval_seconds == 0 {
        return Err(GuestListError::Config(
            "Sweep interval must be greater than 0".to_string()
        ));
    }

    if config.timezone.parse::<Tz>().is_err() {
        return Err(GuestListError::Config(
            format!("Unknown timezone: {}", config.timezone)
        ));
    }

    Ok(())
}

/// Validate token shapes
fn validate_token_config(config: &super::TokenConfig) -> Result<()> {
    if config.check_in_length < 4 {
        return Err(GuestListError::Config(
            "Check-in code length must be at least 4".to_string()
        ));
    }

    let alphabet = &config.check_in_alphabet;
    if alphabet.chars().count() < 16 {
        return Err(GuestListError::Config(
            "Check-in alphabet needs at least 16 symbols".to_string()
        ));
    }

    if !alphabet.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
        return Err(GuestListError::Config(
            "Check-in alphabet must be uppercase ASCII letters and digits".to_string()
        ));
    }

    let prefix_pattern = regex::Regex::new(r"^[A-Z0-9]{1,6}-?$")
        .map_err(|_| GuestListError::Config("Invalid prefix pattern".to_string()))?;
    if !prefix_pattern.is_match(&config.check_in_prefix) {
        return Err(GuestListError::Config(
            "Check-in prefix must be 1-6 uppercase letters or digits, optionally ending in '-'".to_string()
        ));
    }

    if config.invite_token_length < 32 {
        return Err(GuestListError::Config(
            "Invite token length must be at least 32".to_string()
        ));
    }

    if config.max_issue_attempts == 0 {
        return Err(GuestListError::Config(
            "Max issue attempts must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate invitation links and pacing
fn validate_invitation_config(config: &super::InvitationConfig) -> Result<()> {
    url::Url::parse(&config.public_base_url)
        .map_err(|e| GuestListError::Config(format!("Invalid public_base_url: {}", e)))?;
    url::Url::parse(&config.code_renderer_url)
        .map_err(|e| GuestListError::Config(format!("Invalid code_renderer_url: {}", e)))?;

    if config.email_per_second == 0 || config.sms_per_second == 0 {
        return Err(GuestListError::Config(
            "Provider rates must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate email provider configuration
fn validate_email_config(config: &super::EmailConfig) -> Result<()> {
    if config.api_url.is_empty() || config.api_key.is_empty() {
        return Err(GuestListError::Config(
            "Email API URL and key are required when email is enabled".to_string()
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(GuestListError::Config(
            "Email timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate SMS provider configuration
fn validate_sms_config(config: &super::SmsConfig) -> Result<()> {
    if config.api_url.is_empty() || config.api_key.is_empty() {
        return Err(GuestListError::Config(
            "SMS API URL and key are required when SMS is enabled".to_string()
        ));
    }

    if config.template_id.is_empty() {
        return Err(GuestListError::Config(
            "SMS template ID is required when SMS is enabled".to_string()
        ));
    }

    if config.default_country_code.is_empty() || !config.default_country_code.chars().all(|c| c.is_ascii_digit()) {
        return Err(GuestListError::Config(
            "Default country code must be digits".to_string()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn test_rejects_unknown_timezone() {
        let mut settings = Settings::default();
        settings.lifecycle.timezone = "Mars/Olympus_Mons".to_string();
        assert!(matches!(validate_settings(&settings), Err(GuestListError::Config(_))));
    }

    #[test]
    fn test_rejects_oversized_windows() {
        let mut settings = Settings::default();
        settings.lifecycle.retention_days = i64::MAX / 1000;
        assert!(matches!(validate_settings(&settings), Err(GuestListError::Config(_))));

        let mut settings = Settings::default();
        settings.lifecycle.recently_cancelled_hours = 8761;
        assert!(matches!(validate_settings(&settings), Err(GuestListError::Config(_))));

        let mut settings = Settings::default();
        settings.lifecycle.purge_days = 3650;
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_rejects_empty_and_relative_urls() {
        let mut settings = Settings::default();
        settings.invitations.public_base_url = String::new();
        assert!(matches!(validate_settings(&settings), Err(GuestListError::Config(_))));

        let mut settings = Settings::default();
        settings.invitations.code_renderer_url = "/codes".to_string();
        assert!(matches!(validate_settings(&settings), Err(GuestListError::Config(_))));
    }

    #[test]
    fn test_rejects_lowercase_alphabet() {
        let mut settings = Settings::default();
        settings.tokens.check_in_alphabet = "abcdefghijklmnopqrstuvwxyz".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_rejects_lowercase_prefix() {
        let mut settings = Settings::default();
        settings.tokens.check_in_prefix = "gl-".to_string();
        assert!(matches!(validate_settings(&settings), Err(GuestListError::Config(_))));
    }

    #[test]
    fn test_enabled_email_requires_key() {
        let mut settings = Settings::default();
        settings.email.enabled = true;
        assert!(validate_settings(&settings).is_err());

        settings.email.api_key = "key".to_string();
        assert!(validate_settings(&settings).is_ok());
    }
}
