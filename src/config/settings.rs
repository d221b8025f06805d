//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use chrono::Duration;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub lifecycle: LifecycleConfig,
    pub tokens: TokenConfig,
    pub invitations: InvitationConfig,
    pub email: EmailConfig,
    pub sms: SmsConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory receiving the daily rolling log file
    pub file_path: String,
}

/// Event lifecycle windows and sweep cadence
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LifecycleConfig {
    /// Days after the event date before a completed event is archived
    pub retention_days: i64,
    /// Days after archival before an archived event is purged
    pub purge_days: i64,
    /// How long a pre-event cancellation stays visible to the venue
    pub recently_cancelled_hours: i64,
    pub sweep_interval_seconds: u64,
    /// IANA zone used to interpret event dates and times
    pub timezone: String,
}

/// Check-in and invite token shapes
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
    pub check_in_prefix: String,
    pub check_in_length: usize,
    pub check_in_alphabet: String,
    pub invite_token_length: usize,
    pub max_issue_attempts: u32,
}

/// Invitation links and provider pacing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InvitationConfig {
    pub public_base_url: String,
    pub code_renderer_url: String,
    pub pacing_ms: u64,
    pub email_per_second: u32,
    pub sms_per_second: u32,
}

/// Email provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmailConfig {
    pub enabled: bool,
    pub api_url: String,
    pub api_key: String,
    pub from_address: String,
    pub timeout_seconds: u64,
}

/// SMS provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmsConfig {
    pub enabled: bool,
    pub api_url: String,
    pub api_key: String,
    pub template_id: String,
    pub default_country_code: String,
    pub timeout_seconds: u64,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::from_file("config")
    }

    /// Load settings from the named file (extension optional) layered over defaults
    pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Settings::default())?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("GUESTLIST")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::GuestListError> {
        super::validation::validate_settings(self)
    }
}

impl LifecycleConfig {
    pub fn retention(&self) -> Duration {
        Duration::days(self.retention_days)
    }

    pub fn purge_after(&self) -> Duration {
        Duration::days(self.purge_days)
    }

    pub fn recently_cancelled_window(&self) -> Duration {
        Duration::hours(self.recently_cancelled_hours)
    }

    /// Parsed event timezone; validation guarantees the name is known
    pub fn tz(&self) -> Tz {
        self.timezone.parse().unwrap_or(chrono_tz::UTC)
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            retention_days: 15,
            purge_days: 30,
            recently_cancelled_hours: 48,
            sweep_interval_seconds: 3600,
            timezone: "UTC".to_string(),
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            check_in_prefix: "GL-".to_string(),
            check_in_length: 8,
            // No 0/O or 1/I, so hand-typed codes stay unambiguous
            check_in_alphabet: "ABCDEFGHJKLMNPQRSTUVWXYZ23456789".to_string(),
            invite_token_length: 48,
            max_issue_attempts: 5,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/guestlist".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: "./logs".to_string(),
            },
            lifecycle: LifecycleConfig::default(),
            tokens: TokenConfig::default(),
            invitations: InvitationConfig {
                public_base_url: "http://localhost:3000".to_string(),
                code_renderer_url: "https://api.qrserver.com/v1/create-qr-code/".to_string(),
                pacing_ms: 100,
                email_per_second: 10,
                sms_per_second: 5,
            },
            email: EmailConfig {
                enabled: false,
                api_url: "https://api.resend.com/emails".to_string(),
                api_key: String::new(),
                from_address: "invites@guestlist.local".to_string(),
                timeout_seconds: 10,
            },
            sms: SmsConfig {
                enabled: false,
                api_url: "https://control.msg91.com/api/v5/flow/".to_string(),
                api_key: String::new(),
                template_id: String::new(),
                default_country_code: "91".to_string(),
                timeout_seconds: 10,
            },
        }
    }
}
