//! Error handling for Guestlist
//!
//! This module defines the main error type used throughout the application
//! and the classification helpers callers use to decide how to surface it.

use thiserror::Error;
use uuid::Uuid;

/// Main error type for Guestlist
#[derive(Error, Debug)]
pub enum GuestListError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: Uuid },

    #[error("Guest not found: {guest_id}")]
    GuestNotFound { guest_id: Uuid },

    /// Deliberately carries no detail about the submitted token.
    #[error("Token not found")]
    TokenNotFound,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Check-in closed: {reason}")]
    CheckInClosed { reason: String },

    #[error("Duplicate token on {constraint}")]
    DuplicateToken { constraint: String },

    #[error("Could not issue a unique token after {attempts} attempts")]
    TokenIssuance { attempts: u32 },
}

/// Result type alias for Guestlist operations
pub type Result<T> = std::result::Result<T, GuestListError>;

impl GuestListError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            GuestListError::Database(_) => false,
            GuestListError::Migration(_) => false,
            GuestListError::Http(_) => true,
            GuestListError::Serialization(_) => false,
            GuestListError::Io(_) => true,
            GuestListError::UrlParse(_) => false,
            GuestListError::Config(_) => false,
            GuestListError::EventNotFound { .. } => false,
            GuestListError::GuestNotFound { .. } => false,
            GuestListError::TokenNotFound => false,
            GuestListError::InvalidInput(_) => false,
            GuestListError::InvalidStateTransition { .. } => false,
            GuestListError::CheckInClosed { .. } => false,
            GuestListError::DuplicateToken { .. } => true,
            GuestListError::TokenIssuance { .. } => false,
        }
    }

    /// Errors caused by the request rather than by the system
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            GuestListError::EventNotFound { .. }
                | GuestListError::GuestNotFound { .. }
                | GuestListError::TokenNotFound
                | GuestListError::InvalidInput(_)
                | GuestListError::InvalidStateTransition { .. }
                | GuestListError::CheckInClosed { .. }
        )
    }

    /// Not-found errors, for callers mapping onto a 404-style response
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GuestListError::EventNotFound { .. }
                | GuestListError::GuestNotFound { .. }
                | GuestListError::TokenNotFound
        )
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            GuestListError::Database(_) => ErrorSeverity::Critical,
            GuestListError::Migration(_) => ErrorSeverity::Critical,
            GuestListError::Config(_) => ErrorSeverity::Critical,
            GuestListError::TokenIssuance { .. } => ErrorSeverity::Critical,
            GuestListError::DuplicateToken { .. } => ErrorSeverity::Warning,
            GuestListError::InvalidStateTransition { .. } => ErrorSeverity::Warning,
            GuestListError::CheckInClosed { .. } => ErrorSeverity::Warning,
            GuestListError::InvalidInput(_) => ErrorSeverity::Info,
            GuestListError::TokenNotFound => ErrorSeverity::Info,
            GuestListError::EventNotFound { .. } => ErrorSeverity::Info,
            GuestListError::GuestNotFound { .. } => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_client_error() {
        let err = GuestListError::TokenNotFound;
        assert!(err.is_client_error());
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Token not found");
    }

    #[test]
    fn test_severity() {
        assert_eq!(GuestListError::Config("x".into()).severity(), ErrorSeverity::Critical);
        assert_eq!(GuestListError::InvalidInput("x".into()).severity(), ErrorSeverity::Info);
        assert!(GuestListError::DuplicateToken { constraint: "c".into() }.is_recoverable());
        assert!(!GuestListError::TokenIssuance { attempts: 5 }.is_client_error());
    }
}
