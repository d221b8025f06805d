//! Guestlist
//!
//! Guest-list and check-in backend for live events. This library provides the
//! event lifecycle controller (smart-delete, restore, retention sweep), the
//! check-in credential protocol, guest management and bulk invitation dispatch
//! over pluggable storage.

pub mod config;
pub mod database;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{GuestListError, Result};

// Re-export main components for easy access
pub use database::{DatabaseService, MemoryStore, Store};
pub use services::ServiceFactory;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
