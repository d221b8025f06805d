//! Test helpers module
//!
//! This module provides utilities and helpers for testing the Guestlist crate.
//! It includes mock providers, a fault-injecting store, database helpers, and
//! test context setup.

#![allow(dead_code)]

pub mod database_helper;
pub mod flaky_store;
pub mod mock_senders;
pub mod provider_mock;
pub mod test_context;
pub mod test_data;

pub use database_helper::*;
pub use flaky_store::*;
pub use mock_senders::*;
pub use provider_mock::*;
pub use test_context::*;
pub use test_data::*;
