//! Database module
//!
//! This module handles database connections, the storage traits, and their
//! PostgreSQL and in-process implementations

pub mod connection;
pub mod memory;
pub mod repositories;
pub mod service;
pub mod store;

// Re-export commonly used database components
pub use connection::{DatabasePool, PoolConfig, create_pool, run_migrations, health_check};
pub use memory::MemoryStore;
pub use repositories::{EventRepository, GuestRepository};
pub use service::DatabaseService;
pub use store::{EventStore, GuestStore, Store};

/// PostgreSQL-backed store
pub type PgStore = DatabaseService;
