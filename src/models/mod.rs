//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod event;
pub mod guest;
pub mod account;

// Re-export commonly used models
pub use event::{Event, EventRow, EventStatus, StatusKind, ArchiveInfo, DeletedBy, DeleteActor, CreateEventRequest, UpdateEventRequest};
pub use guest::{Guest, GuestRow, GuestCounts, GuestFilter, InvitationChannel, CreateGuestRequest, UpdateGuestRequest};
pub use account::{AccountRole, ApprovalStatus};
