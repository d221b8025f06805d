//! Storage contracts
//!
//! Every write the lifecycle controller and the check-in protocol depend on for
//! correctness is expressed here as a single conditional operation, so the
//! precondition check and the write cannot be separated by a concurrent request.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::models::{
    Event, EventStatus, StatusKind, Guest, GuestCounts, InvitationChannel, UpdateEventRequest, UpdateGuestRequest,
};
use crate::utils::errors::Result;

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert_event(&self, event: &Event) -> Result<Event>;

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>>;

    /// Apply detail edits to a non-archived event. Date and time edits only
    /// apply while the event is still `created`.
    async fn update_event_details(&self, id: Uuid, request: &UpdateEventRequest) -> Result<Option<Event>>;

    async fn list_events_by_status(&self, status: StatusKind) -> Result<Vec<Event>>;

    /// Non-archived events of a host
    async fn list_host_events(&self, host_id: Uuid) -> Result<Vec<Event>>;

    /// Non-archived events of a venue plus events cancelled before they took
    /// place and archived at or after `cancelled_since`
    async fn list_venue_events(&self, venue_id: Uuid, cancelled_since: DateTime<Utc>) -> Result<Vec<Event>>;

    /// Move an event to `to` only if its current status is one of `from`.
    /// Returns the updated event, or `None` when the precondition did not hold.
    async fn transition_event(&self, id: Uuid, from: &[StatusKind], to: &EventStatus) -> Result<Option<Event>>;

    /// Remove an archived event whose archival happened before `archived_before`,
    /// detaching its guests. Returns the number of detached guests when removed.
    async fn purge_event(&self, id: Uuid, archived_before: DateTime<Utc>) -> Result<Option<u64>>;

    /// Remove an event in any state, detaching its guests. Returns the number of
    /// detached guests when the event existed.
    async fn remove_event(&self, id: Uuid) -> Result<Option<u64>>;

    /// Remove an event only while it has no guests
    async fn delete_event_if_empty(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait GuestStore: Send + Sync {
    /// Fails with `EventNotFound` when `event_id` names no event, and with
    /// `DuplicateToken` when either token is already taken
    async fn insert_guest(&self, guest: &Guest) -> Result<Guest>;

    async fn find_guest(&self, id: Uuid) -> Result<Option<Guest>>;

    /// Exact match on an already-normalized check-in token
    async fn find_guest_by_check_in_token(&self, token: &str) -> Result<Option<Guest>>;

    async fn find_guest_by_invite_token(&self, token: &str) -> Result<Option<Guest>>;

    async fn list_guests(&self, event_id: Uuid) -> Result<Vec<Guest>>;

    async fn count_guests(&self, event_id: Uuid) -> Result<GuestCounts>;

    async fn update_guest_profile(&self, id: Uuid, request: &UpdateGuestRequest) -> Result<Option<Guest>>;

    /// Fails with `DuplicateToken` when the token is already taken
    async fn replace_check_in_token(&self, id: Uuid, token: &str) -> Result<Option<Guest>>;

    async fn delete_guest(&self, id: Uuid) -> Result<bool>;

    /// Compare-and-set on `checked_in = false`. Returns the updated guest only
    /// for the caller that performed the transition.
    async fn mark_checked_in(&self, id: Uuid, checked_in_time: &str, checked_in_by: &str) -> Result<Option<Guest>>;

    /// Increment the open counter and stamp the open time
    async fn record_invitation_open(&self, id: Uuid, at: DateTime<Utc>) -> Result<Option<Guest>>;

    /// Store `token` unless the guest already has an invite token; returns the
    /// token in effect afterwards
    async fn set_invite_token_if_absent(&self, id: Uuid, token: &str) -> Result<Option<String>>;

    async fn mark_invitation_sent(&self, id: Uuid, via: InvitationChannel, at: DateTime<Utc>) -> Result<Option<Guest>>;
}

/// Everything the core needs from persistence
pub trait Store: EventStore + GuestStore {}

impl<T: EventStore + GuestStore> Store for T {}
