//! Store wrapper that fails writes for selected events

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use guestlist::database::{EventStore, GuestStore, MemoryStore};
use guestlist::models::*;
use guestlist::{GuestListError, Result};

/// Delegates to a [`MemoryStore`] but fails `transition_event` and
/// `purge_event` for the events marked broken
pub struct FlakyStore {
    inner: Arc<MemoryStore>,
    broken: Mutex<HashSet<Uuid>>,
}

impl FlakyStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            broken: Mutex::new(HashSet::new()),
        }
    }

    pub fn break_event(&self, id: Uuid) {
        self.broken.lock().unwrap().insert(id);
    }

    pub fn heal_event(&self, id: Uuid) {
        self.broken.lock().unwrap().remove(&id);
    }

    fn check(&self, id: Uuid) -> Result<()> {
        if self.broken.lock().unwrap().contains(&id) {
            return Err(GuestListError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "injected storage failure",
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl EventStore for FlakyStore {
    async fn insert_event(&self, event: &Event) -> Result<Event> {
        self.inner.insert_event(event).await
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>> {
        self.inner.find_event(id).await
    }

    async fn update_event_details(&self, id: Uuid, request: &UpdateEventRequest) -> Result<Option<Event>> {
        self.inner.update_event_details(id, request).await
    }

    async fn list_events_by_status(&self, status: StatusKind) -> Result<Vec<Event>> {
        self.inner.list_events_by_status(status).await
    }

    async fn list_host_events(&self, host_id: Uuid) -> Result<Vec<Event>> {
        self.inner.list_host_events(host_id).await
    }

    async fn list_venue_events(&self, venue_id: Uuid, cancelled_since: DateTime<Utc>) -> Result<Vec<Event>> {
        self.inner.list_venue_events(venue_id, cancelled_since).await
    }

    async fn transition_event(&self, id: Uuid, from: &[StatusKind], to: &EventStatus) -> Result<Option<Event>> {
        self.check(id)?;
        self.inner.transition_event(id, from, to).await
    }

    async fn purge_event(&self, id: Uuid, archived_before: DateTime<Utc>) -> Result<Option<u64>> {
        self.check(id)?;
        self.inner.purge_event(id, archived_before).await
    }

    async fn remove_event(&self, id: Uuid) -> Result<Option<u64>> {
        self.inner.remove_event(id).await
    }

    async fn delete_event_if_empty(&self, id: Uuid) -> Result<bool> {
        self.inner.delete_event_if_empty(id).await
    }
}

#[async_trait]
impl GuestStore for FlakyStore {
    async fn insert_guest(&self, guest: &Guest) -> Result<Guest> {
        self.inner.insert_guest(guest).await
    }

    async fn find_guest(&self, id: Uuid) -> Result<Option<Guest>> {
        self.inner.find_guest(id).await
    }

    async fn find_guest_by_check_in_token(&self, token: &str) -> Result<Option<Guest>> {
        self.inner.find_guest_by_check_in_token(token).await
    }

    async fn find_guest_by_invite_token(&self, token: &str) -> Result<Option<Guest>> {
        self.inner.find_guest_by_invite_token(token).await
    }

    async fn list_guests(&self, event_id: Uuid) -> Result<Vec<Guest>> {
        self.inner.list_guests(event_id).await
    }

    async fn count_guests(&self, event_id: Uuid) -> Result<GuestCounts> {
        self.inner.count_guests(event_id).await
    }

    async fn update_guest_profile(&self, id: Uuid, request: &UpdateGuestRequest) -> Result<Option<Guest>> {
        self.inner.update_guest_profile(id, request).await
    }

    async fn replace_check_in_token(&self, id: Uuid, token: &str) -> Result<Option<Guest>> {
        self.inner.replace_check_in_token(id, token).await
    }

    async fn delete_guest(&self, id: Uuid) -> Result<bool> {
        self.inner.delete_guest(id).await
    }

    async fn mark_checked_in(&self, id: Uuid, checked_in_time: &str, checked_in_by: &str) -> Result<Option<Guest>> {
        self.inner.mark_checked_in(id, checked_in_time, checked_in_by).await
    }

    async fn record_invitation_open(&self, id: Uuid, at: DateTime<Utc>) -> Result<Option<Guest>> {
        self.inner.record_invitation_open(id, at).await
    }

    async fn set_invite_token_if_absent(&self, id: Uuid, token: &str) -> Result<Option<String>> {
        self.inner.set_invite_token_if_absent(id, token).await
    }

    async fn mark_invitation_sent(&self, id: Uuid, via: InvitationChannel, at: DateTime<Utc>) -> Result<Option<Guest>> {
        self.inner.mark_invitation_sent(id, via, at).await
    }
}
