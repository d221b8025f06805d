//! Database service layer
//!
//! Bundles the PostgreSQL repositories and exposes them through the storage
//! traits the lifecycle and check-in services are written against.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::database::{DatabasePool, EventRepository, GuestRepository};
use crate::database::store::{EventStore, GuestStore};
use crate::models::*;
use crate::utils::errors::Result;

#[derive(Clone)]
pub struct DatabaseService {
    pub events: EventRepository,
    pub guests: GuestRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            events: EventRepository::new(pool.clone()),
            guests: GuestRepository::new(pool),
        }
    }
}

#[async_trait]
impl EventStore for DatabaseService {
    async fn insert_event(&self, event: &Event) -> Result<Event> {
        self.events.create(event).await
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>> {
        self.events.find_by_id(id).await
    }

    async fn update_event_details(&self, id: Uuid, request: &UpdateEventRequest) -> Result<Option<Event>> {
        self.events.update_details(id, request).await
    }

    async fn list_events_by_status(&self, status: StatusKind) -> Result<Vec<Event>> {
        self.events.list_by_status(status).await
    }

    async fn list_host_events(&self, host_id: Uuid) -> Result<Vec<Event>> {
        self.events.list_for_host(host_id).await
    }

    async fn list_venue_events(&self, venue_id: Uuid, cancelled_since: DateTime<Utc>) -> Result<Vec<Event>> {
        self.events.list_for_venue(venue_id, cancelled_since).await
    }

    async fn transition_event(&self, id: Uuid, from: &[StatusKind], to: &EventStatus) -> Result<Option<Event>> {
        self.events.transition(id, from, to).await
    }

    async fn purge_event(&self, id: Uuid, archived_before: DateTime<Utc>) -> Result<Option<u64>> {
        self.events.purge(id, archived_before).await
    }

    async fn remove_event(&self, id: Uuid) -> Result<Option<u64>> {
        self.events.remove(id).await
    }

    async fn delete_event_if_empty(&self, id: Uuid) -> Result<bool> {
        self.events.delete_if_empty(id).await
    }
}

#[async_trait]
impl GuestStore for DatabaseService {
    async fn insert_guest(&self, guest: &Guest) -> Result<Guest> {
        self.guests.create(guest).await
    }

    async fn find_guest(&self, id: Uuid) -> Result<Option<Guest>> {
        self.guests.find_by_id(id).await
    }

    async fn find_guest_by_check_in_token(&self, token: &str) -> Result<Option<Guest>> {
        self.guests.find_by_check_in_token(token).await
    }

    async fn find_guest_by_invite_token(&self, token: &str) -> Result<Option<Guest>> {
        self.guests.find_by_invite_token(token).await
    }

    async fn list_guests(&self, event_id: Uuid) -> Result<Vec<Guest>> {
        self.guests.list_by_event(event_id).await
    }

    async fn count_guests(&self, event_id: Uuid) -> Result<GuestCounts> {
        self.guests.counts(event_id).await
    }

    async fn update_guest_profile(&self, id: Uuid, request: &UpdateGuestRequest) -> Result<Option<Guest>> {
        self.guests.update_profile(id, request).await
    }

    async fn replace_check_in_token(&self, id: Uuid, token: &str) -> Result<Option<Guest>> {
        self.guests.replace_check_in_token(id, token).await
    }

    async fn delete_guest(&self, id: Uuid) -> Result<bool> {
        self.guests.delete(id).await
    }

    async fn mark_checked_in(&self, id: Uuid, checked_in_time: &str, checked_in_by: &str) -> Result<Option<Guest>> {
        self.guests.mark_checked_in(id, checked_in_time, checked_in_by).await
    }

    async fn record_invitation_open(&self, id: Uuid, at: DateTime<Utc>) -> Result<Option<Guest>> {
        self.guests.record_open(id, at).await
    }

    async fn set_invite_token_if_absent(&self, id: Uuid, token: &str) -> Result<Option<String>> {
        self.guests.set_invite_token_if_absent(id, token).await
    }

    async fn mark_invitation_sent(&self, id: Uuid, via: InvitationChannel, at: DateTime<Utc>) -> Result<Option<Guest>> {
        self.guests.mark_invitation_sent(id, via, at).await
    }
}
