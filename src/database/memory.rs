//! In-process store
//!
//! Holds events and guests behind a single mutex, which makes every trait
//! operation atomic with the same semantics as the PostgreSQL store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::database::store::{EventStore, GuestStore};
use crate::models::{
    Event, EventStatus, StatusKind, Guest, GuestCounts, InvitationChannel, UpdateEventRequest, UpdateGuestRequest,
};
use crate::utils::errors::{GuestListError, Result};

#[derive(Debug, Default)]
struct MemoryState {
    events: HashMap<Uuid, Event>,
    guests: HashMap<Uuid, Guest>,
}

impl MemoryState {
    fn detach_guests(&mut self, event_id: Uuid) -> u64 {
        let mut detached = 0;
        for guest in self.guests.values_mut().filter(|g| g.event_id == Some(event_id)) {
            guest.event_id = None;
            guest.updated_at = Utc::now();
            detached += 1;
        }
        detached
    }

    fn check_in_token_taken(&self, token: &str, except: Option<Uuid>) -> bool {
        self.guests
            .values()
            .any(|g| Some(g.id) != except && g.check_in_token == token)
    }

    fn invite_token_taken(&self, token: &str, except: Option<Uuid>) -> bool {
        self.guests
            .values()
            .any(|g| Some(g.id) != except && g.invite_token.as_deref() == Some(token))
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn event_count(&self) -> usize {
        self.lock().events.len()
    }

    pub fn guest_count(&self) -> usize {
        self.lock().guests.len()
    }
}

fn sorted_by_date(mut events: Vec<Event>) -> Vec<Event> {
    events.sort_by(|a, b| a.date.cmp(&b.date).then(a.time_start.cmp(&b.time_start)));
    events
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert_event(&self, event: &Event) -> Result<Event> {
        let mut state = self.lock();
        if state.events.contains_key(&event.id) {
            return Err(GuestListError::InvalidInput(format!("Event {} already exists", event.id)));
        }
        state.events.insert(event.id, event.clone());
        Ok(event.clone())
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>> {
        Ok(self.lock().events.get(&id).cloned())
    }

    async fn update_event_details(&self, id: Uuid, request: &UpdateEventRequest) -> Result<Option<Event>> {
        let mut state = self.lock();
        let event = match state.events.get_mut(&id) {
            Some(event)
                if matches!(event.status, EventStatus::Created)
                    || (!request.changes_schedule() && !event.status.is_archived()) =>
            {
                event
            }
            _ => return Ok(None),
        };

        if let Some(name) = &request.name {
            event.name = name.clone();
        }
        if let Some(date) = request.date {
            event.date = date;
        }
        if let Some(time_start) = request.time_start {
            event.time_start = Some(time_start);
        }
        if let Some(time_end) = request.time_end {
            event.time_end = Some(time_end);
        }
        if let Some(expected) = request.expected_guests {
            event.expected_guests = expected;
        }
        if let Some(color) = &request.color {
            event.color = Some(color.clone());
        }
        if let Some(wristband) = &request.wristband_color {
            event.wristband_color = Some(wristband.clone());
        }
        event.updated_at = Utc::now();
        Ok(Some(event.clone()))
    }

    async fn list_events_by_status(&self, status: StatusKind) -> Result<Vec<Event>> {
        let state = self.lock();
        Ok(sorted_by_date(
            state.events.values().filter(|e| e.status.kind() == status).cloned().collect(),
        ))
    }

    async fn list_host_events(&self, host_id: Uuid) -> Result<Vec<Event>> {
        let state = self.lock();
        Ok(sorted_by_date(
            state
                .events
                .values()
                .filter(|e| e.host_id == host_id && !e.status.is_archived())
                .cloned()
                .collect(),
        ))
    }

    async fn list_venue_events(&self, venue_id: Uuid, cancelled_since: DateTime<Utc>) -> Result<Vec<Event>> {
        let state = self.lock();
        Ok(sorted_by_date(
            state
                .events
                .values()
                .filter(|e| e.venue_id == venue_id)
                .filter(|e| match &e.status {
                    EventStatus::Archived(info) => info.cancelled_before_event && info.deleted_at >= cancelled_since,
                    _ => true,
                })
                .cloned()
                .collect(),
        ))
    }

    async fn transition_event(&self, id: Uuid, from: &[StatusKind], to: &EventStatus) -> Result<Option<Event>> {
        let mut state = self.lock();
        match state.events.get_mut(&id) {
            Some(event) if from.contains(&event.status.kind()) => {
                event.status = to.clone();
                event.updated_at = Utc::now();
                Ok(Some(event.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn purge_event(&self, id: Uuid, archived_before: DateTime<Utc>) -> Result<Option<u64>> {
        let mut state = self.lock();
        let due = match state.events.get(&id).map(|e| &e.status) {
            Some(EventStatus::Archived(info)) => info.deleted_at < archived_before,
            _ => false,
        };
        if !due {
            return Ok(None);
        }
        let detached = state.detach_guests(id);
        state.events.remove(&id);
        Ok(Some(detached))
    }

    async fn remove_event(&self, id: Uuid) -> Result<Option<u64>> {
        let mut state = self.lock();
        if !state.events.contains_key(&id) {
            return Ok(None);
        }
        let detached = state.detach_guests(id);
        state.events.remove(&id);
        Ok(Some(detached))
    }

    async fn delete_event_if_empty(&self, id: Uuid) -> Result<bool> {
        let mut state = self.lock();
        let has_guests = state.guests.values().any(|g| g.event_id == Some(id));
        if has_guests {
            return Ok(false);
        }
        Ok(state.events.remove(&id).is_some())
    }
}

#[async_trait]
impl GuestStore for MemoryStore {
    async fn insert_guest(&self, guest: &Guest) -> Result<Guest> {
        let mut state = self.lock();
        if let Some(event_id) = guest.event_id {
            if !state.events.contains_key(&event_id) {
                return Err(GuestListError::EventNotFound { event_id });
            }
        }
        if state.check_in_token_taken(&guest.check_in_token, None) {
            return Err(GuestListError::DuplicateToken {
                constraint: "guests_check_in_token_key".to_string(),
            });
        }
        if let Some(invite) = &guest.invite_token {
            if state.invite_token_taken(invite, None) {
                return Err(GuestListError::DuplicateToken {
                    constraint: "guests_invite_token_key".to_string(),
                });
            }
        }
        state.guests.insert(guest.id, guest.clone());
        Ok(guest.clone())
    }

    async fn find_guest(&self, id: Uuid) -> Result<Option<Guest>> {
        Ok(self.lock().guests.get(&id).cloned())
    }

    async fn find_guest_by_check_in_token(&self, token: &str) -> Result<Option<Guest>> {
        Ok(self.lock().guests.values().find(|g| g.check_in_token == token).cloned())
    }

    async fn find_guest_by_invite_token(&self, token: &str) -> Result<Option<Guest>> {
        Ok(self
            .lock()
            .guests
            .values()
            .find(|g| g.invite_token.as_deref() == Some(token))
            .cloned())
    }

    async fn list_guests(&self, event_id: Uuid) -> Result<Vec<Guest>> {
        let state = self.lock();
        let mut guests: Vec<Guest> = state
            .guests
            .values()
            .filter(|g| g.event_id == Some(event_id))
            .cloned()
            .collect();
        guests.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.name.cmp(&b.name)));
        Ok(guests)
    }

    async fn count_guests(&self, event_id: Uuid) -> Result<GuestCounts> {
        let state = self.lock();
        let mut counts = GuestCounts::default();
        for guest in state.guests.values().filter(|g| g.event_id == Some(event_id)) {
            counts.total += 1;
            counts.headcount += guest.party_size();
            if guest.checked_in {
                counts.checked_in += 1;
            }
        }
        Ok(counts)
    }

    async fn update_guest_profile(&self, id: Uuid, request: &UpdateGuestRequest) -> Result<Option<Guest>> {
        let mut state = self.lock();
        let guest = match state.guests.get_mut(&id) {
            Some(guest) => guest,
            None => return Ok(None),
        };
        if let Some(name) = &request.name {
            guest.name = name.clone();
        }
        if let Some(email) = &request.email {
            guest.email = Some(email.clone());
        }
        if let Some(phone) = &request.phone {
            guest.phone = Some(phone.clone());
        }
        if let Some(category) = &request.category {
            guest.category = category.clone();
        }
        if let Some(plus_ones) = request.plus_ones {
            guest.plus_ones = plus_ones;
        }
        guest.updated_at = Utc::now();
        Ok(Some(guest.clone()))
    }

    async fn replace_check_in_token(&self, id: Uuid, token: &str) -> Result<Option<Guest>> {
        let mut state = self.lock();
        if !state.guests.contains_key(&id) {
            return Ok(None);
        }
        if state.check_in_token_taken(token, Some(id)) {
            return Err(GuestListError::DuplicateToken {
                constraint: "guests_check_in_token_key".to_string(),
            });
        }
        let guest = match state.guests.get_mut(&id) {
            Some(guest) => guest,
            None => return Ok(None),
        };
        guest.check_in_token = token.to_string();
        guest.updated_at = Utc::now();
        Ok(Some(guest.clone()))
    }

    async fn delete_guest(&self, id: Uuid) -> Result<bool> {
        Ok(self.lock().guests.remove(&id).is_some())
    }

    async fn mark_checked_in(&self, id: Uuid, checked_in_time: &str, checked_in_by: &str) -> Result<Option<Guest>> {
        let mut state = self.lock();
        match state.guests.get_mut(&id) {
            Some(guest) if !guest.checked_in => {
                guest.checked_in = true;
                guest.checked_in_time = Some(checked_in_time.to_string());
                guest.checked_in_by = Some(checked_in_by.to_string());
                guest.updated_at = Utc::now();
                Ok(Some(guest.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn record_invitation_open(&self, id: Uuid, at: DateTime<Utc>) -> Result<Option<Guest>> {
        let mut state = self.lock();
        Ok(state.guests.get_mut(&id).map(|guest| {
            guest.invitation_opened = true;
            guest.invitation_opened_at = Some(at);
            guest.invitation_open_count += 1;
            guest.updated_at = Utc::now();
            guest.clone()
        }))
    }

    async fn set_invite_token_if_absent(&self, id: Uuid, token: &str) -> Result<Option<String>> {
        let mut state = self.lock();
        let existing = match state.guests.get(&id) {
            Some(guest) => guest.invite_token.clone(),
            None => return Ok(None),
        };
        if let Some(existing) = existing {
            return Ok(Some(existing));
        }
        if state.invite_token_taken(token, Some(id)) {
            return Err(GuestListError::DuplicateToken {
                constraint: "guests_invite_token_key".to_string(),
            });
        }
        let guest = match state.guests.get_mut(&id) {
            Some(guest) => guest,
            None => return Ok(None),
        };
        guest.invite_token = Some(token.to_string());
        guest.updated_at = Utc::now();
        Ok(Some(token.to_string()))
    }

    async fn mark_invitation_sent(&self, id: Uuid, via: InvitationChannel, at: DateTime<Utc>) -> Result<Option<Guest>> {
        let mut state = self.lock();
        Ok(state.guests.get_mut(&id).map(|guest| {
            guest.invitation_sent = true;
            guest.invitation_sent_at = Some(at);
            guest.invitation_sent_via = Some(via);
            guest.updated_at = Utc::now();
            guest.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArchiveInfo, DeletedBy};

    fn event() -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            name: "Late Show".to_string(),
            date: now.date_naive(),
            time_start: None,
            time_end: None,
            venue_id: Uuid::new_v4(),
            host_id: Uuid::new_v4(),
            expected_guests: 10,
            color: None,
            wristband_color: None,
            status: EventStatus::Created,
            created_at: now,
            updated_at: now,
        }
    }

    fn guest(event_id: Uuid, token: &str) -> Guest {
        let now = Utc::now();
        Guest {
            id: Uuid::new_v4(),
            event_id: Some(event_id),
            name: "Lin".to_string(),
            email: None,
            phone: None,
            category: "General".to_string(),
            plus_ones: 0,
            is_walkin: false,
            check_in_token: token.to_string(),
            invite_token: None,
            checked_in: false,
            checked_in_time: None,
            checked_in_by: None,
            invitation_sent: false,
            invitation_sent_at: None,
            invitation_sent_via: None,
            invitation_opened: false,
            invitation_opened_at: None,
            invitation_open_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_mark_checked_in_only_once() {
        let store = MemoryStore::new();
        let event = store.insert_event(&event()).await.unwrap();
        let guest = store.insert_guest(&guest(event.id, "GL-AAAA2222")).await.unwrap();

        assert!(store.mark_checked_in(guest.id, "9:00 PM", "Door").await.unwrap().is_some());
        assert!(store.mark_checked_in(guest.id, "9:01 PM", "Bar").await.unwrap().is_none());
        let stored = store.find_guest(guest.id).await.unwrap().unwrap();
        assert_eq!(stored.checked_in_time.as_deref(), Some("9:00 PM"));
    }

    #[tokio::test]
    async fn test_duplicate_check_in_token_is_rejected() {
        let store = MemoryStore::new();
        let event = store.insert_event(&event()).await.unwrap();
        store.insert_guest(&guest(event.id, "GL-AAAA2222")).await.unwrap();

        let err = store.insert_guest(&guest(event.id, "GL-AAAA2222")).await.unwrap_err();
        assert!(matches!(err, GuestListError::DuplicateToken { .. }));
        assert_eq!(store.guest_count(), 1);
    }

    #[tokio::test]
    async fn test_guest_for_missing_event_is_rejected() {
        let store = MemoryStore::new();
        let missing = Uuid::new_v4();

        let err = store.insert_guest(&guest(missing, "GL-CCCC4444")).await.unwrap_err();
        assert!(matches!(err, GuestListError::EventNotFound { event_id } if event_id == missing));
        assert_eq!(store.guest_count(), 0);

        let event = store.insert_event(&event()).await.unwrap();
        assert!(store.delete_event_if_empty(event.id).await.unwrap());
        let err = store.insert_guest(&guest(event.id, "GL-CCCC4444")).await.unwrap_err();
        assert!(matches!(err, GuestListError::EventNotFound { .. }));

        let mut detached = guest(event.id, "GL-DDDD5555");
        detached.event_id = None;
        assert!(store.insert_guest(&detached).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_if_empty_and_purge_cutoff() {
        let store = MemoryStore::new();
        let busy = store.insert_event(&event()).await.unwrap();
        store.insert_guest(&guest(busy.id, "GL-BBBB3333")).await.unwrap();
        assert!(!store.delete_event_if_empty(busy.id).await.unwrap());

        let archived_at = Utc::now();
        let archived = EventStatus::Archived(ArchiveInfo {
            deleted_by: DeletedBy::System,
            deleted_at: archived_at,
            cancelled_before_event: false,
        });
        store.transition_event(busy.id, &[StatusKind::Created], &archived).await.unwrap();

        assert_eq!(store.purge_event(busy.id, archived_at).await.unwrap(), None);
        assert_eq!(
            store.purge_event(busy.id, archived_at + chrono::Duration::seconds(1)).await.unwrap(),
            Some(1)
        );
        assert_eq!(store.event_count(), 0);
        assert_eq!(store.guest_count(), 1);
    }
}
