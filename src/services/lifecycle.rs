//! Event lifecycle controller
//!
//! Owns `Event.status`: creation, smart-delete, restore, hard delete, the
//! dashboard listings, and the periodic sweep that advances time-based
//! transitions (created -> completed -> archived -> purged).

use std::sync::Arc;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;
use crate::config::LifecycleConfig;
use crate::database::Store;
use crate::models::{
    ArchiveInfo, CreateEventRequest, DeleteActor, DeletedBy, Event, EventStatus, GuestCounts, StatusKind,
    UpdateEventRequest,
};
use crate::utils::clock::Clock;
use crate::utils::errors::{GuestListError, Result};
use crate::utils::logging::{log_event_transition, log_store_error, log_sweep_report};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteAction {
    Deleted,
    Archived,
}

/// Result of a smart-delete request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartDeleteOutcome {
    pub action: DeleteAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_before_event: Option<bool>,
    pub guest_count: i64,
    pub checked_in_count: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoreOutcome {
    pub event: Event,
    pub restored_status: StatusKind,
}

/// Per-category counts from one sweep pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub completed: u32,
    pub archived: u32,
    pub purged: u32,
    pub failed: u32,
}

impl SweepReport {
    pub fn transitions(&self) -> u32 {
        self.completed + self.archived + self.purged
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    pub event: Event,
    pub guests: GuestCounts,
}

#[derive(Clone)]
pub struct LifecycleController {
    store: Arc<dyn Store>,
    config: LifecycleConfig,
    clock: Arc<dyn Clock>,
}

fn validate_event_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(GuestListError::InvalidInput("Event name is required".to_string()));
    }
    if name.chars().count() > 200 {
        return Err(GuestListError::InvalidInput("Event name is too long".to_string()));
    }
    Ok(name.to_string())
}

fn validate_expected_guests(expected: i32) -> Result<i32> {
    if expected < 0 {
        return Err(GuestListError::InvalidInput("Expected guests cannot be negative".to_string()));
    }
    Ok(expected)
}

impl LifecycleController {
    pub fn new(store: Arc<dyn Store>, config: LifecycleConfig, clock: Arc<dyn Clock>) -> Self {
        Self { store, config, clock }
    }

    /// Create an event in the `created` state
    pub async fn create_event(&self, request: CreateEventRequest) -> Result<Event> {
        let name = validate_event_name(&request.name)?;
        let venue_id = request
            .venue_id
            .ok_or_else(|| GuestListError::InvalidInput("Venue is required".to_string()))?;
        let expected_guests = validate_expected_guests(request.expected_guests.unwrap_or(0))?;

        let now = self.clock.now();
        let event = Event {
            id: Uuid::new_v4(),
            name,
            date: request.date,
            time_start: request.time_start,
            time_end: request.time_end,
            venue_id,
            host_id: request.host_id,
            expected_guests,
            color: request.color,
            wristband_color: request.wristband_color,
            status: EventStatus::Created,
            created_at: now,
            updated_at: now,
        };

        let event = self.store.insert_event(&event).await?;
        info!(event_id = %event.id, host_id = %event.host_id, venue_id = %event.venue_id, "Event created");
        Ok(event)
    }

    pub async fn get_event(&self, event_id: Uuid) -> Result<Event> {
        self.store
            .find_event(event_id)
            .await?
            .ok_or(GuestListError::EventNotFound { event_id })
    }

    /// Edit event details. Archived events are read-only and completed events
    /// keep their schedule.
    pub async fn update_event(&self, event_id: Uuid, request: UpdateEventRequest) -> Result<Event> {
        let mut request = request;
        if let Some(name) = &request.name {
            request.name = Some(validate_event_name(name)?);
        }
        if let Some(expected) = request.expected_guests {
            validate_expected_guests(expected)?;
        }

        match self.store.update_event_details(event_id, &request).await? {
            Some(event) => {
                debug!(event_id = %event_id, "Event details updated");
                Ok(event)
            }
            None => {
                let event = self.get_event(event_id).await?;
                let to = if request.changes_schedule() { "rescheduled" } else { "updated" };
                Err(GuestListError::InvalidStateTransition {
                    from: event.status.as_str().to_string(),
                    to: to.to_string(),
                })
            }
        }
    }

    /// Event plus its guest totals
    pub async fn event_summary(&self, event_id: Uuid) -> Result<EventSummary> {
        let event = self.get_event(event_id).await?;
        let guests = self.store.count_guests(event_id).await?;
        Ok(EventSummary { event, guests })
    }

    /// Host dashboard: every non-archived event of the host
    pub async fn list_host_events(&self, host_id: Uuid) -> Result<Vec<Event>> {
        self.store.list_host_events(host_id).await
    }

    /// Host dashboard with guest totals per event
    pub async fn host_event_summaries(&self, host_id: Uuid) -> Result<Vec<EventSummary>> {
        let events = self.store.list_host_events(host_id).await?;
        try_join_all(events.into_iter().map(|event| async move {
            let guests = self.store.count_guests(event.id).await?;
            Ok::<_, GuestListError>(EventSummary { event, guests })
        }))
        .await
    }

    /// Venue dashboard: non-archived events plus recent pre-event cancellations
    pub async fn list_venue_events(&self, venue_id: Uuid) -> Result<Vec<Event>> {
        let cancelled_since = self.clock.now() - self.config.recently_cancelled_window();
        self.store.list_venue_events(venue_id, cancelled_since).await
    }

    /// Delete an event with no guests outright; archive one that has guests.
    pub async fn smart_delete(&self, event_id: Uuid, actor: DeleteActor) -> Result<SmartDeleteOutcome> {
        let event = self.get_event(event_id).await?;
        if event.status.is_archived() {
            return Err(GuestListError::InvalidStateTransition {
                from: StatusKind::Archived.as_str().to_string(),
                to: StatusKind::Archived.as_str().to_string(),
            });
        }

        let mut counts = self.store.count_guests(event_id).await?;
        if counts.total == 0 {
            if self.store.delete_event_if_empty(event_id).await? {
                log_event_transition(event_id, event.status.as_str(), "deleted", DeletedBy::from(actor).as_str());
                return Ok(SmartDeleteOutcome {
                    action: DeleteAction::Deleted,
                    cancelled_before_event: None,
                    guest_count: 0,
                    checked_in_count: 0,
                    message: format!("Event \"{}\" had no guests and was permanently deleted", event.name),
                });
            }
            // A guest was added between the count and the delete
            counts = self.store.count_guests(event_id).await?;
        }

        let now = self.clock.now();
        let cancelled_before_event = now < event.scheduled_end(self.config.tz());
        let archived = EventStatus::Archived(ArchiveInfo {
            deleted_by: actor.into(),
            deleted_at: now,
            cancelled_before_event,
        });

        match self
            .store
            .transition_event(event_id, &[StatusKind::Created, StatusKind::Completed], &archived)
            .await?
        {
            Some(_) => {
                log_event_transition(event_id, event.status.as_str(), "archived", DeletedBy::from(actor).as_str());
                let message = if cancelled_before_event {
                    format!(
                        "Event \"{}\" was cancelled and archived with {} guests ({} checked in)",
                        event.name, counts.total, counts.checked_in
                    )
                } else {
                    format!(
                        "Event \"{}\" was archived with {} guests ({} checked in)",
                        event.name, counts.total, counts.checked_in
                    )
                };
                Ok(SmartDeleteOutcome {
                    action: DeleteAction::Archived,
                    cancelled_before_event: Some(cancelled_before_event),
                    guest_count: counts.total,
                    checked_in_count: counts.checked_in,
                    message,
                })
            }
            None => {
                let current = self.get_event(event_id).await?;
                Err(GuestListError::InvalidStateTransition {
                    from: current.status.as_str().to_string(),
                    to: StatusKind::Archived.as_str().to_string(),
                })
            }
        }
    }

    /// Bring an archived event back, recomputing its status from the clock
    pub async fn restore_event(&self, event_id: Uuid) -> Result<RestoreOutcome> {
        let event = self.get_event(event_id).await?;
        if !event.status.is_archived() {
            return Err(GuestListError::InvalidStateTransition {
                from: event.status.as_str().to_string(),
                to: "restored".to_string(),
            });
        }

        let target = event.status_at(self.clock.now(), self.config.tz());
        match self
            .store
            .transition_event(event_id, &[StatusKind::Archived], &target)
            .await?
        {
            Some(restored) => {
                log_event_transition(event_id, "archived", target.as_str(), "restore");
                Ok(RestoreOutcome {
                    restored_status: restored.status.kind(),
                    event: restored,
                })
            }
            None => {
                let current = self.get_event(event_id).await?;
                Err(GuestListError::InvalidStateTransition {
                    from: current.status.as_str().to_string(),
                    to: "restored".to_string(),
                })
            }
        }
    }

    /// Permanently remove an event in any state, detaching its guests.
    /// Returns the number of detached guests.
    pub async fn delete_event_permanently(&self, event_id: Uuid) -> Result<u64> {
        match self.store.remove_event(event_id).await? {
            Some(detached) => {
                log_event_transition(event_id, "any", "removed", "hard-delete");
                Ok(detached)
            }
            None => Err(GuestListError::EventNotFound { event_id }),
        }
    }

    /// One sweep pass at the clock's current time
    pub async fn sweep(&self) -> SweepReport {
        self.sweep_at(self.clock.now()).await
    }

    /// One sweep pass evaluated at `now`. Each write is conditional on the
    /// status it was selected by; a failure on one event is counted and the
    /// pass moves on.
    pub async fn sweep_at(&self, now: chrono::DateTime<chrono::Utc>) -> SweepReport {
        let tz = self.config.tz();
        let mut report = SweepReport::default();

        match self.store.list_events_by_status(StatusKind::Created).await {
            Ok(events) => {
                for event in events.into_iter().filter(|e| e.is_over(now, tz)) {
                    match self
                        .store
                        .transition_event(event.id, &[StatusKind::Created], &EventStatus::Completed)
                        .await
                    {
                        Ok(Some(_)) => {
                            report.completed += 1;
                            log_event_transition(event.id, "created", "completed", "system");
                        }
                        Ok(None) => debug!(event_id = %event.id, "Event changed state before completion"),
                        Err(e) => {
                            report.failed += 1;
                            log_store_error("complete_event", &e.to_string(), Some(&event.id.to_string()));
                        }
                    }
                }
            }
            Err(e) => {
                report.failed += 1;
                log_store_error("list_created_events", &e.to_string(), None);
            }
        }

        match self.store.list_events_by_status(StatusKind::Completed).await {
            Ok(events) => {
                for event in events
                    .into_iter()
                    .filter(|e| e.retention_expired(now, tz, self.config.retention()))
                {
                    let archived = EventStatus::Archived(ArchiveInfo {
                        deleted_by: DeletedBy::System,
                        deleted_at: now,
                        cancelled_before_event: false,
                    });
                    match self
                        .store
                        .transition_event(event.id, &[StatusKind::Completed], &archived)
                        .await
                    {
                        Ok(Some(_)) => {
                            report.archived += 1;
                            log_event_transition(event.id, "completed", "archived", "system");
                        }
                        Ok(None) => debug!(event_id = %event.id, "Event changed state before archival"),
                        Err(e) => {
                            report.failed += 1;
                            log_store_error("archive_event", &e.to_string(), Some(&event.id.to_string()));
                        }
                    }
                }
            }
            Err(e) => {
                report.failed += 1;
                log_store_error("list_completed_events", &e.to_string(), None);
            }
        }

        let archived_before = now - self.config.purge_after();
        match self.store.list_events_by_status(StatusKind::Archived).await {
            Ok(events) => {
                for event in events
                    .into_iter()
                    .filter(|e| e.purge_due(now, self.config.purge_after()))
                {
                    match self.store.purge_event(event.id, archived_before).await {
                        Ok(Some(detached)) => {
                            report.purged += 1;
                            log_event_transition(event.id, "archived", "purged", "system");
                            debug!(event_id = %event.id, detached = detached, "Guests detached from purged event");
                        }
                        Ok(None) => debug!(event_id = %event.id, "Event changed state before purge"),
                        Err(e) => {
                            report.failed += 1;
                            log_store_error("purge_event", &e.to_string(), Some(&event.id.to_string()));
                        }
                    }
                }
            }
            Err(e) => {
                report.failed += 1;
                log_store_error("list_archived_events", &e.to_string(), None);
            }
        }

        log_sweep_report(report.completed, report.archived, report.purged, report.failed);
        report
    }
}
