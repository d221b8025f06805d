//! Event model
//!
//! An event's lifecycle state is a closed enum; the deletion metadata exists only
//! on the archived variant.

use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use crate::utils::errors::{GuestListError, Result};

/// Who archived an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletedBy {
    Host,
    Venue,
    System,
}

impl DeletedBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeletedBy::Host => "host",
            DeletedBy::Venue => "venue",
            DeletedBy::System => "system",
        }
    }
}

impl FromStr for DeletedBy {
    type Err = GuestListError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "host" => Ok(DeletedBy::Host),
            "venue" => Ok(DeletedBy::Venue),
            "system" => Ok(DeletedBy::System),
            other => Err(GuestListError::InvalidInput(format!("Unknown deleted_by: {}", other))),
        }
    }
}

/// The parties allowed to request a smart-delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteActor {
    Host,
    Venue,
}

impl FromStr for DeleteActor {
    type Err = GuestListError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "host" => Ok(DeleteActor::Host),
            "venue" => Ok(DeleteActor::Venue),
            other => Err(GuestListError::InvalidInput(format!(
                "deleted_by must be 'host' or 'venue', got '{}'",
                other
            ))),
        }
    }
}

impl From<DeleteActor> for DeletedBy {
    fn from(actor: DeleteActor) -> Self {
        match actor {
            DeleteActor::Host => DeletedBy::Host,
            DeleteActor::Venue => DeletedBy::Venue,
        }
    }
}

/// Deletion metadata carried by an archived event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveInfo {
    pub deleted_by: DeletedBy,
    pub deleted_at: DateTime<Utc>,
    pub cancelled_before_event: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EventStatus {
    Created,
    Completed,
    Archived(ArchiveInfo),
}

/// Status tag without payload, used as a precondition for conditional writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Created,
    Completed,
    Archived,
}

impl StatusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Created => "created",
            StatusKind::Completed => "completed",
            StatusKind::Archived => "archived",
        }
    }
}

impl EventStatus {
    pub fn kind(&self) -> StatusKind {
        match self {
            EventStatus::Created => StatusKind::Created,
            EventStatus::Completed => StatusKind::Completed,
            EventStatus::Archived(_) => StatusKind::Archived,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.kind().as_str()
    }

    pub fn is_archived(&self) -> bool {
        matches!(self, EventStatus::Archived(_))
    }

    pub fn archive_info(&self) -> Option<&ArchiveInfo> {
        match self {
            EventStatus::Archived(info) => Some(info),
            _ => None,
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    pub time_start: Option<NaiveTime>,
    pub time_end: Option<NaiveTime>,
    pub venue_id: Uuid,
    pub host_id: Uuid,
    pub expected_guests: i32,
    pub color: Option<String>,
    pub wristband_color: Option<String>,
    #[serde(flatten)]
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

/// Resolve a venue-local wall time to UTC, skipping forward over DST gaps
fn localize(tz: Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

impl Event {
    /// Scheduled end: date + time_end, or end of day when no end time is set.
    /// An end time at or before the start time belongs to the following day.
    pub fn scheduled_end(&self, tz: Tz) -> DateTime<Utc> {
        let end_date = match (self.time_start, self.time_end) {
            (Some(start), Some(end)) if end <= start => self.date.succ_opt().unwrap_or(self.date),
            _ => self.date,
        };
        let end_time = self.time_end.unwrap_or_else(end_of_day);
        localize(tz, end_date.and_time(end_time))
    }

    pub fn is_over(&self, now: DateTime<Utc>, tz: Tz) -> bool {
        now > self.scheduled_end(tz)
    }

    /// Status an event takes when it leaves the archive at `now`
    pub fn status_at(&self, now: DateTime<Utc>, tz: Tz) -> EventStatus {
        if self.is_over(now, tz) {
            EventStatus::Completed
        } else {
            EventStatus::Created
        }
    }

    /// A completed event whose date is further back than the retention window
    pub fn retention_expired(&self, now: DateTime<Utc>, tz: Tz, retention: Duration) -> bool {
        matches!(self.status, EventStatus::Completed)
            && now > localize(tz, self.date.and_time(NaiveTime::MIN)) + retention
    }

    /// An archived event whose archival is older than the purge window
    pub fn purge_due(&self, now: DateTime<Utc>, purge_after: Duration) -> bool {
        match &self.status {
            EventStatus::Archived(info) => now > info.deleted_at + purge_after,
            _ => false,
        }
    }

    /// Cancelled before it took place, within the venue visibility window
    pub fn is_recently_cancelled(&self, now: DateTime<Utc>, window: Duration) -> bool {
        match &self.status {
            EventStatus::Archived(info) => info.cancelled_before_event && info.deleted_at >= now - window,
            _ => false,
        }
    }

    pub fn accepts_check_ins(&self) -> bool {
        !self.status.is_archived()
    }
}

/// Flat database row for an event
#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: Uuid,
    pub name: String,
    pub event_date: NaiveDate,
    pub time_start: Option<NaiveTime>,
    pub time_end: Option<NaiveTime>,
    pub venue_id: Uuid,
    pub host_id: Uuid,
    pub expected_guests: i32,
    pub status: String,
    pub color: Option<String>,
    pub wristband_color: Option<String>,
    pub deleted_by: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub cancelled_before_event: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = GuestListError;

    fn try_from(row: EventRow) -> Result<Self> {
        let status = match row.status.as_str() {
            "created" => EventStatus::Created,
            "completed" => EventStatus::Completed,
            "archived" => {
                let (deleted_by, deleted_at) = match (row.deleted_by.as_deref(), row.deleted_at) {
                    (Some(by), Some(at)) => (by.parse()?, at),
                    _ => {
                        return Err(GuestListError::InvalidInput(format!(
                            "Archived event {} is missing deletion metadata",
                            row.id
                        )))
                    }
                };
                EventStatus::Archived(ArchiveInfo {
                    deleted_by,
                    deleted_at,
                    cancelled_before_event: row.cancelled_before_event.unwrap_or(false),
                })
            }
            other => {
                return Err(GuestListError::InvalidInput(format!("Unknown event status: {}", other)))
            }
        };

        Ok(Event {
            id: row.id,
            name: row.name,
            date: row.event_date,
            time_start: row.time_start,
            time_end: row.time_end,
            venue_id: row.venue_id,
            host_id: row.host_id,
            expected_guests: row.expected_guests,
            color: row.color,
            wristband_color: row.wristband_color,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    pub date: NaiveDate,
    pub time_start: Option<NaiveTime>,
    pub time_end: Option<NaiveTime>,
    pub venue_id: Option<Uuid>,
    pub host_id: Uuid,
    pub expected_guests: Option<i32>,
    pub color: Option<String>,
    pub wristband_color: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub time_start: Option<NaiveTime>,
    pub time_end: Option<NaiveTime>,
    pub expected_guests: Option<i32>,
    pub color: Option<String>,
    pub wristband_color: Option<String>,
}

impl UpdateEventRequest {
    /// Whether the edit moves the event in time
    pub fn changes_schedule(&self) -> bool {
        self.date.is_some() || self.time_start.is_some() || self.time_end.is_some()
    }
}
