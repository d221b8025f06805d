//! Event repository implementation

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::models::event::{Event, EventRow, EventStatus, StatusKind, UpdateEventRequest};
use crate::utils::errors::Result;

const EVENT_COLUMNS: &str = "id, name, event_date, time_start, time_end, venue_id, host_id, expected_guests, status, color, wristband_color, deleted_by, deleted_at, cancelled_before_event, created_at, updated_at";

#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

fn into_events(rows: Vec<EventRow>) -> Result<Vec<Event>> {
    rows.into_iter().map(Event::try_from).collect()
}

fn status_names(from: &[StatusKind]) -> Vec<String> {
    from.iter().map(|s| s.as_str().to_string()).collect()
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new event
    pub async fn create(&self, event: &Event) -> Result<Event> {
        let archive = event.status.archive_info();
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            INSERT INTO events (id, name, event_date, time_start, time_end, venue_id, host_id, expected_guests, status, color, wristband_color, deleted_by, deleted_at, cancelled_before_event, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(event.id)
        .bind(&event.name)
        .bind(event.date)
        .bind(event.time_start)
        .bind(event.time_end)
        .bind(event.venue_id)
        .bind(event.host_id)
        .bind(event.expected_guests)
        .bind(event.status.as_str())
        .bind(&event.color)
        .bind(&event.wristband_color)
        .bind(archive.map(|a| a.deleted_by.as_str()))
        .bind(archive.map(|a| a.deleted_at))
        .bind(archive.map(|a| a.cancelled_before_event))
        .bind(event.created_at)
        .bind(event.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Event::try_from(row)
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Event::try_from).transpose()
    }

    /// Update event details unless the event is archived
    pub async fn update_details(&self, id: Uuid, request: &UpdateEventRequest) -> Result<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            UPDATE events
            SET name = COALESCE($2, name),
                event_date = COALESCE($3, event_date),
                time_start = COALESCE($4, time_start),
                time_end = COALESCE($5, time_end),
                expected_guests = COALESCE($6, expected_guests),
                color = COALESCE($7, color),
                wristband_color = COALESCE($8, wristband_color),
                updated_at = $9
            WHERE id = $1 AND status <> 'archived' AND (NOT $10 OR status = 'created')
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&request.name)
        .bind(request.date)
        .bind(request.time_start)
        .bind(request.time_end)
        .bind(request.expected_guests)
        .bind(&request.color)
        .bind(&request.wristband_color)
        .bind(Utc::now())
        .bind(request.changes_schedule())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Event::try_from).transpose()
    }

    /// List events in a given status
    pub async fn list_by_status(&self, status: StatusKind) -> Result<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE status = $1 ORDER BY event_date ASC, time_start ASC NULLS FIRST"
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        into_events(rows)
    }

    /// Non-archived events created by a host
    pub async fn list_for_host(&self, host_id: Uuid) -> Result<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE host_id = $1 AND status <> 'archived' ORDER BY event_date ASC, time_start ASC NULLS FIRST"
        ))
        .bind(host_id)
        .fetch_all(&self.pool)
        .await?;

        into_events(rows)
    }

    /// Venue dashboard listing, including recent pre-event cancellations
    pub async fn list_for_venue(&self, venue_id: Uuid, cancelled_since: DateTime<Utc>) -> Result<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM events
            WHERE venue_id = $1
              AND (status <> 'archived' OR (cancelled_before_event = TRUE AND deleted_at >= $2))
            ORDER BY event_date ASC, time_start ASC NULLS FIRST
            "#
        ))
        .bind(venue_id)
        .bind(cancelled_since)
        .fetch_all(&self.pool)
        .await?;

        into_events(rows)
    }

    /// Conditional status change in a single statement
    pub async fn transition(&self, id: Uuid, from: &[StatusKind], to: &EventStatus) -> Result<Option<Event>> {
        let archive = to.archive_info();
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            UPDATE events
            SET status = $3,
                deleted_by = $4,
                deleted_at = $5,
                cancelled_before_event = $6,
                updated_at = $7
            WHERE id = $1 AND status = ANY($2)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status_names(from))
        .bind(to.as_str())
        .bind(archive.map(|a| a.deleted_by.as_str()))
        .bind(archive.map(|a| a.deleted_at))
        .bind(archive.map(|a| a.cancelled_before_event))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Event::try_from).transpose()
    }

    /// Detach guests and delete an archived event older than `archived_before`
    pub async fn purge(&self, id: Uuid, archived_before: DateTime<Utc>) -> Result<Option<u64>> {
        let mut tx = self.pool.begin().await?;

        // Lock the row so a concurrent restore cannot slip between check and delete
        let due: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM events WHERE id = $1 AND status = 'archived' AND deleted_at < $2 FOR UPDATE"
        )
        .bind(id)
        .bind(archived_before)
        .fetch_optional(&mut *tx)
        .await?;

        if due.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let detached = detach_guests(&mut tx, id).await?;
        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Some(detached))
    }

    /// Detach guests and delete an event regardless of status
    pub async fn remove(&self, id: Uuid) -> Result<Option<u64>> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM events WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        if exists.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let detached = detach_guests(&mut tx, id).await?;
        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Some(detached))
    }

    /// Delete an event only when no guest references it
    pub async fn delete_if_empty(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM events WHERE id = $1 AND NOT EXISTS (SELECT 1 FROM guests WHERE event_id = $1)"
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

async fn detach_guests(tx: &mut sqlx::Transaction<'_, sqlx::Postgres>, event_id: Uuid) -> Result<u64> {
    let result = sqlx::query("UPDATE guests SET event_id = NULL, updated_at = $2 WHERE event_id = $1")
        .bind(event_id)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await?;

    Ok(result.rows_affected())
}
