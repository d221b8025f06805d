//! Guest repository implementation

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::models::guest::{Guest, GuestRow, GuestCounts, InvitationChannel, UpdateGuestRequest};
use crate::utils::errors::{GuestListError, Result};

const GUEST_COLUMNS: &str = "id, event_id, name, email, phone, category, plus_ones, is_walkin, check_in_token, invite_token, checked_in, checked_in_time, checked_in_by, invitation_sent, invitation_sent_at, invitation_sent_via, invitation_opened, invitation_opened_at, invitation_open_count, created_at, updated_at";

#[derive(Clone)]
pub struct GuestRepository {
    pool: PgPool,
}

/// Map unique-constraint violations onto `DuplicateToken`
fn map_unique_violation(err: sqlx::Error) -> GuestListError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return GuestListError::DuplicateToken {
                constraint: db_err.constraint().unwrap_or("unknown").to_string(),
            };
        }
    }
    GuestListError::Database(err)
}

/// Map insert failures: a dangling `event_id` becomes `EventNotFound`
fn map_insert_error(err: sqlx::Error, event_id: Option<Uuid>) -> GuestListError {
    if let (sqlx::Error::Database(db_err), Some(event_id)) = (&err, event_id) {
        if db_err.is_foreign_key_violation() {
            return GuestListError::EventNotFound { event_id };
        }
    }
    map_unique_violation(err)
}

fn into_guest(row: Option<GuestRow>) -> Result<Option<Guest>> {
    row.map(Guest::try_from).transpose()
}

impl GuestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new guest
    pub async fn create(&self, guest: &Guest) -> Result<Guest> {
        let row = sqlx::query_as::<_, GuestRow>(&format!(
            r#"
            INSERT INTO guests (id, event_id, name, email, phone, category, plus_ones, is_walkin, check_in_token, invite_token, checked_in, checked_in_time, checked_in_by, invitation_sent, invitation_sent_at, invitation_sent_via, invitation_opened, invitation_opened_at, invitation_open_count, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)
            RETURNING {GUEST_COLUMNS}
            "#
        ))
        .bind(guest.id)
        .bind(guest.event_id)
        .bind(&guest.name)
        .bind(&guest.email)
        .bind(&guest.phone)
        .bind(&guest.category)
        .bind(guest.plus_ones)
        .bind(guest.is_walkin)
        .bind(&guest.check_in_token)
        .bind(&guest.invite_token)
        .bind(guest.checked_in)
        .bind(&guest.checked_in_time)
        .bind(&guest.checked_in_by)
        .bind(guest.invitation_sent)
        .bind(guest.invitation_sent_at)
        .bind(guest.invitation_sent_via.map(|v| v.as_str()))
        .bind(guest.invitation_opened)
        .bind(guest.invitation_opened_at)
        .bind(guest.invitation_open_count)
        .bind(guest.created_at)
        .bind(guest.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, guest.event_id))?;

        Guest::try_from(row)
    }

    /// Find guest by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Guest>> {
        let row = sqlx::query_as::<_, GuestRow>(&format!("SELECT {GUEST_COLUMNS} FROM guests WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        into_guest(row)
    }

    /// Find guest by normalized check-in token
    pub async fn find_by_check_in_token(&self, token: &str) -> Result<Option<Guest>> {
        let row = sqlx::query_as::<_, GuestRow>(&format!("SELECT {GUEST_COLUMNS} FROM guests WHERE check_in_token = $1"))
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        into_guest(row)
    }

    /// Find guest by invite token
    pub async fn find_by_invite_token(&self, token: &str) -> Result<Option<Guest>> {
        let row = sqlx::query_as::<_, GuestRow>(&format!("SELECT {GUEST_COLUMNS} FROM guests WHERE invite_token = $1"))
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        into_guest(row)
    }

    /// Guests of an event in creation order
    pub async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<Guest>> {
        let rows = sqlx::query_as::<_, GuestRow>(&format!(
            "SELECT {GUEST_COLUMNS} FROM guests WHERE event_id = $1 ORDER BY created_at ASC, name ASC"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Guest::try_from).collect()
    }

    /// Guest totals for an event
    pub async fn counts(&self, event_id: Uuid) -> Result<GuestCounts> {
        let (total, checked_in, headcount): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE checked_in),
                   COALESCE(SUM(1 + plus_ones), 0)::BIGINT
            FROM guests WHERE event_id = $1
            "#
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(GuestCounts { total, checked_in, headcount })
    }

    /// Update profile fields
    pub async fn update_profile(&self, id: Uuid, request: &UpdateGuestRequest) -> Result<Option<Guest>> {
        let row = sqlx::query_as::<_, GuestRow>(&format!(
            r#"
            UPDATE guests
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                category = COALESCE($5, category),
                plus_ones = COALESCE($6, plus_ones),
                updated_at = $7
            WHERE id = $1
            RETURNING {GUEST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(&request.category)
        .bind(request.plus_ones)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        into_guest(row)
    }

    /// Swap in a new check-in token
    pub async fn replace_check_in_token(&self, id: Uuid, token: &str) -> Result<Option<Guest>> {
        let row = sqlx::query_as::<_, GuestRow>(&format!(
            "UPDATE guests SET check_in_token = $2, updated_at = $3 WHERE id = $1 RETURNING {GUEST_COLUMNS}"
        ))
        .bind(id)
        .bind(token)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        into_guest(row)
    }

    /// Delete guest
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM guests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Compare-and-set check-in; only the first caller gets a row back
    pub async fn mark_checked_in(&self, id: Uuid, checked_in_time: &str, checked_in_by: &str) -> Result<Option<Guest>> {
        let row = sqlx::query_as::<_, GuestRow>(&format!(
            r#"
            UPDATE guests
            SET checked_in = TRUE, checked_in_time = $2, checked_in_by = $3, updated_at = $4
            WHERE id = $1 AND checked_in = FALSE
            RETURNING {GUEST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(checked_in_time)
        .bind(checked_in_by)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        into_guest(row)
    }

    /// Count an invitation-link open
    pub async fn record_open(&self, id: Uuid, at: DateTime<Utc>) -> Result<Option<Guest>> {
        let row = sqlx::query_as::<_, GuestRow>(&format!(
            r#"
            UPDATE guests
            SET invitation_opened = TRUE,
                invitation_opened_at = $2,
                invitation_open_count = invitation_open_count + 1,
                updated_at = $3
            WHERE id = $1
            RETURNING {GUEST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(at)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        into_guest(row)
    }

    /// Set the invite token unless one is already present
    pub async fn set_invite_token_if_absent(&self, id: Uuid, token: &str) -> Result<Option<String>> {
        let effective: Option<(Option<String>,)> = sqlx::query_as(
            r#"
            UPDATE guests
            SET invite_token = COALESCE(invite_token, $2), updated_at = $3
            WHERE id = $1
            RETURNING invite_token
            "#
        )
        .bind(id)
        .bind(token)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(effective.and_then(|(token,)| token))
    }

    /// Record a successful invitation send
    pub async fn mark_invitation_sent(&self, id: Uuid, via: InvitationChannel, at: DateTime<Utc>) -> Result<Option<Guest>> {
        let row = sqlx::query_as::<_, GuestRow>(&format!(
            r#"
            UPDATE guests
            SET invitation_sent = TRUE, invitation_sent_at = $2, invitation_sent_via = $3, updated_at = $4
            WHERE id = $1
            RETURNING {GUEST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(at)
        .bind(via.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        into_guest(row)
    }
}
