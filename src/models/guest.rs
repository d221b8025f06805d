//! Guest model and guest selection filters

use std::collections::HashSet;
use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use crate::utils::errors::{GuestListError, Result};

/// Channels an invitation went out on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationChannel {
    Email,
    Sms,
    Both,
}

impl InvitationChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationChannel::Email => "email",
            InvitationChannel::Sms => "sms",
            InvitationChannel::Both => "both",
        }
    }

    /// Channel label for a guest given which sends succeeded
    pub fn from_outcomes(email_sent: bool, sms_sent: bool) -> Option<Self> {
        match (email_sent, sms_sent) {
            (true, true) => Some(InvitationChannel::Both),
            (true, false) => Some(InvitationChannel::Email),
            (false, true) => Some(InvitationChannel::Sms),
            (false, false) => None,
        }
    }
}

impl FromStr for InvitationChannel {
    type Err = GuestListError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "email" => Ok(InvitationChannel::Email),
            "sms" => Ok(InvitationChannel::Sms),
            "both" => Ok(InvitationChannel::Both),
            other => Err(GuestListError::InvalidInput(format!("Unknown invitation channel: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guest {
    pub id: Uuid,
    /// Cleared when the parent event is purged or hard-deleted
    pub event_id: Option<Uuid>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub category: String,
    pub plus_ones: i32,
    pub is_walkin: bool,
    pub check_in_token: String,
    pub invite_token: Option<String>,
    pub checked_in: bool,
    pub checked_in_time: Option<String>,
    pub checked_in_by: Option<String>,
    pub invitation_sent: bool,
    pub invitation_sent_at: Option<DateTime<Utc>>,
    pub invitation_sent_via: Option<InvitationChannel>,
    pub invitation_opened: bool,
    pub invitation_opened_at: Option<DateTime<Utc>>,
    pub invitation_open_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Guest {
    /// Headcount this guest admits, including plus-ones
    pub fn party_size(&self) -> i64 {
        1 + i64::from(self.plus_ones.max(0))
    }
}

/// Flat database row for a guest
#[derive(Debug, Clone, FromRow)]
pub struct GuestRow {
    pub id: Uuid,
    pub event_id: Option<Uuid>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub category: String,
    pub plus_ones: i32,
    pub is_walkin: bool,
    pub check_in_token: String,
    pub invite_token: Option<String>,
    pub checked_in: bool,
    pub checked_in_time: Option<String>,
    pub checked_in_by: Option<String>,
    pub invitation_sent: bool,
    pub invitation_sent_at: Option<DateTime<Utc>>,
    pub invitation_sent_via: Option<String>,
    pub invitation_opened: bool,
    pub invitation_opened_at: Option<DateTime<Utc>>,
    pub invitation_open_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<GuestRow> for Guest {
    type Error = GuestListError;

    fn try_from(row: GuestRow) -> Result<Self> {
        let invitation_sent_via = row
            .invitation_sent_via
            .as_deref()
            .map(InvitationChannel::from_str)
            .transpose()?;

        Ok(Guest {
            id: row.id,
            event_id: row.event_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            category: row.category,
            plus_ones: row.plus_ones,
            is_walkin: row.is_walkin,
            check_in_token: row.check_in_token,
            invite_token: row.invite_token,
            checked_in: row.checked_in,
            checked_in_time: row.checked_in_time,
            checked_in_by: row.checked_in_by,
            invitation_sent: row.invitation_sent,
            invitation_sent_at: row.invitation_sent_at,
            invitation_sent_via,
            invitation_opened: row.invitation_opened,
            invitation_opened_at: row.invitation_opened_at,
            invitation_open_count: row.invitation_open_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateGuestRequest {
    pub event_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub category: Option<String>,
    pub plus_ones: Option<i32>,
    #[serde(default)]
    pub is_walkin: bool,
}

/// Profile edits; credentials and check-in state are not editable here
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateGuestRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub category: Option<String>,
    pub plus_ones: Option<i32>,
}

/// Guest totals for one event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestCounts {
    pub total: i64,
    pub checked_in: i64,
    /// Guests plus their plus-ones
    pub headcount: i64,
}

/// Which guests of an event a bulk operation targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuestFilter {
    All,
    NotInvited,
    NotCheckedIn,
    Category(String),
    ExplicitIds(HashSet<Uuid>),
}

impl GuestFilter {
    /// Build a filter from its wire form
    pub fn parse(kind: &str, category: Option<&str>, guest_ids: Option<&[Uuid]>) -> Result<Self> {
        match kind.trim().to_lowercase().as_str() {
            "" | "all" => Ok(GuestFilter::All),
            "not_invited" | "uninvited" => Ok(GuestFilter::NotInvited),
            "not_checked_in" => Ok(GuestFilter::NotCheckedIn),
            "category" => match category.map(str::trim) {
                Some(c) if !c.is_empty() => Ok(GuestFilter::Category(c.to_string())),
                _ => Err(GuestListError::InvalidInput("Category filter requires a category".to_string())),
            },
            "selected" | "ids" => match guest_ids {
                Some(ids) if !ids.is_empty() => Ok(GuestFilter::ExplicitIds(ids.iter().copied().collect())),
                _ => Err(GuestListError::InvalidInput("Selected filter requires guest ids".to_string())),
            },
            other => Err(GuestListError::InvalidInput(format!("Unknown guest filter: {}", other))),
        }
    }

    pub fn matches(&self, guest: &Guest) -> bool {
        match self {
            GuestFilter::All => true,
            GuestFilter::NotInvited => !guest.invitation_sent,
            GuestFilter::NotCheckedIn => !guest.checked_in,
            GuestFilter::Category(category) => guest.category.trim().eq_ignore_ascii_case(category),
            GuestFilter::ExplicitIds(ids) => ids.contains(&guest.id),
        }
    }

    pub fn select(&self, guests: Vec<Guest>) -> Vec<Guest> {
        guests.into_iter().filter(|g| self.matches(g)).collect()
    }
}
