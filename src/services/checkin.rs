//! Check-in redemption and invitation-link retrieval

use std::sync::Arc;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::database::Store;
use crate::models::{Event, Guest};
use crate::utils::clock::Clock;
use crate::utils::errors::{GuestListError, Result};
use crate::utils::helpers::{format_check_in_time, normalize_token};
use crate::utils::logging::log_check_in;

/// Station label recorded when the scanner does not identify itself
pub const DEFAULT_STATION: &str = "Scanner";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInOutcome {
    pub success: bool,
    pub guest: Guest,
    pub already_checked_in: bool,
    pub message: String,
}

impl CheckInOutcome {
    fn admitted(guest: Guest) -> Self {
        let message = format!("{} checked in", guest.name);
        Self {
            success: true,
            guest,
            already_checked_in: false,
            message,
        }
    }

    fn repeat(guest: Guest) -> Self {
        let message = match &guest.checked_in_time {
            Some(time) => format!("{} already checked in at {}", guest.name, time),
            None => format!("{} already checked in", guest.name),
        };
        Self {
            success: true,
            guest,
            already_checked_in: true,
            message,
        }
    }
}

/// What an invitation link resolves to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvitationView {
    pub guest: Guest,
    pub event: Event,
}

#[derive(Clone)]
pub struct CheckInService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    timezone: Tz,
}

impl CheckInService {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>, timezone: Tz) -> Self {
        Self { store, clock, timezone }
    }

    /// Redeem a scanned or typed check-in code.
    ///
    /// A repeat scan of an admitted guest succeeds with `already_checked_in`
    /// set and the original time and station. Concurrent scans of the same code
    /// produce exactly one first admission.
    pub async fn redeem(&self, raw_token: &str, station: Option<&str>) -> Result<CheckInOutcome> {
        let token = normalize_token(raw_token);
        if token.is_empty() {
            return Err(GuestListError::InvalidInput("Check-in token is required".to_string()));
        }

        let guest = self
            .store
            .find_guest_by_check_in_token(&token)
            .await?
            .ok_or(GuestListError::TokenNotFound)?;

        let station = station
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_STATION);

        if guest.checked_in {
            log_check_in(guest.id, station, true);
            return Ok(CheckInOutcome::repeat(guest));
        }

        self.ensure_admission_open(&guest).await?;

        let time = format_check_in_time(self.clock.now(), self.timezone);
        match self.store.mark_checked_in(guest.id, &time, station).await? {
            Some(updated) => {
                log_check_in(updated.id, station, false);
                Ok(CheckInOutcome::admitted(updated))
            }
            None => {
                // Another scan won the compare-and-set; report its result
                let current = self
                    .store
                    .find_guest(guest.id)
                    .await?
                    .ok_or(GuestListError::TokenNotFound)?;
                log_check_in(current.id, station, true);
                Ok(CheckInOutcome::repeat(current))
            }
        }
    }

    async fn ensure_admission_open(&self, guest: &Guest) -> Result<()> {
        let event_id = guest.event_id.ok_or_else(|| GuestListError::CheckInClosed {
            reason: "guest is no longer attached to an event".to_string(),
        })?;

        match self.store.find_event(event_id).await? {
            Some(event) if event.accepts_check_ins() => Ok(()),
            Some(_) => Err(GuestListError::CheckInClosed {
                reason: "event is archived".to_string(),
            }),
            None => Err(GuestListError::CheckInClosed {
                reason: "event no longer exists".to_string(),
            }),
        }
    }

    /// Resolve an invitation link and count the open. Repeat opens are
    /// always accepted.
    pub async fn open_invitation(&self, invite_token: &str) -> Result<InvitationView> {
        let token = invite_token.trim();
        if token.is_empty() {
            return Err(GuestListError::InvalidInput("Invite token is required".to_string()));
        }

        let guest = self
            .store
            .find_guest_by_invite_token(token)
            .await?
            .ok_or(GuestListError::TokenNotFound)?;

        let event_id = guest.event_id.ok_or(GuestListError::TokenNotFound)?;
        let event = self
            .store
            .find_event(event_id)
            .await?
            .ok_or(GuestListError::EventNotFound { event_id })?;

        let guest = self
            .store
            .record_invitation_open(guest.id, self.clock.now())
            .await?
            .ok_or(GuestListError::GuestNotFound { guest_id: guest.id })?;

        debug!(guest_id = %guest.id, opens = guest.invitation_open_count, "Invitation opened");
        Ok(InvitationView { guest, event })
    }
}
