//! Guest management
//!
//! Guest records carry the two credentials minted here: the check-in code and
//! the invite token. Both are issued at creation with bounded retry on
//! collision.

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use crate::database::Store;
use crate::models::{CreateGuestRequest, Event, Guest, GuestCounts, UpdateGuestRequest};
use crate::services::checkin::{CheckInOutcome, CheckInService};
use crate::services::tokens::TokenIssuer;
use crate::utils::clock::Clock;
use crate::utils::errors::{GuestListError, Result};
use crate::utils::helpers::{is_valid_email, normalize_whitespace};

/// Category assigned when none is given
pub const DEFAULT_CATEGORY: &str = "General";

const MAX_PLUS_ONES: i32 = 20;

#[derive(Clone)]
pub struct GuestService {
    store: Arc<dyn Store>,
    issuer: TokenIssuer,
    clock: Arc<dyn Clock>,
    check_in: CheckInService,
}

fn clean_name(name: &str) -> Result<String> {
    let name = normalize_whitespace(name);
    if name.is_empty() {
        return Err(GuestListError::InvalidInput("Guest name is required".to_string()));
    }
    Ok(name)
}

fn clean_email(email: Option<&str>) -> Result<Option<String>> {
    match email.map(str::trim).filter(|e| !e.is_empty()) {
        Some(e) if is_valid_email(e) => Ok(Some(e.to_lowercase())),
        Some(e) => Err(GuestListError::InvalidInput(format!("Invalid email address: {}", e))),
        None => Ok(None),
    }
}

fn clean_phone(phone: Option<&str>) -> Option<String> {
    phone.map(str::trim).filter(|p| !p.is_empty()).map(str::to_string)
}

fn clean_plus_ones(plus_ones: i32) -> Result<i32> {
    if !(0..=MAX_PLUS_ONES).contains(&plus_ones) {
        return Err(GuestListError::InvalidInput(format!(
            "Plus-ones must be between 0 and {}",
            MAX_PLUS_ONES
        )));
    }
    Ok(plus_ones)
}

impl GuestService {
    pub fn new(store: Arc<dyn Store>, issuer: TokenIssuer, clock: Arc<dyn Clock>, check_in: CheckInService) -> Self {
        Self { store, issuer, clock, check_in }
    }

    async fn open_event(&self, event_id: Uuid) -> Result<Event> {
        let event = self
            .store
            .find_event(event_id)
            .await?
            .ok_or(GuestListError::EventNotFound { event_id })?;
        if event.status.is_archived() {
            return Err(GuestListError::InvalidStateTransition {
                from: event.status.as_str().to_string(),
                to: "guest added".to_string(),
            });
        }
        Ok(event)
    }

    /// Add a guest to a live event, minting both credentials
    pub async fn create_guest(&self, request: CreateGuestRequest) -> Result<Guest> {
        let name = clean_name(&request.name)?;
        let email = clean_email(request.email.as_deref())?;
        let phone = clean_phone(request.phone.as_deref());
        let plus_ones = clean_plus_ones(request.plus_ones.unwrap_or(0))?;
        let category = request
            .category
            .as_deref()
            .map(normalize_whitespace)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        let event = self.open_event(request.event_id).await?;
        let now = self.clock.now();

        let guest = self
            .issuer
            .retry_on_collision(|| {
                let guest = Guest {
                    id: Uuid::new_v4(),
                    event_id: Some(event.id),
                    name: name.clone(),
                    email: email.clone(),
                    phone: phone.clone(),
                    category: category.clone(),
                    plus_ones,
                    is_walkin: request.is_walkin,
                    check_in_token: self.issuer.check_in_token(),
                    invite_token: Some(self.issuer.invite_token()),
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
                };
                let store = self.store.clone();
                async move { store.insert_guest(&guest).await }
            })
            .await?;

        info!(guest_id = %guest.id, event_id = %event.id, walkin = guest.is_walkin, "Guest created");
        Ok(guest)
    }

    /// Register a walk-in and admit them immediately through the normal
    /// redemption path
    pub async fn create_walkin(&self, request: CreateGuestRequest, station: Option<&str>) -> Result<CheckInOutcome> {
        let guest = self
            .create_guest(CreateGuestRequest {
                is_walkin: true,
                ..request
            })
            .await?;
        self.check_in.redeem(&guest.check_in_token, station).await
    }

    pub async fn get_guest(&self, guest_id: Uuid) -> Result<Guest> {
        self.store
            .find_guest(guest_id)
            .await?
            .ok_or(GuestListError::GuestNotFound { guest_id })
    }

    pub async fn list_guests(&self, event_id: Uuid) -> Result<Vec<Guest>> {
        self.store
            .find_event(event_id)
            .await?
            .ok_or(GuestListError::EventNotFound { event_id })?;
        self.store.list_guests(event_id).await
    }

    pub async fn guest_counts(&self, event_id: Uuid) -> Result<GuestCounts> {
        self.store.count_guests(event_id).await
    }

    /// Edit profile fields; credentials and check-in state are untouched
    pub async fn update_guest(&self, guest_id: Uuid, request: UpdateGuestRequest) -> Result<Guest> {
        let cleaned = UpdateGuestRequest {
            name: request.name.as_deref().map(clean_name).transpose()?,
            email: clean_email(request.email.as_deref())?,
            phone: clean_phone(request.phone.as_deref()),
            category: request
                .category
                .as_deref()
                .map(normalize_whitespace)
                .filter(|c| !c.is_empty()),
            plus_ones: request.plus_ones.map(clean_plus_ones).transpose()?,
        };

        self.store
            .update_guest_profile(guest_id, &cleaned)
            .await?
            .ok_or(GuestListError::GuestNotFound { guest_id })
    }

    pub async fn delete_guest(&self, guest_id: Uuid) -> Result<()> {
        if self.store.delete_guest(guest_id).await? {
            info!(guest_id = %guest_id, "Guest deleted");
            Ok(())
        } else {
            Err(GuestListError::GuestNotFound { guest_id })
        }
    }

    /// Replace a guest's check-in code; the previous code stops resolving
    pub async fn regenerate_check_in_token(&self, guest_id: Uuid) -> Result<Guest> {
        self.get_guest(guest_id).await?;
        let guest = self
            .issuer
            .retry_on_collision(|| {
                let token = self.issuer.check_in_token();
                let store = self.store.clone();
                async move { store.replace_check_in_token(guest_id, &token).await }
            })
            .await?
            .ok_or(GuestListError::GuestNotFound { guest_id })?;

        info!(guest_id = %guest_id, "Check-in code regenerated");
        Ok(guest)
    }
}
