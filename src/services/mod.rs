//! Services module
//!
//! This module contains business logic services

pub mod checkin;
pub mod email;
pub mod guests;
pub mod invitation;
pub mod lifecycle;
pub mod notification;
pub mod sms;
pub mod sweeper;
pub mod tokens;

// Re-export commonly used services
pub use checkin::{CheckInOutcome, CheckInService, InvitationView, DEFAULT_STATION};
pub use email::{EmailSender, HttpEmailSender, SendOutcome};
pub use guests::{GuestService, DEFAULT_CATEGORY};
pub use invitation::{
    ChannelSelection, ChannelTally, DispatchControl, DispatchRequest, DispatchResults, DispatchSummary,
    InvitationService,
};
pub use lifecycle::{DeleteAction, EventSummary, LifecycleController, RestoreOutcome, SmartDeleteOutcome, SweepReport};
pub use notification::{EmailMessage, InvitationComposer};
pub use sms::{HttpSmsSender, SmsSender};
pub use sweeper::run_sweeper;
pub use tokens::TokenIssuer;

use std::sync::Arc;
use crate::config::Settings;
use crate::database::Store;
use crate::utils::clock::Clock;
use crate::utils::errors::Result;

/// Service factory for creating and wiring all services over one store
#[derive(Clone)]
pub struct ServiceFactory {
    pub lifecycle: LifecycleController,
    pub check_in: CheckInService,
    pub guests: GuestService,
    pub invitations: Arc<InvitationService>,
}

impl ServiceFactory {
    /// Build services with the HTTP providers enabled in `settings`
    pub fn new(settings: &Settings, store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Result<Self> {
        let email: Option<Arc<dyn EmailSender>> = if settings.email.enabled {
            Some(Arc::new(HttpEmailSender::new(&settings.email)?))
        } else {
            None
        };
        let sms: Option<Arc<dyn SmsSender>> = if settings.sms.enabled {
            Some(Arc::new(HttpSmsSender::new(&settings.sms)?))
        } else {
            None
        };
        Self::with_senders(settings, store, clock, email, sms)
    }

    /// Build services with caller-supplied providers
    pub fn with_senders(
        settings: &Settings,
        store: Arc<dyn Store>,
        clock: Arc<dyn Clock>,
        email: Option<Arc<dyn EmailSender>>,
        sms: Option<Arc<dyn SmsSender>>,
    ) -> Result<Self> {
        let issuer = TokenIssuer::new(settings.tokens.clone());
        let lifecycle = LifecycleController::new(store.clone(), settings.lifecycle.clone(), clock.clone());
        let check_in = CheckInService::new(store.clone(), clock.clone(), settings.lifecycle.tz());
        let guests = GuestService::new(store.clone(), issuer.clone(), clock.clone(), check_in.clone());
        let invitations = InvitationService::new(store, issuer, &settings.invitations, clock, email, sms)?;

        Ok(Self {
            lifecycle,
            check_in,
            guests,
            invitations: Arc::new(invitations),
        })
    }
}
