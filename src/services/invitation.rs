//! Bulk invitation dispatch
//!
//! Sends invitations for a selection of an event's guests over email and/or
//! SMS. Provider failures are tallied per guest and channel and never abort the
//! run; a caller may stop the run between guests through `DispatchControl`.

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use crate::config::InvitationConfig;
use crate::database::Store;
use crate::models::{Event, Guest, GuestFilter, InvitationChannel};
use crate::services::email::EmailSender;
use crate::services::notification::InvitationComposer;
use crate::services::sms::SmsSender;
use crate::services::tokens::TokenIssuer;
use crate::utils::clock::Clock;
use crate::utils::errors::{GuestListError, Result};
use crate::utils::logging::log_provider_send;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSelection {
    pub email: bool,
    pub sms: bool,
}

#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub event_id: Uuid,
    pub channels: ChannelSelection,
    pub filter: GuestFilter,
    /// Display name of the venue, resolved by the caller
    pub venue_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelTally {
    pub sent: u32,
    pub failed: u32,
    /// Guests without a contact for this channel
    pub skipped: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResults {
    pub email: ChannelTally,
    pub sms: ChannelTally,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSummary {
    pub results: DispatchResults,
    /// Guests selected by the filter
    pub matched: u32,
    /// Guests fully processed before the run ended
    pub processed: u32,
    pub aborted: bool,
}

/// Cooperative stop flag for a running dispatch
#[derive(Debug, Clone, Default)]
pub struct DispatchControl {
    aborted: Arc<AtomicBool>,
}

impl DispatchControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop before the next guest; sends already in flight complete
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

fn limiter(per_second: u32) -> DefaultDirectRateLimiter {
    let rate = NonZeroU32::new(per_second).unwrap_or(NonZeroU32::MIN);
    RateLimiter::direct(Quota::per_second(rate))
}

pub struct InvitationService {
    store: Arc<dyn Store>,
    issuer: TokenIssuer,
    composer: InvitationComposer,
    clock: Arc<dyn Clock>,
    email: Option<Arc<dyn EmailSender>>,
    sms: Option<Arc<dyn SmsSender>>,
    email_limiter: DefaultDirectRateLimiter,
    sms_limiter: DefaultDirectRateLimiter,
    pacing: Duration,
}

impl InvitationService {
    pub fn new(
        store: Arc<dyn Store>,
        issuer: TokenIssuer,
        config: &InvitationConfig,
        clock: Arc<dyn Clock>,
        email: Option<Arc<dyn EmailSender>>,
        sms: Option<Arc<dyn SmsSender>>,
    ) -> Result<Self> {
        Ok(Self {
            store,
            issuer,
            composer: InvitationComposer::new(config)?,
            clock,
            email,
            sms,
            email_limiter: limiter(config.email_per_second),
            sms_limiter: limiter(config.sms_per_second),
            pacing: Duration::from_millis(config.pacing_ms),
        })
    }

    pub fn composer(&self) -> &InvitationComposer {
        &self.composer
    }

    fn validate(&self, channels: ChannelSelection) -> Result<()> {
        if !channels.email && !channels.sms {
            return Err(GuestListError::InvalidInput("Select at least one channel".to_string()));
        }
        if channels.email && self.email.is_none() {
            return Err(GuestListError::InvalidInput("Email delivery is not configured".to_string()));
        }
        if channels.sms && self.sms.is_none() {
            return Err(GuestListError::InvalidInput("SMS delivery is not configured".to_string()));
        }
        Ok(())
    }

    /// Send invitations to the guests of an event matching the filter.
    ///
    /// Only validation and event lookup fail the call; everything after that
    /// is reported in the summary.
    pub async fn dispatch(&self, request: DispatchRequest, control: &DispatchControl) -> Result<DispatchSummary> {
        self.validate(request.channels)?;

        let event = self
            .store
            .find_event(request.event_id)
            .await?
            .ok_or(GuestListError::EventNotFound { event_id: request.event_id })?;
        if event.status.is_archived() {
            return Err(GuestListError::InvalidStateTransition {
                from: event.status.as_str().to_string(),
                to: "invitations sent".to_string(),
            });
        }

        let guests = request.filter.select(self.store.list_guests(event.id).await?);
        let mut summary = DispatchSummary {
            matched: guests.len() as u32,
            ..Default::default()
        };

        for guest in guests {
            if control.is_aborted() {
                summary.aborted = true;
                break;
            }
            self.dispatch_guest(&guest, &event, &request, &mut summary.results).await;
            summary.processed += 1;
        }

        info!(
            event_id = %event.id,
            matched = summary.matched,
            processed = summary.processed,
            email_sent = summary.results.email.sent,
            email_failed = summary.results.email.failed,
            sms_sent = summary.results.sms.sent,
            sms_failed = summary.results.sms.failed,
            aborted = summary.aborted,
            "Invitation dispatch finished"
        );
        Ok(summary)
    }

    /// Mint the invite token if the guest does not have one yet
    async fn ensure_invite_token(&self, guest: &Guest) -> Result<String> {
        if let Some(token) = &guest.invite_token {
            return Ok(token.clone());
        }
        self.issuer
            .retry_on_collision(|| {
                let token = self.issuer.invite_token();
                let store = self.store.clone();
                let guest_id = guest.id;
                async move { store.set_invite_token_if_absent(guest_id, &token).await }
            })
            .await?
            .ok_or(GuestListError::GuestNotFound { guest_id: guest.id })
    }

    async fn dispatch_guest(&self, guest: &Guest, event: &Event, request: &DispatchRequest, results: &mut DispatchResults) {
        let invite_token = match self.ensure_invite_token(guest).await {
            Ok(token) => token,
            Err(e) => {
                warn!(guest_id = %guest.id, error = %e, "Could not prepare invite token");
                if request.channels.email {
                    results.email.failed += 1;
                }
                if request.channels.sms {
                    results.sms.failed += 1;
                }
                return;
            }
        };
        let venue_name = request.venue_name.as_deref();

        let mut email_sent = false;
        if request.channels.email {
            if let (Some(sender), Some(address)) = (&self.email, guest.email.as_deref()) {
                let message = self.composer.compose_email(guest, event, venue_name, &invite_token);
                self.email_limiter.until_ready().await;
                let outcome = sender.send(address, &message.subject, &message.html_body).await;
                log_provider_send("email", guest.id, outcome.success, outcome.error.as_deref());
                if outcome.success {
                    results.email.sent += 1;
                    email_sent = true;
                } else {
                    results.email.failed += 1;
                }
                self.pace().await;
            } else {
                results.email.skipped += 1;
            }
        }

        let mut sms_sent = false;
        if request.channels.sms {
            if let (Some(sender), Some(phone)) = (&self.sms, guest.phone.as_deref()) {
                let vars = self.composer.compose_sms_vars(guest, event, venue_name, &invite_token);
                self.sms_limiter.until_ready().await;
                let outcome = sender.send(phone, &vars).await;
                log_provider_send("sms", guest.id, outcome.success, outcome.error.as_deref());
                if outcome.success {
                    results.sms.sent += 1;
                    sms_sent = true;
                } else {
                    results.sms.failed += 1;
                }
                self.pace().await;
            } else {
                results.sms.skipped += 1;
            }
        }

        if let Some(via) = InvitationChannel::from_outcomes(email_sent, sms_sent) {
            if let Err(e) = self.store.mark_invitation_sent(guest.id, via, self.clock.now()).await {
                warn!(guest_id = %guest.id, error = %e, "Could not record invitation delivery");
            }
        }
    }

    async fn pace(&self) {
        if !self.pacing.is_zero() {
            tokio::time::sleep(self.pacing).await;
        }
    }
}
