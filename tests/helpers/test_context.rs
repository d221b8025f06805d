//! Test context for unified test setup
//!
//! Wires every service over an in-process store, a manually driven clock and
//! recording providers.

use std::sync::Arc;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use uuid::Uuid;
use guestlist::config::Settings;
use guestlist::database::{MemoryStore, Store};
use guestlist::models::{CreateEventRequest, CreateGuestRequest, Event, Guest};
use guestlist::services::{EmailSender, ServiceFactory, SmsSender};
use guestlist::utils::FixedClock;

use super::mock_senders::{MockEmailSender, MockSmsSender};

pub struct TestContext {
    pub memory: Arc<MemoryStore>,
    pub clock: FixedClock,
    pub email: Arc<MockEmailSender>,
    pub sms: Arc<MockSmsSender>,
    pub services: ServiceFactory,
    pub settings: Settings,
}

/// Settings tuned for fast tests: no pacing and generous provider rates
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.invitations.pacing_ms = 0;
    settings.invitations.email_per_second = 1000;
    settings.invitations.sms_per_second = 1000;
    settings
}

pub fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}

impl TestContext {
    pub fn new(now: DateTime<Utc>) -> Self {
        let memory = Arc::new(MemoryStore::new());
        Self::with_store(now, memory.clone(), memory)
    }

    /// Build services over `store`, keeping `memory` for direct inspection
    pub fn with_store(now: DateTime<Utc>, memory: Arc<MemoryStore>, store: Arc<dyn Store>) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let settings = test_settings();
        let clock = FixedClock::new(now);
        let email = Arc::new(MockEmailSender::new());
        let sms = Arc::new(MockSmsSender::new());

        let services = ServiceFactory::with_senders(
            &settings,
            store,
            Arc::new(clock.clone()),
            Some(email.clone() as Arc<dyn EmailSender>),
            Some(sms.clone() as Arc<dyn SmsSender>),
        )
        .expect("Failed to build services");

        Self {
            memory,
            clock,
            email,
            sms,
            services,
            settings,
        }
    }

    pub async fn create_event(&self, date: &str, time_start: Option<&str>, time_end: Option<&str>) -> Event {
        self.services
            .lifecycle
            .create_event(CreateEventRequest {
                name: "Spring Showcase".to_string(),
                date: date.parse::<NaiveDate>().unwrap(),
                time_start: time_start.map(|t| t.parse::<NaiveTime>().unwrap()),
                time_end: time_end.map(|t| t.parse::<NaiveTime>().unwrap()),
                venue_id: Some(Uuid::new_v4()),
                host_id: Uuid::new_v4(),
                expected_guests: Some(120),
                color: Some("#7b2ff7".to_string()),
                wristband_color: Some("orange".to_string()),
            })
            .await
            .expect("Failed to create event")
    }

    pub async fn create_event_at_venue(&self, venue_id: Uuid, date: &str) -> Event {
        self.services
            .lifecycle
            .create_event(CreateEventRequest {
                name: "Venue Night".to_string(),
                date: date.parse::<NaiveDate>().unwrap(),
                time_start: None,
                time_end: None,
                venue_id: Some(venue_id),
                host_id: Uuid::new_v4(),
                expected_guests: None,
                color: None,
                wristband_color: None,
            })
            .await
            .expect("Failed to create event")
    }

    pub async fn add_guest(&self, event_id: Uuid) -> Guest {
        self.services
            .guests
            .create_guest(super::test_data::fake_guest_request(event_id))
            .await
            .expect("Failed to create guest")
    }

    pub async fn add_guest_with(&self, request: CreateGuestRequest) -> Guest {
        self.services
            .guests
            .create_guest(request)
            .await
            .expect("Failed to create guest")
    }
}
