//! Test data helpers for creating guest requests

use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use uuid::Uuid;
use guestlist::models::CreateGuestRequest;

/// A guest with a generated name and email and no phone
pub fn fake_guest_request(event_id: Uuid) -> CreateGuestRequest {
    CreateGuestRequest {
        event_id,
        name: Name().fake(),
        email: Some(SafeEmail().fake()),
        phone: None,
        category: None,
        plus_ones: Some((0..3).fake()),
        is_walkin: false,
    }
}

pub fn guest_request(event_id: Uuid, name: &str, email: Option<&str>, phone: Option<&str>) -> CreateGuestRequest {
    CreateGuestRequest {
        event_id,
        name: name.to_string(),
        email: email.map(str::to_string),
        phone: phone.map(str::to_string),
        category: None,
        plus_ones: None,
        is_walkin: false,
    }
}
