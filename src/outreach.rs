//! Outbound messaging: deep links and dial intents.
//!
//! Pure string construction.  Opening the link (browser, WhatsApp, dialer,
//! share sheet) is the platform's job.

use crate::directory::Contact;
use crate::sensors::LocationFix;

/// National unified emergency number.
pub const NATIONAL_EMERGENCY: &str = "112";
/// Police control room.
pub const POLICE_CONTROL_ROOM: &str = "100";

/// Text used in place of the map link while no fix is held.
pub const LOCATION_PLACEHOLDER: &str = "Location not available";

pub const APP_TITLE: &str = "SafeGuard Cuttack";
pub const SHARE_MESSAGE: &str =
    "Check out SafeGuard Cuttack - A safety app. Stay safe and install it now!";

pub fn map_link(latitude: f64, longitude: f64) -> String {
    format!("https://www.google.com/maps?q={},{}", latitude, longitude)
}

/// Alert body: configured message followed by the live-location line.
pub fn alert_text(message: &str, location: Option<&LocationFix>) -> String {
    let link = location.map_or(LOCATION_PLACEHOLDER, |fix| fix.map_link.as_str());
    format!("{}\n\nLive Location: {}", message, link)
}

/// `https://wa.me/<digits>?text=<encoded alert>`
pub fn whatsapp_link(contact: &Contact, message: &str, location: Option<&LocationFix>) -> String {
    let digits: String = contact.phone.chars().filter(char::is_ascii_digit).collect();
    format!(
        "https://wa.me/{}?text={}",
        digits,
        urlencoding::encode(&alert_text(message, location))
    )
}

/// `tel:` intent behind every call button.  Contacts reach it through
/// `AppService::dial_links`; the UI shell uses it for helplines.
pub fn dial_intent(number: &str) -> String {
    format!("tel:{}", number)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nearby {
    Police,
    Hospital,
}

/// Map search for the nearest police station or hospital.  UI shell only.
pub fn nearby_search_link(kind: Nearby, city: &str) -> String {
    let query = match kind {
        Nearby::Police => format!("Police Station near me {}", city),
        Nearby::Hospital => format!("Hospital near me {}", city),
    };
    format!(
        "https://www.google.com/maps/search/{}",
        urlencoding::encode(&query)
    )
}

/// Payload for the native share sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePayload {
    pub title: &'static str,
    pub text: &'static str,
    /// Only set for real web origins.
    pub url: Option<String>,
}

/// Share-sheet content for the UI shell's "share app" action.
pub fn share_payload(current_url: &str) -> SharePayload {
    SharePayload {
        title: APP_TITLE,
        text: SHARE_MESSAGE,
        url: current_url
            .starts_with("http")
            .then(|| current_url.to_string()),
    }
}

/// Clipboard text when the share sheet is unavailable or fails.
pub fn share_fallback_text(payload: &SharePayload) -> String {
    format!("{} {}", payload.text, payload.url.as_deref().unwrap_or(""))
}
