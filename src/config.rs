//! Configuration parameters
//!
//! Two layers:
//! - [`UserSettings`]: what the user edits (countdown, silent mode, message).
//!   Persisted as part of the [`Profile`] blob.
//! - [`EmergencyConfig`]: timing constants for the orchestrator.  Fixed in
//!   production, shrunk by tests and the host simulation.

use serde::{Deserialize, Serialize};

use crate::directory::{Contact, initial_contacts};

/// Longest selectable countdown.
pub const MAX_COUNTDOWN_SECS: u32 = 10;

pub const DEFAULT_EMERGENCY_MESSAGE: &str = "Sir/Madam, I am in immediate danger and need help.
Please contact me at this number.
My live location is shared below.
Kindly instruct the nearest PCR or police unit to reach immediately.";

/// UI language.  Only affects what collaborators render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Or,
}

/// User-editable settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub user_name: String,
    /// Text sent to contacts ahead of the live-location link
    pub emergency_message: String,
    /// Countdown length before the alert goes active (0-10 s)
    pub countdown_seconds: u32,
    pub language: Language,
    pub blood_group: String,
    /// Covert mode: no siren/strobe, distinctive haptic on activation
    pub silent_mode: bool,
    /// Start evidence capture automatically when the alert goes active
    pub auto_record: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            user_name: String::new(),
            emergency_message: DEFAULT_EMERGENCY_MESSAGE.to_string(),
            countdown_seconds: 3,
            language: Language::En,
            blood_group: "Not Set".to_string(),
            silent_mode: false,
            auto_record: true,
        }
    }
}

/// Orchestrator timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmergencyConfig {
    // --- Countdown ---
    /// Period of one countdown tick (milliseconds)
    pub tick_interval_ms: u64,
    /// Two activations closer than this bypass the countdown (milliseconds)
    pub bypass_window_ms: u64,

    // --- Location ---
    /// One-shot position request timeout (milliseconds)
    pub location_timeout_ms: u64,

    // --- Siren ---
    pub siren_low_hz: f32,
    pub siren_high_hz: f32,
    /// Interval between frequency sweeps (milliseconds)
    pub siren_period_ms: u64,
    /// Duration of each exponential ramp (milliseconds)
    pub siren_ramp_ms: u32,
    pub siren_gain: f32,

    // --- Evidence ---
    /// How often buffered capture data is collected (milliseconds)
    pub evidence_timeslice_ms: u64,
}

impl Default for EmergencyConfig {
    fn default() -> Self {
        Self {
            // Countdown
            tick_interval_ms: 1000,
            bypass_window_ms: 400,

            // Location
            location_timeout_ms: 10_000,

            // Siren
            siren_low_hz: 400.0,
            siren_high_hz: 1200.0,
            siren_period_ms: 400,
            siren_ramp_ms: 300,
            siren_gain: 0.5,

            // Evidence
            evidence_timeslice_ms: 1000,
        }
    }
}

/// The persisted blob: `{ contacts, settings }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default = "initial_contacts")]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub settings: UserSettings,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            contacts: initial_contacts(),
            settings: UserSettings::default(),
        }
    }
}

/// Range-check a profile before it is persisted.
pub fn validate_profile(profile: &Profile) -> Result<(), crate::error::ProfileError> {
    use crate::error::ProfileError::ValidationFailed;

    let s = &profile.settings;
    if s.countdown_seconds > MAX_COUNTDOWN_SECS {
        return Err(ValidationFailed("countdown_seconds must be 0-10"));
    }
    if s.emergency_message.trim().is_empty() {
        return Err(ValidationFailed("emergency_message must not be empty"));
    }
    if profile.contacts.iter().any(|c| c.phone.trim().is_empty()) {
        return Err(ValidationFailed("contact phone must not be empty"));
    }
    Ok(())
}
