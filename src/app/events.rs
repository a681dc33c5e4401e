//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: repaint the UI, write a log line,
//! record them for a test.

use crate::drivers::recorder::EvidenceKind;
use crate::drivers::trigger::TriggerKind;
use crate::error::{LocationError, RecordingError};
use crate::fsm::EmergencyState;
use crate::sensors::LocationFix;

/// Non-fatal conditions surfaced to the user as a banner or toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    /// Siren or strobe requested while silent mode is on.
    SilentModeActive,
    /// The platform has no audio output; the siren stays quiet.
    AudioUnavailable,
    /// A settings change failed validation and was not applied.
    SettingsRejected(&'static str),
    /// The profile could not be written back to storage.
    ProfileNotSaved,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The application service has started (carries initial state).
    Started(EmergencyState),

    /// An activation was classified.
    Triggered(TriggerKind),

    /// The observable lifecycle state moved, including each countdown step.
    StateChanged {
        from: EmergencyState,
        to: EmergencyState,
    },

    /// A position fix arrived for the live session.
    LocationLocked(LocationFix),

    /// Position acquisition failed for the live session.
    LocationFailed(LocationError),

    /// Evidence capture is running.
    RecordingStarted { has_video: bool },

    /// Evidence capture could not start.
    RecordingFailed(RecordingError),

    /// A finished capture was added to the vault.
    EvidenceSaved {
        id: String,
        bytes: usize,
        kind: EvidenceKind,
    },

    SirenChanged(bool),

    StrobeChanged(bool),

    /// Contacts were added or removed; carries the new count.
    ContactsChanged(usize),

    Advisory(Advisory),
}
