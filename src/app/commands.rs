//! Inbound commands to the application service.
//!
//! These represent actions requested by the user interface that the
//! [`AppService`](super::service::AppService) interprets and acts upon.

use crate::config::UserSettings;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// The SOS control was pressed.  Classified as start or bypass by
    /// timing against the previous press.
    Activate,

    /// Abort the countdown or stand down an active alert.
    Cancel,

    /// Switch the siren on or off.  Refused in silent mode.
    ToggleSiren,

    /// Switch the visual strobe on or off.  Refused in silent mode.
    ToggleStrobe,

    /// Replace the user settings.  Validated before being applied.
    UpdateSettings(UserSettings),

    /// Add a trusted WhatsApp contact.
    AddContact { name: String, phone: String },

    /// Delete a contact by id.
    RemoveContact(String),

    /// Delete an evidence artifact by id.
    DeleteEvidence(String),
}
