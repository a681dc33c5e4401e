//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade.  A UI binding would implement the same trait.

use log::{info, warn};

use crate::app::events::{Advisory, AppEvent};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] as one line.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={}", state);
            }
            AppEvent::Triggered(kind) => {
                info!("TRIGGER | {:?}", kind);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {} -> {}", from, to);
            }
            AppEvent::LocationLocked(fix) => {
                info!(
                    "LOCATION | locked {:.5},{:.5} \u{00b1}{}m | {}",
                    fix.latitude, fix.longitude, fix.accuracy_m, fix.map_link
                );
            }
            AppEvent::LocationFailed(e) => {
                warn!("LOCATION | {}", e);
            }
            AppEvent::RecordingStarted { has_video } => {
                info!(
                    "EVIDENCE | recording {}",
                    if *has_video { "audio+video" } else { "audio" }
                );
            }
            AppEvent::RecordingFailed(e) => {
                warn!("EVIDENCE | recording failed: {}", e);
            }
            AppEvent::EvidenceSaved { id, bytes, kind } => {
                info!("EVIDENCE | saved id={} bytes={} kind={:?}", id, bytes, kind);
            }
            AppEvent::SirenChanged(on) => {
                info!("SIREN | {}", if *on { "ON" } else { "OFF" });
            }
            AppEvent::StrobeChanged(on) => {
                info!("STROBE | {}", if *on { "ON" } else { "OFF" });
            }
            AppEvent::ContactsChanged(n) => {
                info!("CONTACTS | {} saved", n);
            }
            AppEvent::Advisory(a) => match a {
                Advisory::SilentModeActive => warn!("ADVISORY | silent mode is on"),
                Advisory::AudioUnavailable => warn!("ADVISORY | audio output unavailable"),
                Advisory::SettingsRejected(why) => warn!("ADVISORY | settings rejected: {}", why),
                Advisory::ProfileNotSaved => warn!("ADVISORY | profile not saved"),
            },
        }
    }
}
