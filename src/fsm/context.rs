//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to.  It carries the stimulus being processed, the countdown and
//! session counters, the advisory fields subsystems report into, and the
//! side-effect requests handlers raise.  Think of it as the "blackboard"
//! in a blackboard architecture.

use crate::config::UserSettings;
use crate::drivers::trigger::TriggerKind;
use crate::error::{LocationError, RecordingError};
use crate::sensors::LocationFix;

/// Haptic pattern capacity (alternating on/off durations).
pub const HAPTIC_PATTERN_CAP: usize = 8;

// ---------------------------------------------------------------------------
// Stimulus (written by the service before each dispatch)
// ---------------------------------------------------------------------------

/// What the FSM is being asked to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stimulus {
    /// Nothing pending.
    #[default]
    None,
    /// Classified user activation.
    Trigger(TriggerKind),
    /// One countdown period elapsed.
    Tick,
    /// The countdown is at zero; promote to Active.
    Elapsed,
    /// User cancelled.
    Cancel,
}

// ---------------------------------------------------------------------------
// Side-effect requests (written by state handlers; consumed by the service)
// ---------------------------------------------------------------------------

/// Requests raised by state handlers during one dispatch.
/// The service turns these into port calls and runtime jobs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideEffects {
    /// Vibration pattern to play, empty for none.
    pub haptic: heapless::Vec<u16, HAPTIC_PATTERN_CAP>,
    /// Start the periodic countdown ticker for the current session.
    pub arm_countdown: bool,
    /// Stop the countdown ticker.
    pub disarm_countdown: bool,
    /// Fire off a one-shot position query.
    pub acquire_location: bool,
    /// Open the capture device and begin recording.
    pub start_recording: bool,
    /// Finalise any running capture into an artifact.
    pub stop_recording: bool,
    /// Stop the siren if it is sounding.
    pub silence_siren: bool,
    /// Clear the visual strobe.
    pub strobe_off: bool,
}

impl SideEffects {
    /// Drain all pending requests, leaving the struct empty.
    pub fn take(&mut self) -> Self {
        core::mem::take(self)
    }

    /// Replace the haptic request.  Patterns longer than the buffer are
    /// truncated.
    pub fn vibrate(&mut self, pattern_ms: &[u16]) {
        self.haptic.clear();
        for &d in pattern_ms.iter().take(HAPTIC_PATTERN_CAP) {
            let _ = self.haptic.push(d);
        }
    }
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Input --
    /// Stimulus for the dispatch in progress.
    pub stimulus: Stimulus,

    // -- Lifecycle --
    /// Seconds left on the countdown.  Zero outside `CountingDown`.
    pub remaining: u32,
    /// Advances every time the machine leaves Idle.  Async results tagged
    /// with an older value are stale.
    pub session: u32,

    // -- Advisory --
    /// Position from the current session, if one arrived.
    pub location: Option<LocationFix>,
    pub location_error: Option<LocationError>,
    pub recording_error: Option<RecordingError>,

    // -- Outputs --
    pub effects: SideEffects,

    // -- Configuration --
    pub settings: UserSettings,
}

impl FsmContext {
    pub fn new(settings: UserSettings) -> Self {
        Self {
            stimulus: Stimulus::None,
            remaining: 0,
            session: 0,
            location: None,
            location_error: None,
            recording_error: None,
            effects: SideEffects::default(),
            settings,
        }
    }

    /// Forget everything the last session reported.
    pub fn clear_advisories(&mut self) {
        self.location = None;
        self.location_error = None;
        self.recording_error = None;
    }
}
