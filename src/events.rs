//! Serialized event inbox.
//!
//! Every input the orchestrator reacts to passes through one channel and
//! is handled to completion before the next is taken, so transitions never
//! interleave.
//!
//! ```text
//! ┌───────────────┐
//! │ UI commands   │────▶┌──────────────┐     ┌──────────────────┐
//! │ Countdown     │────▶│              │     │                  │
//! │ Location task │────▶│    Inbox     │────▶│ EmergencyRuntime │
//! │ Capture task  │────▶│   (FIFO)     │     │   (consumer)     │
//! │ Collector     │────▶│              │     │                  │
//! └───────────────┘     └──────────────┘     └──────────────────┘
//! ```
//!
//! Producers that belong to a session tag their input with its id; the
//! consumer drops anything whose session has ended.

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::Channel;

use crate::app::commands::AppCommand;
use crate::error::{LocationError, RecordingError};
use crate::sensors::LocationFix;

/// Maximum number of pending inputs.
pub const INBOX_CAP: usize = 16;

/// Maximum number of concurrently spawned background tasks.
pub const EXECUTOR_TASKS: usize = 16;

/// Single-threaded executor shared by the runtime and its background tasks.
pub type Executor<'a> = edge_executor::LocalExecutor<'a, EXECUTOR_TASKS>;

/// One unit of work for the orchestrator.  `S` is the platform's capture
/// stream type.
pub enum Input<S> {
    /// User request.
    Command(AppCommand),
    /// Countdown period elapsed.
    Tick { session: u32 },
    /// Position query finished.
    LocationSettled {
        session: u32,
        result: Result<LocationFix, LocationError>,
    },
    /// Capture device answered.
    CaptureOpened {
        session: u32,
        result: Result<S, RecordingError>,
    },
    /// Time to drain buffered capture data.
    Collect { session: u32 },
    /// Stop the runtime loop.
    Shutdown,
}

impl<S> Input<S> {
    /// Short label for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Command(_) => "Command",
            Self::Tick { .. } => "Tick",
            Self::LocationSettled { .. } => "LocationSettled",
            Self::CaptureOpened { .. } => "CaptureOpened",
            Self::Collect { .. } => "Collect",
            Self::Shutdown => "Shutdown",
        }
    }
}

/// The orchestrator's FIFO.
pub type Inbox<S> = Channel<NoopRawMutex, Input<S>, INBOX_CAP>;
