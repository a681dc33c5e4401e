//! Port traits: the hexagonal boundary between domain logic and the device.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService / EmergencyRuntime (domain)
//! ```
//!
//! Driven adapters (geolocation, camera/microphone, audio synthesis,
//! vibration, clocks, storage, event sinks) implement these traits.  The
//! domain consumes them via generics, so the core never touches platform
//! APIs directly.
//!
//! The two long-running device calls (position fix, capture open) return
//! futures; everything else is synchronous fire-and-forget.

use core::future::Future;

use crate::config::Profile;
use crate::error::{AudioUnavailable, ProfileError, RecordingError, StorageError};

// ───────────────────────────────────────────────────────────────
// Haptics (domain → device)
// ───────────────────────────────────────────────────────────────

pub trait HapticPort {
    /// Vibrate with alternating on/off durations in milliseconds.
    /// Devices without a vibrator ignore the request.
    fn vibrate(&mut self, pattern_ms: &[u16]);
}

// ───────────────────────────────────────────────────────────────
// Geolocation (device → domain)
// ───────────────────────────────────────────────────────────────

/// Options for a one-shot position query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionRequest {
    pub high_accuracy: bool,
    pub timeout_ms: u64,
    /// Oldest acceptable cached fix; 0 forces a fresh one.
    pub maximum_age_ms: u64,
}

/// Raw platform fix, before rounding and link derivation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_m: f64,
    pub timestamp_ms: u64,
}

/// Platform failure codes for a position query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionFailure {
    /// The platform has no geolocation service at all.
    Unsupported,
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    /// Any code the platform does not document.
    Other(u16),
}

pub trait LocationPort {
    /// Single attempt, no retry.
    fn current_position(
        &self,
        request: &PositionRequest,
    ) -> impl Future<Output = Result<Position, PositionFailure>>;
}

// ───────────────────────────────────────────────────────────────
// Evidence capture (device → domain)
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConstraints {
    pub audio: bool,
    pub video: bool,
    /// Prefer the front camera.
    pub facing_user: bool,
}

impl CaptureConstraints {
    /// Combined audio + front-camera video.
    pub const EVIDENCE: Self = Self {
        audio: true,
        video: true,
        facing_user: true,
    };
}

/// A live capture session.  The recorder drains it incrementally and
/// releases the hardware tracks on stop.
pub trait CaptureStream {
    /// Take whatever encoded media has accumulated since the last call.
    fn take_data(&mut self) -> Vec<u8>;

    /// Whether the granted stream carries a video track.
    fn has_video(&self) -> bool;

    /// Stop every hardware track.  Must be idempotent.
    fn release(&mut self);
}

pub trait CapturePort {
    type Stream: CaptureStream;

    /// Request device access and start capturing.
    fn open(
        &self,
        constraints: &CaptureConstraints,
    ) -> impl Future<Output = Result<Self::Stream, RecordingError>>;
}

// ───────────────────────────────────────────────────────────────
// Audio synthesis (domain → device)
// ───────────────────────────────────────────────────────────────

/// Platform handle to a running oscillator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OscillatorId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSpec {
    pub waveform: Waveform,
    pub frequency_hz: f32,
    pub gain: f32,
}

/// Oscillator primitives.  Methods take `&self`: audio graphs are shared
/// platform objects with their own interior state.
pub trait AudioPort {
    /// Create, connect, and start an oscillator.
    fn start_oscillator(&self, tone: &ToneSpec) -> Result<OscillatorId, AudioUnavailable>;

    /// Exponentially ramp the oscillator frequency to `target_hz`.
    fn ramp_frequency(&self, osc: OscillatorId, target_hz: f32, ramp_ms: u32);

    /// Stop and disconnect.  Unknown ids are ignored.
    fn stop_oscillator(&self, osc: OscillatorId);
}

// ───────────────────────────────────────────────────────────────
// Clock
// ───────────────────────────────────────────────────────────────

pub trait TimePort {
    /// Monotonic milliseconds (activation timing).
    fn monotonic_ms(&self) -> u64;

    /// Wall-clock milliseconds since the Unix epoch (artifact stamps).
    fn epoch_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink (domain → UI / logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (UI bindings,
/// serial log, test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Persistence
// ───────────────────────────────────────────────────────────────

/// Opaque key-value storage.
///
/// Write operations MUST be atomic: whatever was last written is returned
/// verbatim on the next read.
pub trait StoragePort {
    fn read(&self, namespace: &str, key: &str) -> Result<Vec<u8>, StorageError>;

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;
}

/// Loads and persists the contacts + settings blob.
///
/// Implementations MUST validate before persisting and reject invalid
/// values with [`ProfileError::ValidationFailed`], not silently clamp.
pub trait ProfileStore {
    /// Returns [`Profile::default()`] if nothing has been stored yet.
    fn load(&self) -> Result<Profile, ProfileError>;

    fn save(&mut self, profile: &Profile) -> Result<(), ProfileError>;
}
