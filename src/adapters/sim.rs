//! Simulated handset for host runs.
//!
//! Every device answers after a configurable delay on the reactor so the
//! host binary exercises the same interleavings as a phone would.
//!
//! | Device        | Implements            | Behaviour                         |
//! |---------------|-----------------------|-----------------------------------|
//! | `SimHandset`  | HapticPort, TimePort  | logs vibration, host clocks       |
//! | `SimGps`      | LocationPort          | fixed fix or failure after delay  |
//! | `SimCamera`   | CapturePort           | synthetic media, or refusal       |
//! | `SimSpeaker`  | AudioPort             | logs oscillator activity          |

use core::cell::{Cell, RefCell};
use core::future::Future;
use core::time::Duration;

use log::{debug, info};

use crate::adapters::time::SystemClock;
use crate::app::ports::{
    AudioPort, CaptureConstraints, CapturePort, CaptureStream, HapticPort, LocationPort,
    OscillatorId, Position, PositionFailure, PositionRequest, TimePort, ToneSpec,
};
use crate::error::{AudioUnavailable, RecordingError};

// ── Handset ──────────────────────────────────────────────────

#[derive(Default)]
pub struct SimHandset {
    clock: SystemClock,
    vibrations: Vec<Vec<u16>>,
}

impl SimHandset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every pattern played so far.
    pub fn vibrations(&self) -> &[Vec<u16>] {
        &self.vibrations
    }
}

impl HapticPort for SimHandset {
    fn vibrate(&mut self, pattern_ms: &[u16]) {
        info!("SIM | vibrate {:?}", pattern_ms);
        self.vibrations.push(pattern_ms.to_vec());
    }
}

impl TimePort for SimHandset {
    fn monotonic_ms(&self) -> u64 {
        self.clock.monotonic_ms()
    }

    fn epoch_ms(&self) -> u64 {
        self.clock.epoch_ms()
    }
}

// ── GPS ──────────────────────────────────────────────────────

pub struct SimGps {
    delay: Duration,
    outcome: Result<Position, PositionFailure>,
}

impl SimGps {
    /// Answers with a fix at the given coordinates.
    pub fn fixed(latitude: f64, longitude: f64, delay: Duration) -> Self {
        Self {
            delay,
            outcome: Ok(Position {
                latitude,
                longitude,
                accuracy_m: 15.0,
                timestamp_ms: 0,
            }),
        }
    }

    pub fn failing(failure: PositionFailure, delay: Duration) -> Self {
        Self {
            delay,
            outcome: Err(failure),
        }
    }
}

impl LocationPort for SimGps {
    fn current_position(
        &self,
        request: &PositionRequest,
    ) -> impl Future<Output = Result<Position, PositionFailure>> {
        let delay = self.delay;
        let outcome = self.outcome;
        debug!("SIM | position requested (timeout {}ms)", request.timeout_ms);
        async move {
            async_io_mini::Timer::after(delay).await;
            outcome
        }
    }
}

// ── Camera ───────────────────────────────────────────────────

pub struct SimCamera {
    delay: Duration,
    refusal: Option<RecordingError>,
    chunk_bytes: usize,
}

impl SimCamera {
    pub fn new(delay: Duration, chunk_bytes: usize) -> Self {
        Self {
            delay,
            refusal: None,
            chunk_bytes,
        }
    }

    pub fn refusing(error: RecordingError, delay: Duration) -> Self {
        Self {
            delay,
            refusal: Some(error),
            chunk_bytes: 0,
        }
    }
}

/// Synthetic stream: every drain yields a fixed-size chunk.
pub struct SimStream {
    video: bool,
    chunk_bytes: usize,
    released: bool,
    seq: u8,
}

impl CaptureStream for SimStream {
    fn take_data(&mut self) -> Vec<u8> {
        if self.released {
            return Vec::new();
        }
        self.seq = self.seq.wrapping_add(1);
        vec![self.seq; self.chunk_bytes]
    }

    fn has_video(&self) -> bool {
        self.video
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            info!("SIM | capture tracks stopped");
        }
    }
}

impl CapturePort for SimCamera {
    type Stream = SimStream;

    fn open(
        &self,
        constraints: &CaptureConstraints,
    ) -> impl Future<Output = Result<SimStream, RecordingError>> {
        let delay = self.delay;
        let refusal = self.refusal;
        let stream = SimStream {
            video: constraints.video,
            chunk_bytes: self.chunk_bytes,
            released: false,
            seq: 0,
        };
        async move {
            async_io_mini::Timer::after(delay).await;
            match refusal {
                Some(e) => Err(e),
                None => Ok(stream),
            }
        }
    }
}

// ── Speaker ──────────────────────────────────────────────────

#[derive(Default)]
pub struct SimSpeaker {
    next_id: Cell<u32>,
    live: RefCell<Vec<OscillatorId>>,
    ramps: Cell<u32>,
}

impl SimSpeaker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_oscillators(&self) -> usize {
        self.live.borrow().len()
    }

    pub fn ramps(&self) -> u32 {
        self.ramps.get()
    }
}

impl AudioPort for SimSpeaker {
    fn start_oscillator(&self, tone: &ToneSpec) -> Result<OscillatorId, AudioUnavailable> {
        let id = OscillatorId(self.next_id.get() + 1);
        self.next_id.set(id.0);
        self.live.borrow_mut().push(id);
        info!(
            "SIM | oscillator {} {:?} {:.0}Hz gain {:.1}",
            id.0, tone.waveform, tone.frequency_hz, tone.gain
        );
        Ok(id)
    }

    fn ramp_frequency(&self, osc: OscillatorId, target_hz: f32, ramp_ms: u32) {
        self.ramps.set(self.ramps.get() + 1);
        debug!("SIM | oscillator {} -> {:.0}Hz over {}ms", osc.0, target_hz, ramp_ms);
    }

    fn stop_oscillator(&self, osc: OscillatorId) {
        self.live.borrow_mut().retain(|o| *o != osc);
        info!("SIM | oscillator {} stopped", osc.0);
    }
}
