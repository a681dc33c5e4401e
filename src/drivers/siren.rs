//! Siren synthesizer: sawtooth oscillator with a periodic frequency sweep.
//!
//! ## Lifecycle
//!
//! ```text
//!  toggle() ──▶ start_oscillator ──▶ spawn modulation task ──▶ RUNNING
//!  toggle() ──▶ drop modulation task ──▶ stop_oscillator   ──▶ SILENT
//! ```
//!
//! Both resources live in one [`SirenHandle`] and are released together.
//! Dropping the `Task` cancels the sweep loop, so no timer outlives the
//! oscillator.  If the audio subsystem is missing the siren degrades to
//! silence and reports itself as not running.

use core::time::Duration;
use std::rc::Rc;

use edge_executor::Task;
use log::{info, warn};

use crate::app::ports::{AudioPort, OscillatorId, ToneSpec, Waveform};
use crate::config::EmergencyConfig;
use crate::events::Executor;

/// Sweep parameters, derived from [`EmergencyConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SirenSweep {
    pub low_hz: f32,
    pub high_hz: f32,
    pub period_ms: u64,
    pub ramp_ms: u32,
    pub gain: f32,
}

impl SirenSweep {
    pub fn from_config(config: &EmergencyConfig) -> Self {
        Self {
            low_hz: config.siren_low_hz,
            high_hz: config.siren_high_hz,
            period_ms: config.siren_period_ms,
            ramp_ms: config.siren_ramp_ms,
            gain: config.siren_gain,
        }
    }

    /// The bound to ramp towards from `current_hz`.
    pub fn next_target(&self, current_hz: f32) -> f32 {
        if current_hz >= self.high_hz {
            self.low_hz
        } else {
            self.high_hz
        }
    }
}

/// A running siren: the oscillator plus its modulation task.
struct SirenHandle {
    oscillator: OscillatorId,
    modulation: Task<()>,
}

pub struct SirenSynthesizer<A: AudioPort> {
    audio: Rc<A>,
    sweep: SirenSweep,
    handle: Option<SirenHandle>,
    degraded: bool,
}

impl<A: AudioPort> SirenSynthesizer<A> {
    pub fn new(audio: Rc<A>, sweep: SirenSweep) -> Self {
        Self {
            audio,
            sweep,
            handle: None,
            degraded: false,
        }
    }

    /// Start if silent, stop if running.  Returns whether the siren is now
    /// sounding.
    pub fn toggle<'a>(&mut self, executor: &Executor<'a>) -> bool
    where
        A: 'a,
    {
        if self.handle.is_some() {
            self.stop();
        } else {
            self.start(executor);
        }
        self.is_running()
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// The last start attempt found no audio output.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Release the oscillator and cancel the sweep.  No-op when silent.
    pub(crate) fn stop(&mut self) {
        if let Some(SirenHandle {
            oscillator,
            modulation,
        }) = self.handle.take()
        {
            drop(modulation);
            self.audio.stop_oscillator(oscillator);
            info!("Siren stopped");
        }
    }

    fn start<'a>(&mut self, executor: &Executor<'a>)
    where
        A: 'a,
    {
        let tone = ToneSpec {
            waveform: Waveform::Sawtooth,
            frequency_hz: self.sweep.low_hz,
            gain: self.sweep.gain,
        };
        match self.audio.start_oscillator(&tone) {
            Ok(oscillator) => {
                let modulation = executor.spawn(sweep_loop(self.audio.clone(), oscillator, self.sweep));
                self.handle = Some(SirenHandle {
                    oscillator,
                    modulation,
                });
                self.degraded = false;
                info!(
                    "Siren started ({:.0}-{:.0} Hz every {}ms)",
                    self.sweep.low_hz, self.sweep.high_hz, self.sweep.period_ms
                );
            }
            Err(e) => {
                self.degraded = true;
                warn!("Siren unavailable: {}", e);
            }
        }
    }
}

impl<A: AudioPort> Drop for SirenSynthesizer<A> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Alternate the oscillator between the sweep bounds forever.
async fn sweep_loop<A: AudioPort>(audio: Rc<A>, oscillator: OscillatorId, sweep: SirenSweep) {
    let mut current = sweep.low_hz;
    loop {
        async_io_mini::Timer::after(Duration::from_millis(sweep.period_ms)).await;
        current = sweep.next_target(current);
        audio.ramp_frequency(oscillator, current, sweep.ramp_ms);
    }
}
