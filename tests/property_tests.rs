//! Property tests for the emergency lifecycle.
//!
//! Drives [`AppService`] with arbitrary timings and command sequences and
//! checks the invariants that must hold for every interleaving.

use std::rc::Rc;

use proptest::prelude::*;

use safeguard::adapters::sim::SimSpeaker;
use safeguard::app::commands::AppCommand;
use safeguard::app::events::AppEvent;
use safeguard::app::ports::{CaptureStream, EventSink, HapticPort, TimePort};
use safeguard::app::service::{AppService, Job};
use safeguard::config::{EmergencyConfig, Profile, UserSettings};
use safeguard::drivers::siren::{SirenSweep, SirenSynthesizer};
use safeguard::drivers::trigger::{BYPASS_WINDOW_MS, TriggerDetector, TriggerKind};
use safeguard::events::Executor;
use safeguard::fsm::EmergencyState;

// ── Minimal adapters ──────────────────────────────────────────

struct Hw {
    now_ms: u64,
}

impl HapticPort for Hw {
    fn vibrate(&mut self, _pattern_ms: &[u16]) {}
}

impl TimePort for Hw {
    fn monotonic_ms(&self) -> u64 {
        self.now_ms
    }
    fn epoch_ms(&self) -> u64 {
        self.now_ms
    }
}

#[derive(Default)]
struct Sink {
    events: Vec<AppEvent>,
}

impl EventSink for Sink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

struct Stream;

impl CaptureStream for Stream {
    fn take_data(&mut self) -> Vec<u8> {
        vec![0; 4]
    }
    fn has_video(&self) -> bool {
        false
    }
    fn release(&mut self) {}
}

fn service(countdown_seconds: u32) -> (AppService<Stream>, Hw, Sink) {
    let profile = Profile {
        settings: UserSettings {
            countdown_seconds,
            ..UserSettings::default()
        },
        ..Profile::default()
    };
    let mut app = AppService::new(profile, &EmergencyConfig::default());
    let mut sink = Sink::default();
    app.start(&mut sink);
    (app, Hw { now_ms: 1_000 }, sink)
}

// ── Countdown length ─────────────────────────────────────────

proptest! {
    /// A countdown of `d` seconds needs exactly `d` ticks to go Active.
    #[test]
    fn countdown_takes_exactly_d_ticks(d in 0u32..=10) {
        let (mut app, mut hw, mut sink) = service(d);
        app.handle_command(AppCommand::Activate, &mut hw, &mut sink);
        let session = app.session();

        let mut ticks = 0;
        while app.state() != EmergencyState::Active {
            prop_assert!(ticks < d, "still counting after {} ticks", ticks);
            app.countdown_tick(session, &mut hw, &mut sink);
            ticks += 1;
        }
        prop_assert_eq!(ticks, d);

        let expected: Vec<EmergencyState> = (0..=d)
            .rev()
            .map(EmergencyState::CountingDown)
            .chain(core::iter::once(EmergencyState::Active))
            .collect();
        let seen: Vec<EmergencyState> = sink
            .events
            .iter()
            .filter_map(|e| match e {
                AppEvent::StateChanged { to, .. } => Some(*to),
                _ => None,
            })
            .collect();
        prop_assert_eq!(seen, expected);
    }
}

// ── Trigger classification ───────────────────────────────────

proptest! {
    /// Bypass iff the gap to the last Start is under the window.
    #[test]
    fn classification_follows_window(gaps in proptest::collection::vec(0u64..1_000, 1..20)) {
        let mut detector = TriggerDetector::default();
        let mut now = 0u64;
        let mut last_start: Option<u64> = None;

        for gap in gaps {
            now += gap;
            let kind = detector.classify(now);
            let expected = match last_start {
                Some(t) if now - t < BYPASS_WINDOW_MS => TriggerKind::Bypass,
                _ => TriggerKind::Start,
            };
            prop_assert_eq!(kind, expected);
            if kind == TriggerKind::Start {
                last_start = Some(now);
            }
        }
    }
}

// ── Siren toggling ───────────────────────────────────────────

proptest! {
    /// After `n` toggles the siren sounds iff `n` is odd, with exactly one
    /// live oscillator when sounding and none otherwise.
    #[test]
    fn siren_toggle_parity(n in 0usize..12) {
        let speaker = Rc::new(SimSpeaker::new());
        let executor: Executor<'_> = Executor::new();
        let mut siren =
            SirenSynthesizer::new(speaker.clone(), SirenSweep::from_config(&EmergencyConfig::default()));

        let mut running = false;
        for _ in 0..n {
            running = siren.toggle(&executor);
        }
        prop_assert_eq!(running, n % 2 == 1);
        prop_assert_eq!(siren.is_running(), running);
        prop_assert_eq!(speaker.live_oscillators(), usize::from(running));

        drop(siren);
        prop_assert_eq!(speaker.live_oscillators(), 0, "drop must release the oscillator");
    }
}

// ── Arbitrary command sequences ──────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Activate { after_ms: u64 },
    Tick,
    StaleTick,
    Cancel,
    CaptureOpened,
    Collect,
    ToggleSiren,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u64..1_500).prop_map(|after_ms| Op::Activate { after_ms }),
        Just(Op::Tick),
        Just(Op::StaleTick),
        Just(Op::Cancel),
        Just(Op::CaptureOpened),
        Just(Op::Collect),
        Just(Op::ToggleSiren),
    ]
}

proptest! {
    /// Whatever happened before, Cancel lands in Idle with no recording,
    /// strobe or location state left over.
    #[test]
    fn cancel_always_returns_to_idle(
        d in 0u32..=10,
        ops in proptest::collection::vec(op_strategy(), 0..40),
    ) {
        let (mut app, mut hw, mut sink) = service(d);
        for op in ops {
            match op {
                Op::Activate { after_ms } => {
                    hw.now_ms += after_ms;
                    app.handle_command(AppCommand::Activate, &mut hw, &mut sink);
                }
                Op::Tick => {
                    let s = app.session();
                    app.countdown_tick(s, &mut hw, &mut sink);
                }
                Op::StaleTick => {
                    let before = app.state();
                    let s = app.session().wrapping_sub(1);
                    app.countdown_tick(s, &mut hw, &mut sink);
                    prop_assert_eq!(app.state(), before, "stale tick changed state");
                }
                Op::Cancel => {
                    app.handle_command(AppCommand::Cancel, &mut hw, &mut sink);
                }
                Op::CaptureOpened => {
                    let s = app.session();
                    app.capture_opened(s, Ok(Stream), &mut sink);
                }
                Op::Collect => {
                    let s = app.session();
                    app.collect_evidence(s);
                }
                Op::ToggleSiren => {
                    app.handle_command(AppCommand::ToggleSiren, &mut hw, &mut sink);
                }
            }
        }

        let jobs = app.handle_command(AppCommand::Cancel, &mut hw, &mut sink);
        prop_assert_eq!(app.state(), EmergencyState::Idle);
        prop_assert!(!app.is_recording());
        prop_assert!(!app.strobe_on());
        prop_assert!(app.location().is_none());
        prop_assert!(app.location_error().is_none());
        let rearmed = jobs.iter().any(|j| matches!(j, Job::ArmCountdown { .. }));
        prop_assert!(!rearmed, "cancel must not arm a countdown");
    }

    /// Each session yields at most one artifact, and only if a stream was
    /// recording when it ended.
    #[test]
    fn at_most_one_artifact_per_session(
        rounds in proptest::collection::vec(any::<bool>(), 1..8),
    ) {
        let (mut app, mut hw, mut sink) = service(0);
        let mut expected = 0;
        for open_stream in rounds {
            hw.now_ms += 2_000;
            app.handle_command(AppCommand::Activate, &mut hw, &mut sink);
            if open_stream {
                let s = app.session();
                app.capture_opened(s, Ok(Stream), &mut sink);
                app.collect_evidence(s);
                expected += 1;
            }
            app.handle_command(AppCommand::Cancel, &mut hw, &mut sink);
        }
        prop_assert_eq!(app.vault().len(), expected);
    }
}
