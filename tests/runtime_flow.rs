//! Integration tests: EmergencyRuntime on the local executor with
//! simulated devices and millisecond-scale timings.
//!
//! Each test scripts a user against the inbox, runs the runtime until
//! `Shutdown`, then inspects the recorded events.

use std::rc::Rc;
use std::time::Duration;

use safeguard::adapters::sim::{SimCamera, SimGps, SimHandset, SimSpeaker, SimStream};
use safeguard::adapters::store::MemoryStore;
use safeguard::app::commands::AppCommand;
use safeguard::app::events::AppEvent;
use safeguard::app::ports::{EventSink, PositionFailure, ProfileStore};
use safeguard::app::runtime::{Devices, EmergencyRuntime};
use safeguard::config::{EmergencyConfig, Profile, UserSettings};
use safeguard::error::{LocationError, RecordingError};
use safeguard::events::{Executor, Inbox, Input};
use safeguard::fsm::EmergencyState;

// ── Harness ───────────────────────────────────────────────────

#[derive(Default)]
struct RecordingSink {
    events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

impl RecordingSink {
    fn states(&self) -> Vec<EmergencyState> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::StateChanged { to, .. } => Some(*to),
                _ => None,
            })
            .collect()
    }

    fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

type Runtime = EmergencyRuntime<SimHandset, SimGps, SimCamera, SimSpeaker, MemoryStore, RecordingSink>;

fn fast_config() -> EmergencyConfig {
    EmergencyConfig {
        tick_interval_ms: 10,
        location_timeout_ms: 100,
        siren_period_ms: 5,
        siren_ramp_ms: 2,
        evidence_timeslice_ms: 5,
        ..EmergencyConfig::default()
    }
}

fn store_with(countdown_seconds: u32) -> MemoryStore {
    let mut store = MemoryStore::new();
    let profile = Profile {
        settings: UserSettings {
            countdown_seconds,
            ..UserSettings::default()
        },
        ..Profile::default()
    };
    store.save(&profile).unwrap();
    store
}

fn make_runtime(
    gps: SimGps,
    camera: SimCamera,
    store: MemoryStore,
    config: EmergencyConfig,
) -> (Runtime, Rc<SimSpeaker>) {
    let speaker = Rc::new(SimSpeaker::new());
    let devices = Devices {
        hw: SimHandset::new(),
        location: Rc::new(gps),
        capture: Rc::new(camera),
        audio: speaker.clone(),
    };
    let runtime = EmergencyRuntime::new(devices, store, RecordingSink::default(), config);
    (runtime, speaker)
}

fn default_gps() -> SimGps {
    SimGps::fixed(20.4625, 85.883, Duration::from_millis(5))
}

fn default_camera() -> SimCamera {
    SimCamera::new(Duration::from_millis(5), 32)
}

/// A scripted step: send an input, then wait.
enum Step {
    Send(AppCommand),
    Wait(u64),
}

async fn play(inbox: Rc<Inbox<SimStream>>, steps: Vec<Step>) {
    for step in steps {
        match step {
            Step::Send(cmd) => inbox.send(Input::Command(cmd)).await,
            Step::Wait(ms) => {
                async_io_mini::Timer::after(Duration::from_millis(ms)).await;
            }
        }
    }
    inbox.send(Input::Shutdown).await;
}

fn run(runtime: &mut Runtime, steps: Vec<Step>) {
    let inbox = runtime.inbox();
    let executor: Executor<'_> = Executor::new();
    futures_lite::future::block_on(executor.run(futures_lite::future::zip(
        runtime.run(&executor),
        play(inbox, steps),
    )));
}

// ── Full alert ────────────────────────────────────────────────

#[test]
fn full_alert_cycle() {
    let (mut runtime, speaker) =
        make_runtime(default_gps(), default_camera(), store_with(2), fast_config());
    run(
        &mut runtime,
        vec![
            Step::Send(AppCommand::Activate),
            Step::Wait(80),
            Step::Send(AppCommand::ToggleSiren),
            Step::Wait(40),
            Step::Send(AppCommand::Cancel),
            Step::Wait(20),
        ],
    );

    let sink = runtime.sink();
    assert_eq!(
        sink.states(),
        [
            EmergencyState::CountingDown(2),
            EmergencyState::CountingDown(1),
            EmergencyState::CountingDown(0),
            EmergencyState::Active,
            EmergencyState::Idle,
        ]
    );
    assert_eq!(sink.count(|e| matches!(e, AppEvent::LocationLocked(_))), 1);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::RecordingStarted { has_video: true })),
        1
    );
    assert_eq!(sink.count(|e| matches!(e, AppEvent::EvidenceSaved { .. })), 1);
    assert!(sink.events.contains(&AppEvent::SirenChanged(true)));
    assert_eq!(sink.events.iter().rev().find(|e| matches!(e, AppEvent::SirenChanged(_))),
        Some(&AppEvent::SirenChanged(false)));

    let service = runtime.service();
    assert_eq!(service.state(), EmergencyState::Idle);
    assert_eq!(service.vault().len(), 1);
    assert!(!service.vault().latest().unwrap().media.is_empty());
    assert!(!service.is_recording());
    assert_eq!(speaker.live_oscillators(), 0, "cancel must silence the siren");
    assert!(speaker.ramps() > 0, "siren should have swept while sounding");
    assert_eq!(runtime.hw().vibrations(), &[vec![50]]);
}

#[test]
fn double_tap_skips_countdown() {
    let (mut runtime, _speaker) =
        make_runtime(default_gps(), default_camera(), store_with(10), fast_config());
    run(
        &mut runtime,
        vec![
            Step::Send(AppCommand::Activate),
            Step::Send(AppCommand::Activate),
            Step::Wait(30),
        ],
    );
    assert_eq!(
        runtime.sink().states(),
        [EmergencyState::CountingDown(10), EmergencyState::Active]
    );
    assert_eq!(runtime.service().state(), EmergencyState::Active);
}

// ── Cancellation ──────────────────────────────────────────────

#[test]
fn cancel_during_countdown_stops_ticking() {
    let (mut runtime, _speaker) =
        make_runtime(default_gps(), default_camera(), store_with(5), fast_config());
    run(
        &mut runtime,
        vec![
            Step::Send(AppCommand::Activate),
            Step::Wait(25),
            Step::Send(AppCommand::Cancel),
            Step::Wait(60),
        ],
    );

    let states = runtime.sink().states();
    assert_eq!(states.last(), Some(&EmergencyState::Idle));
    assert!(!states.contains(&EmergencyState::Active));
    assert_eq!(
        states.iter().filter(|s| **s == EmergencyState::Idle).count(),
        1,
        "no tick may restart the countdown after cancel"
    );
    assert_eq!(runtime.sink().count(|e| matches!(e, AppEvent::LocationLocked(_))), 0);
}

#[test]
fn capture_arriving_after_cancel_is_dropped() {
    let camera = SimCamera::new(Duration::from_millis(50), 32);
    let (mut runtime, _speaker) = make_runtime(default_gps(), camera, store_with(0), fast_config());
    run(
        &mut runtime,
        vec![
            Step::Send(AppCommand::Activate),
            Step::Wait(10),
            Step::Send(AppCommand::Cancel),
            Step::Wait(80),
        ],
    );

    let sink = runtime.sink();
    assert_eq!(sink.count(|e| matches!(e, AppEvent::RecordingStarted { .. })), 0);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::EvidenceSaved { .. })), 0);
    assert!(runtime.service().vault().is_empty());
}

// ── Degraded devices ──────────────────────────────────────────

#[test]
fn refused_camera_keeps_alert_running() {
    let camera = SimCamera::refusing(RecordingError::DeviceUnavailable, Duration::from_millis(5));
    let (mut runtime, speaker) = make_runtime(default_gps(), camera, store_with(0), fast_config());
    run(
        &mut runtime,
        vec![
            Step::Send(AppCommand::Activate),
            Step::Wait(20),
            Step::Send(AppCommand::ToggleSiren),
            Step::Wait(10),
        ],
    );

    let sink = runtime.sink();
    assert!(sink
        .events
        .contains(&AppEvent::RecordingFailed(RecordingError::DeviceUnavailable)));
    assert!(sink.events.contains(&AppEvent::SirenChanged(true)));
    assert_eq!(runtime.service().state(), EmergencyState::Active);
    assert!(runtime.service().vault().is_empty());
    // Shutdown tears the siren down.
    assert_eq!(speaker.live_oscillators(), 0);
}

#[test]
fn denied_location_is_reported() {
    let gps = SimGps::failing(PositionFailure::PermissionDenied, Duration::from_millis(5));
    let (mut runtime, _speaker) = make_runtime(gps, default_camera(), store_with(0), fast_config());
    run(&mut runtime, vec![Step::Send(AppCommand::Activate), Step::Wait(30)]);

    assert!(runtime
        .sink()
        .events
        .contains(&AppEvent::LocationFailed(LocationError::PermissionDenied)));
    assert_eq!(runtime.service().state(), EmergencyState::Active);
}

#[test]
fn slow_location_times_out() {
    let gps = SimGps::fixed(0.0, 0.0, Duration::from_millis(500));
    let config = EmergencyConfig {
        location_timeout_ms: 20,
        ..fast_config()
    };
    let (mut runtime, _speaker) = make_runtime(gps, default_camera(), store_with(0), config);
    run(&mut runtime, vec![Step::Send(AppCommand::Activate), Step::Wait(60)]);

    assert_eq!(
        runtime.service().location_error(),
        Some(LocationError::Timeout)
    );
    assert!(runtime.service().location().is_none());
}

// ── Siren ─────────────────────────────────────────────────────

#[test]
fn siren_toggled_twice_is_silent() {
    let (mut runtime, speaker) =
        make_runtime(default_gps(), default_camera(), store_with(3), fast_config());
    run(
        &mut runtime,
        vec![
            Step::Send(AppCommand::ToggleSiren),
            Step::Wait(15),
            Step::Send(AppCommand::ToggleSiren),
            Step::Wait(15),
        ],
    );
    assert_eq!(speaker.live_oscillators(), 0);
    assert_eq!(
        runtime.sink().count(|e| matches!(e, AppEvent::SirenChanged(_))),
        2
    );
    assert_eq!(runtime.service().state(), EmergencyState::Idle);
}

// ── Persistence ───────────────────────────────────────────────

#[test]
fn settings_change_is_persisted() {
    let (mut runtime, _speaker) =
        make_runtime(default_gps(), default_camera(), store_with(3), fast_config());
    let settings = UserSettings {
        countdown_seconds: 6,
        silent_mode: true,
        ..UserSettings::default()
    };
    run(
        &mut runtime,
        vec![Step::Send(AppCommand::UpdateSettings(settings.clone()))],
    );

    let stored = runtime.store().load().unwrap();
    assert_eq!(stored.settings, settings);
    assert!(!runtime.service().is_profile_dirty());
}

#[test]
fn unreadable_profile_falls_back_to_defaults() {
    use safeguard::adapters::store::{PROFILE_KEY, PROFILE_NAMESPACE};
    use safeguard::app::ports::StoragePort;

    let mut store = MemoryStore::new();
    store.write(PROFILE_NAMESPACE, PROFILE_KEY, b"{not json").unwrap();
    let (runtime, _speaker) = make_runtime(default_gps(), default_camera(), store, fast_config());
    assert_eq!(runtime.service().settings(), &UserSettings::default());
    assert_eq!(runtime.service().contacts().len(), 2);
}
