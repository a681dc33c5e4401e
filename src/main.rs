//! SafeGuard host simulation: entry point.
//!
//! Runs the emergency core against simulated handset devices and walks
//! through one complete alert.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SimHandset       SimGps        SimCamera      SimSpeaker      │
//! │  (Haptic+Time)    (Location)    (Capture)      (Audio)         │
//! │  LogEventSink     MemoryStore                                  │
//! │  (EventSink)      (Storage+Profile)                            │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  EmergencyRuntime ──▶ AppService (pure logic)          │    │
//! │  │  Trigger · FSM · Recorder · Siren · Location           │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `safeguard [countdown_seconds]`.  `RUST_LOG` controls verbosity.
#![deny(unused_must_use)]

use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use log::info;

use safeguard::adapters::log_sink::LogEventSink;
use safeguard::adapters::sim::{SimCamera, SimGps, SimHandset, SimSpeaker, SimStream};
use safeguard::adapters::store::MemoryStore;
use safeguard::app::commands::AppCommand;
use safeguard::app::ports::ProfileStore;
use safeguard::app::runtime::{Devices, EmergencyRuntime};
use safeguard::config::{EmergencyConfig, MAX_COUNTDOWN_SECS};
use safeguard::directory::{HelplineCategory, helplines_by_category};
use safeguard::drivers::recorder::export_file_name;
use safeguard::error::Error;
use safeguard::events::{Executor, Inbox, Input};
use safeguard::outreach::{Nearby, dial_intent, nearby_search_link, share_fallback_text, share_payload};

/// Drill timing: one countdown "second" lasts this long.
const DRILL_TICK_MS: u64 = 200;

const DRILL_CITY: &str = "Cuttack";
const DRILL_SHARE_URL: &str = "https://safeguard.example/cuttack";

fn drill_config() -> EmergencyConfig {
    EmergencyConfig {
        tick_interval_ms: DRILL_TICK_MS,
        location_timeout_ms: 2_000,
        evidence_timeslice_ms: 100,
        ..EmergencyConfig::default()
    }
}

/// Scripted user: activate, wait out the countdown, sound the alarm, stand down.
async fn drill(inbox: Rc<Inbox<SimStream>>, countdown_secs: u32) {
    let pause = |ms: u64| async_io_mini::Timer::after(Duration::from_millis(ms));

    info!("DRILL | pressing SOS");
    inbox.send(Input::Command(AppCommand::Activate)).await;
    pause(DRILL_TICK_MS * (u64::from(countdown_secs) + 1)).await;

    info!("DRILL | siren + strobe");
    inbox.send(Input::Command(AppCommand::ToggleSiren)).await;
    inbox.send(Input::Command(AppCommand::ToggleStrobe)).await;
    pause(1_500).await;

    info!("DRILL | standing down");
    inbox.send(Input::Command(AppCommand::Cancel)).await;
    pause(50).await;
    inbox.send(Input::Shutdown).await;
}

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  SafeGuard v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Profile ────────────────────────────────────────────
    let countdown_secs = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse::<u32>()
            .with_context(|| format!("countdown must be a whole number of seconds, got {arg:?}"))?,
        None => 3,
    };
    if countdown_secs > MAX_COUNTDOWN_SECS {
        bail!("countdown must be at most {MAX_COUNTDOWN_SECS} seconds");
    }

    let mut store = MemoryStore::new();
    let mut profile = store.load().map_err(Error::from)?;
    profile.settings.countdown_seconds = countdown_secs;
    store.save(&profile).map_err(Error::from)?;

    // ── 3. Devices ────────────────────────────────────────────
    let devices = Devices {
        hw: SimHandset::new(),
        location: Rc::new(SimGps::fixed(20.4625, 85.8830, Duration::from_millis(300))),
        capture: Rc::new(SimCamera::new(Duration::from_millis(150), 512)),
        audio: Rc::new(SimSpeaker::new()),
    };
    let mut runtime = EmergencyRuntime::new(devices, store, LogEventSink::new(), drill_config());

    // ── 4. Event loop ─────────────────────────────────────────
    let inbox = runtime.inbox();
    let executor: Executor<'_> = Executor::new();
    futures_lite::future::block_on(executor.run(futures_lite::future::zip(
        runtime.run(&executor),
        drill(inbox, countdown_secs),
    )));

    // ── 5. Report ─────────────────────────────────────────────
    let service = runtime.service();
    info!("Final state: {}", service.state());
    info!("Haptic patterns played: {:?}", runtime.hw().vibrations());
    for link in service.notification_links() {
        info!("Alert link: {}", link);
    }
    for link in service.dial_links() {
        info!("Call link: {}", link);
    }
    for helpline in helplines_by_category(HelplineCategory::Women) {
        info!(
            "Helpline: {} {} | {}",
            helpline.name,
            dial_intent(helpline.number),
            helpline.description
        );
    }
    info!("Nearby police: {}", nearby_search_link(Nearby::Police, DRILL_CITY));
    info!("Share: {}", share_fallback_text(&share_payload(DRILL_SHARE_URL)));
    info!("Evidence vault: {} item(s)", service.vault().len());
    for artifact in service.vault().iter() {
        info!(
            "  {} | {:?} | {} bytes | {}",
            artifact.id,
            artifact.kind,
            artifact.media.len(),
            export_file_name(artifact)
        );
    }
    Ok(())
}
