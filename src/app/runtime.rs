//! Async event loop driving the [`AppService`].
//!
//! Single-threaded and cooperative.  The loop owns the service and is the
//! only place it is touched; background work runs as tasks on the same
//! executor and reports back by posting to the inbox.
//!
//! ```text
//!  ┌──────────────────────────────────────────────────────────────┐
//!  │  futures_lite::future::block_on                              │
//!  │  ┌────────────────────────────────────────────────────────┐  │
//!  │  │  edge_executor::LocalExecutor                          │  │
//!  │  │                                                        │  │
//!  │  │  run() ◀── inbox ◀─┬─ countdown_ticker   (owned Task)  │  │
//!  │  │    │               ├─ evidence_collector (owned Task)  │  │
//!  │  │    │               ├─ locate             (detached)    │  │
//!  │  │    │               └─ open_capture       (detached)    │  │
//!  │  │    └──▶ AppService ──▶ Jobs ──▶ spawn / drop tasks     │  │
//!  │  └────────────────────────────────────────────────────────┘  │
//!  └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Periodic tasks are held as `Task` handles and cancelled by dropping
//! them.  One-shot device calls are detached; their results carry the
//! session id and the service ignores them once the session has ended.

use core::time::Duration;
use std::rc::Rc;

use edge_executor::Task;
use log::{debug, info, warn};

use crate::config::{EmergencyConfig, Profile};
use crate::drivers::siren::{SirenSweep, SirenSynthesizer};
use crate::events::{Executor, Inbox, Input};
use crate::sensors::LocationAcquirer;

use super::ports::{
    AudioPort, CaptureConstraints, CapturePort, EventSink, HapticPort, LocationPort, ProfileStore,
    TimePort,
};
use super::service::{AppService, Job};

/// Platform devices handed to the runtime.
///
/// `hw` answers synchronously and is used in place.  The others are
/// shared with background tasks.
pub struct Devices<D, L, C, A> {
    pub hw: D,
    pub location: Rc<L>,
    pub capture: Rc<C>,
    pub audio: Rc<A>,
}

pub struct EmergencyRuntime<D, L, C, A, P, E>
where
    C: CapturePort,
    A: AudioPort,
{
    service: AppService<C::Stream>,
    config: EmergencyConfig,
    inbox: Rc<Inbox<C::Stream>>,
    hw: D,
    location: Rc<L>,
    capture: Rc<C>,
    siren: SirenSynthesizer<A>,
    store: P,
    sink: E,
    countdown: Option<Task<()>>,
    collector: Option<Task<()>>,
}

impl<D, L, C, A, P, E> EmergencyRuntime<D, L, C, A, P, E>
where
    D: HapticPort + TimePort,
    L: LocationPort + 'static,
    C: CapturePort + 'static,
    C::Stream: 'static,
    A: AudioPort + 'static,
    P: ProfileStore,
    E: EventSink,
{
    /// Load the profile and wire up the service.  A profile that cannot
    /// be read falls back to first-run defaults.
    pub fn new(devices: Devices<D, L, C, A>, store: P, sink: E, config: EmergencyConfig) -> Self {
        let profile = store.load().unwrap_or_else(|e| {
            warn!("Profile load failed ({}), using defaults", e);
            Profile::default()
        });
        let Devices {
            hw,
            location,
            capture,
            audio,
        } = devices;

        Self {
            service: AppService::new(profile, &config),
            siren: SirenSynthesizer::new(audio, SirenSweep::from_config(&config)),
            config,
            inbox: Rc::new(Inbox::new()),
            hw,
            location,
            capture,
            store,
            sink,
            countdown: None,
            collector: None,
        }
    }

    /// Producer handle for UI commands.
    pub fn inbox(&self) -> Rc<Inbox<C::Stream>> {
        self.inbox.clone()
    }

    pub fn service(&self) -> &AppService<C::Stream> {
        &self.service
    }

    pub fn hw(&self) -> &D {
        &self.hw
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    /// Process inputs until [`Input::Shutdown`] arrives.
    pub async fn run(&mut self, executor: &Executor<'_>) {
        self.service.start(&mut self.sink);
        loop {
            let input = self.inbox.receive().await;
            debug!("Runtime input: {}", input.name());
            if !self.process(input, executor) {
                break;
            }
        }
        self.shutdown();
    }

    // ── Input handling ────────────────────────────────────────

    /// Handle one input to completion.  Returns `false` on shutdown.
    fn process(&mut self, input: Input<C::Stream>, executor: &Executor<'_>) -> bool {
        let jobs = match input {
            Input::Command(cmd) => self.service.handle_command(cmd, &mut self.hw, &mut self.sink),
            Input::Tick { session } => {
                self.service
                    .countdown_tick(session, &mut self.hw, &mut self.sink)
            }
            Input::LocationSettled { session, result } => {
                self.service.location_settled(session, result, &mut self.sink);
                return true;
            }
            Input::CaptureOpened { session, result } => {
                self.service.capture_opened(session, result, &mut self.sink)
            }
            Input::Collect { session } => {
                self.service.collect_evidence(session);
                return true;
            }
            Input::Shutdown => return false,
        };

        for job in jobs {
            self.run_job(job, executor);
        }
        true
    }

    fn run_job(&mut self, job: Job, executor: &Executor<'_>) {
        debug!("Job: {:?}", job);
        match job {
            Job::ArmCountdown { session } => {
                let period = Duration::from_millis(self.config.tick_interval_ms);
                self.countdown = Some(executor.spawn(countdown_ticker(
                    self.inbox.clone(),
                    session,
                    period,
                )));
            }
            Job::DisarmCountdown => {
                self.countdown = None;
            }
            Job::AcquireLocation { session } => {
                executor
                    .spawn(locate(
                        self.location.clone(),
                        self.inbox.clone(),
                        session,
                        self.config.location_timeout_ms,
                    ))
                    .detach();
            }
            Job::OpenCapture { session } => {
                executor
                    .spawn(open_capture(self.capture.clone(), self.inbox.clone(), session))
                    .detach();
            }
            Job::StartCollecting { session } => {
                let period = Duration::from_millis(self.config.evidence_timeslice_ms);
                self.collector = Some(executor.spawn(evidence_collector(
                    self.inbox.clone(),
                    session,
                    period,
                )));
            }
            Job::StopCollecting => {
                self.collector = None;
            }
            Job::ToggleSiren => {
                let running = self.siren.toggle(executor);
                self.service
                    .siren_report(running, self.siren.is_degraded(), &mut self.sink);
            }
            Job::SilenceSiren => {
                self.siren.stop();
                self.service.siren_report(false, false, &mut self.sink);
            }
            Job::PersistProfile => {
                self.service.flush_profile(&mut self.store, &mut self.sink);
            }
        }
    }

    fn shutdown(&mut self) {
        self.countdown = None;
        self.collector = None;
        self.siren.stop();
        self.service.siren_report(false, false, &mut self.sink);
        self.service.flush_profile(&mut self.store, &mut self.sink);
        info!("Runtime stopped in {}", self.service.state());
    }
}

// ── Background tasks ─────────────────────────────────────────

/// Post one tick per period until dropped.
async fn countdown_ticker<S>(inbox: Rc<Inbox<S>>, session: u32, period: Duration) {
    loop {
        async_io_mini::Timer::after(period).await;
        inbox.send(Input::Tick { session }).await;
    }
}

/// Ask the recorder to drain its stream once per timeslice until dropped.
async fn evidence_collector<S>(inbox: Rc<Inbox<S>>, session: u32, period: Duration) {
    loop {
        async_io_mini::Timer::after(period).await;
        inbox.send(Input::Collect { session }).await;
    }
}

async fn locate<L: LocationPort, S>(location: Rc<L>, inbox: Rc<Inbox<S>>, session: u32, timeout_ms: u64) {
    let result = LocationAcquirer::new(timeout_ms).acquire(&*location).await;
    inbox.send(Input::LocationSettled { session, result }).await;
}

async fn open_capture<C: CapturePort>(capture: Rc<C>, inbox: Rc<Inbox<C::Stream>>, session: u32) {
    let result = capture.open(&CaptureConstraints::EVIDENCE).await;
    inbox.send(Input::CaptureOpened { session, result }).await;
}
