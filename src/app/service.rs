//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the FSM, trigger detector, evidence recorder and
//! vault, and the user's profile.  It is synchronous: every entry point
//! processes one input to completion and returns the background [`Job`]s
//! the runtime must start or stop.  Device I/O that completes immediately
//! (haptics, clocks, event emission) flows through port traits injected at
//! call sites, which keeps the whole service testable with mock adapters.
//!
//! ```text
//!   AppCommand ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!   Tick/Result ──▶│        AppService        │ ──▶ HapticPort
//!                  │ Trigger · FSM · Recorder │
//!        Jobs  ◀───└──────────────────────────┘ ◀── TimePort
//! ```
//!
//! Async results (ticks, position fixes, capture streams) carry the
//! session id they were started for.  Anything tagged with a session that
//! is no longer live is dropped without touching state.

use log::{debug, info, warn};

use crate::config::{EmergencyConfig, Profile, UserSettings, validate_profile};
use crate::directory::{Contact, ContactBook};
use crate::drivers::recorder::{EvidenceArtifact, EvidenceRecorder, EvidenceVault, OpenOutcome};
use crate::drivers::strobe::{Rgb, StrobePattern};
use crate::drivers::trigger::TriggerDetector;
use crate::error::{LocationError, ProfileError, RecordingError};
use crate::fsm::context::{FsmContext, SideEffects, Stimulus};
use crate::fsm::states::build_state_table;
use crate::fsm::{EmergencyState, Fsm, StateId};
use crate::outreach;
use crate::sensors::LocationFix;

use super::commands::AppCommand;
use super::events::{Advisory, AppEvent};
use super::ports::{CaptureStream, EventSink, HapticPort, ProfileStore, TimePort};

// ───────────────────────────────────────────────────────────────
// Jobs
// ───────────────────────────────────────────────────────────────

/// Background work requested of the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    /// Start the periodic countdown ticker.
    ArmCountdown { session: u32 },
    /// Stop the countdown ticker.
    DisarmCountdown,
    /// Run one position query and report back.
    AcquireLocation { session: u32 },
    /// Open the capture device and report back.
    OpenCapture { session: u32 },
    /// Periodically drain capture data into the recorder.
    StartCollecting { session: u32 },
    StopCollecting,
    ToggleSiren,
    /// Stop the siren if it is sounding.
    SilenceSiren,
    /// The profile changed and should be written back.
    PersistProfile,
}

/// Upper bound on jobs produced by a single input.
pub const MAX_JOBS: usize = 8;

pub type Jobs = heapless::Vec<Job, MAX_JOBS>;

fn push_job(jobs: &mut Jobs, job: Job) {
    if jobs.push(job).is_err() {
        warn!("Job queue full, dropping {:?}", job);
    }
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService<S: CaptureStream> {
    fsm: Fsm,
    ctx: FsmContext,
    trigger: TriggerDetector,
    recorder: EvidenceRecorder<S>,
    vault: EvidenceVault,
    contacts: Vec<Contact>,
    siren_on: bool,
    strobe: StrobePattern,
    profile_dirty: bool,
}

impl<S: CaptureStream> AppService<S> {
    /// Construct the service from the stored profile and timing config.
    ///
    /// Does **not** start the FSM; call [`start`](Self::start) next.
    pub fn new(profile: Profile, config: &EmergencyConfig) -> Self {
        let Profile { contacts, settings } = profile;
        Self {
            fsm: Fsm::new(build_state_table(), StateId::Idle),
            ctx: FsmContext::new(settings),
            trigger: TriggerDetector::new(config.bypass_window_ms),
            recorder: EvidenceRecorder::new(),
            vault: EvidenceVault::new(),
            contacts,
            siren_on: false,
            strobe: StrobePattern::new(),
            profile_dirty: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        self.ctx.effects.take();
        sink.emit(&AppEvent::Started(self.state()));
        info!("AppService started in {}", self.state());
    }

    // ── Command handling ──────────────────────────────────────

    /// Process one user command.
    ///
    /// The `hw` parameter satisfies **both** [`HapticPort`] and
    /// [`TimePort`]: activations are timestamped and may vibrate.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        hw: &mut (impl HapticPort + TimePort),
        sink: &mut impl EventSink,
    ) -> Jobs {
        let mut jobs = Jobs::new();
        match cmd {
            AppCommand::Activate => {
                let kind = self.trigger.classify(hw.monotonic_ms());
                sink.emit(&AppEvent::Triggered(kind));
                self.dispatch(Stimulus::Trigger(kind), hw, sink, &mut jobs);
            }
            AppCommand::Cancel => {
                self.dispatch(Stimulus::Cancel, hw, sink, &mut jobs);
            }
            // Silent mode only refuses switching on; a running siren or
            // strobe can always be switched off.
            AppCommand::ToggleSiren => {
                if self.ctx.settings.silent_mode && !self.siren_on {
                    info!("Siren refused: silent mode");
                    sink.emit(&AppEvent::Advisory(Advisory::SilentModeActive));
                } else {
                    push_job(&mut jobs, Job::ToggleSiren);
                }
            }
            AppCommand::ToggleStrobe => {
                if self.ctx.settings.silent_mode && !self.strobe.is_active() {
                    info!("Strobe refused: silent mode");
                    sink.emit(&AppEvent::Advisory(Advisory::SilentModeActive));
                } else {
                    self.set_strobe(!self.strobe.is_active(), sink);
                }
            }
            AppCommand::UpdateSettings(settings) => {
                self.update_settings(settings, sink, &mut jobs);
            }
            AppCommand::AddContact { name, phone } => {
                let added = ContactBook::new(&mut self.contacts).add(&name, &phone, hw.epoch_ms());
                if let Some(id) = added {
                    info!("Contact {} added", id);
                    self.contacts_changed(sink, &mut jobs);
                } else {
                    debug!("Blank contact ignored");
                }
            }
            AppCommand::RemoveContact(id) => {
                if ContactBook::new(&mut self.contacts).remove(&id) {
                    info!("Contact {} removed", id);
                    self.contacts_changed(sink, &mut jobs);
                }
            }
            AppCommand::DeleteEvidence(id) => {
                if self.vault.remove(&id).is_some() {
                    info!("Evidence {} deleted", id);
                }
            }
        }
        jobs
    }

    // ── Async results ─────────────────────────────────────────

    /// One countdown period elapsed for `session`.
    pub fn countdown_tick(
        &mut self,
        session: u32,
        hw: &mut (impl HapticPort + TimePort),
        sink: &mut impl EventSink,
    ) -> Jobs {
        let mut jobs = Jobs::new();
        if self.is_live(session) && self.fsm.current_state() == StateId::CountingDown {
            self.dispatch(Stimulus::Tick, hw, sink, &mut jobs);
        } else {
            debug!("Stale tick for session {} discarded", session);
        }
        jobs
    }

    /// The position query for `session` settled.
    pub fn location_settled(
        &mut self,
        session: u32,
        result: Result<LocationFix, LocationError>,
        sink: &mut impl EventSink,
    ) {
        if !self.is_live(session) || self.fsm.current_state() != StateId::Active {
            debug!("Late location result for session {} discarded", session);
            return;
        }
        match result {
            Ok(fix) => {
                info!("Location locked: {}", fix.map_link);
                sink.emit(&AppEvent::LocationLocked(fix.clone()));
                self.ctx.location = Some(fix);
                self.ctx.location_error = None;
            }
            Err(e) => {
                warn!("Location unavailable: {}", e);
                self.ctx.location_error = Some(e);
                sink.emit(&AppEvent::LocationFailed(e));
            }
        }
    }

    /// The capture device requested for `session` answered.
    pub fn capture_opened(
        &mut self,
        session: u32,
        result: Result<S, RecordingError>,
        sink: &mut impl EventSink,
    ) -> Jobs {
        let mut jobs = Jobs::new();
        match self.recorder.opened(session, result) {
            OpenOutcome::Started { has_video } => {
                self.ctx.recording_error = None;
                sink.emit(&AppEvent::RecordingStarted { has_video });
                push_job(&mut jobs, Job::StartCollecting { session });
            }
            OpenOutcome::Failed(e) => {
                self.ctx.recording_error = Some(e);
                sink.emit(&AppEvent::RecordingFailed(e));
            }
            OpenOutcome::Discarded => {}
        }
        jobs
    }

    /// Drain buffered capture data for `session`.
    pub fn collect_evidence(&mut self, session: u32) {
        if self.recorder.session() == Some(session) {
            let n = self.recorder.collect();
            if n > 0 {
                debug!("Collected {} bytes of evidence", n);
            }
        }
    }

    /// The runtime toggled or silenced the siren.
    pub fn siren_report(&mut self, running: bool, degraded: bool, sink: &mut impl EventSink) {
        if degraded {
            sink.emit(&AppEvent::Advisory(Advisory::AudioUnavailable));
        }
        if running != self.siren_on {
            self.siren_on = running;
            sink.emit(&AppEvent::SirenChanged(running));
        }
    }

    // ── Profile persistence ───────────────────────────────────

    /// Write the profile back if it changed.  Returns `true` on a write.
    pub fn flush_profile(&mut self, store: &mut impl ProfileStore, sink: &mut impl EventSink) -> bool {
        if !self.profile_dirty {
            return false;
        }
        match store.save(&self.profile()) {
            Ok(()) => {
                self.profile_dirty = false;
                info!("Profile saved");
                true
            }
            Err(e) => {
                warn!("Profile save failed: {}", e);
                sink.emit(&AppEvent::Advisory(Advisory::ProfileNotSaved));
                false
            }
        }
    }

    pub fn is_profile_dirty(&self) -> bool {
        self.profile_dirty
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current observable lifecycle state.
    pub fn state(&self) -> EmergencyState {
        match self.fsm.current_state() {
            StateId::Idle => EmergencyState::Idle,
            StateId::CountingDown => EmergencyState::CountingDown(self.ctx.remaining),
            StateId::Active => EmergencyState::Active,
        }
    }

    /// Id of the most recent session (0 before the first activation).
    pub fn session(&self) -> u32 {
        self.ctx.session
    }

    pub fn location(&self) -> Option<&LocationFix> {
        self.ctx.location.as_ref()
    }

    pub fn location_error(&self) -> Option<LocationError> {
        self.ctx.location_error
    }

    /// Advisory text for the location banner, if acquisition failed.
    pub fn location_advisory(&self) -> Option<String> {
        self.ctx
            .location_error
            .map(|e| format!("location unavailable: {}", e.message()))
    }

    pub fn recording_error(&self) -> Option<RecordingError> {
        self.ctx.recording_error
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    pub fn siren_on(&self) -> bool {
        self.siren_on
    }

    pub fn strobe_on(&self) -> bool {
        self.strobe.is_active()
    }

    /// Advance the strobe animation and return the colour to paint.
    pub fn strobe_frame(&mut self, delta_ms: u32) -> Rgb {
        self.strobe.tick(delta_ms)
    }

    pub fn settings(&self) -> &UserSettings {
        &self.ctx.settings
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn vault(&self) -> &EvidenceVault {
        &self.vault
    }

    /// Snapshot of contacts and settings as persisted.
    pub fn profile(&self) -> Profile {
        Profile {
            contacts: self.contacts.clone(),
            settings: self.ctx.settings.clone(),
        }
    }

    /// WhatsApp links for every messaging-capable contact, carrying the
    /// configured message and the live location (or the placeholder).
    pub fn notification_links(&self) -> Vec<String> {
        let message = &self.ctx.settings.emergency_message;
        let location = self.ctx.location.as_ref();
        self.contacts
            .iter()
            .filter(|c| c.is_whats_app)
            .map(|c| outreach::whatsapp_link(c, message, location))
            .collect()
    }

    /// `tel:` intents for every contact, in list order.
    pub fn dial_links(&self) -> Vec<String> {
        self.contacts
            .iter()
            .map(|c| outreach::dial_intent(&c.phone))
            .collect()
    }

    // ── Internal ──────────────────────────────────────────────

    fn is_live(&self, session: u32) -> bool {
        session == self.ctx.session
    }

    /// Run one stimulus through the FSM, then settle: a countdown sitting
    /// at zero promotes to Active in a separate step so observers see
    /// `CountingDown(0)` before `Active`.
    fn dispatch(
        &mut self,
        stimulus: Stimulus,
        hw: &mut (impl HapticPort + TimePort),
        sink: &mut impl EventSink,
        jobs: &mut Jobs,
    ) {
        self.step(stimulus, hw, sink, jobs);
        if self.state() == EmergencyState::CountingDown(0) {
            self.step(Stimulus::Elapsed, hw, sink, jobs);
        }
    }

    fn step(
        &mut self,
        stimulus: Stimulus,
        hw: &mut (impl HapticPort + TimePort),
        sink: &mut impl EventSink,
        jobs: &mut Jobs,
    ) {
        let from = self.state();
        self.ctx.stimulus = stimulus;
        self.fsm.dispatch(&mut self.ctx);
        self.ctx.stimulus = Stimulus::None;

        let to = self.state();
        if from != to {
            sink.emit(&AppEvent::StateChanged { from, to });
        }

        let effects = self.ctx.effects.take();
        self.apply_effects(effects, hw, sink, jobs);
    }

    /// Translate FSM side-effect requests into port calls and jobs.
    fn apply_effects(
        &mut self,
        fx: SideEffects,
        hw: &mut (impl HapticPort + TimePort),
        sink: &mut impl EventSink,
        jobs: &mut Jobs,
    ) {
        let session = self.ctx.session;

        // ── Haptics ──────────────────────────────────────────
        if !fx.haptic.is_empty() {
            hw.vibrate(&fx.haptic);
        }

        // ── Countdown ticker ─────────────────────────────────
        if fx.disarm_countdown {
            push_job(jobs, Job::DisarmCountdown);
        }
        if fx.arm_countdown {
            push_job(jobs, Job::ArmCountdown { session });
        }

        // ── Teardown ─────────────────────────────────────────
        if fx.silence_siren {
            push_job(jobs, Job::SilenceSiren);
        }
        if fx.strobe_off {
            self.set_strobe(false, sink);
        }
        if fx.stop_recording {
            if let Some(artifact) = self.recorder.finish(hw.epoch_ms()) {
                self.save_artifact(artifact, sink);
            }
            push_job(jobs, Job::StopCollecting);
        }

        // ── Fan-out ──────────────────────────────────────────
        if fx.acquire_location {
            push_job(jobs, Job::AcquireLocation { session });
        }
        if fx.start_recording && self.recorder.begin(session) {
            push_job(jobs, Job::OpenCapture { session });
        }
    }

    fn save_artifact(&mut self, artifact: EvidenceArtifact, sink: &mut impl EventSink) {
        let saved = self.vault.push(artifact);
        info!("Evidence {} saved ({} bytes)", saved.id, saved.media.len());
        sink.emit(&AppEvent::EvidenceSaved {
            id: saved.id.clone(),
            bytes: saved.media.len(),
            kind: saved.kind,
        });
    }

    fn set_strobe(&mut self, on: bool, sink: &mut impl EventSink) {
        if self.strobe.is_active() != on {
            self.strobe.set_active(on);
            sink.emit(&AppEvent::StrobeChanged(on));
        }
    }

    fn update_settings(&mut self, settings: UserSettings, sink: &mut impl EventSink, jobs: &mut Jobs) {
        let candidate = Profile {
            contacts: self.contacts.clone(),
            settings,
        };
        match validate_profile(&candidate) {
            Ok(()) => {
                self.ctx.settings = candidate.settings;
                self.profile_dirty = true;
                push_job(jobs, Job::PersistProfile);
                info!("Settings updated");
            }
            Err(ProfileError::ValidationFailed(reason)) => {
                warn!("Settings rejected: {}", reason);
                sink.emit(&AppEvent::Advisory(Advisory::SettingsRejected(reason)));
            }
            Err(e) => warn!("Settings rejected: {}", e),
        }
    }

    fn contacts_changed(&mut self, sink: &mut impl EventSink, jobs: &mut Jobs) {
        self.profile_dirty = true;
        push_job(jobs, Job::PersistProfile);
        sink.emit(&AppEvent::ContactsChanged(self.contacts.len()));
    }
}
