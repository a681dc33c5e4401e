//! Concrete state handler functions and table builder.
//!
//! Each state is defined by three plain `fn` pointers: no closures, no
//! dynamic dispatch, no heap.
//!
//! ```text
//!  IDLE ──[Start]──▶ COUNTING_DOWN(n) ──[Tick]──▶ COUNTING_DOWN(n-1)
//!    │                     │    │
//!    │                 [Cancel] └──[Elapsed at 0 | Bypass]──▶ ACTIVE
//!    │                     ▼                                   │
//!    │◀───────────────── IDLE ◀────────────[Cancel]────────────┘
//!    └──[Bypass]────────────────────────────────────────────▶ ACTIVE
//! ```

use super::context::{FsmContext, Stimulus};
use super::{StateDescriptor, StateId};
use crate::drivers::trigger::TriggerKind;
use log::{debug, info};

/// Short pulse acknowledging the countdown start.
pub const HAPTIC_COUNTDOWN: [u16; 1] = [50];
/// Covert confirmation that the alert went active in silent mode.
pub const HAPTIC_SILENT_ACTIVE: [u16; 3] = [200, 100, 200];

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: Some(idle_exit),
            on_update: idle_update,
        },
        // Index 1: CountingDown
        StateDescriptor {
            id: StateId::CountingDown,
            name: "CountingDown",
            on_enter: Some(countdown_enter),
            on_exit: Some(countdown_exit),
            on_update: countdown_update,
        },
        // Index 2: Active
        StateDescriptor {
            id: StateId::Active,
            name: "Active",
            on_enter: Some(active_enter),
            on_exit: Some(active_exit),
            on_update: active_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut FsmContext) {
    ctx.remaining = 0;
    ctx.clear_advisories();
    info!("IDLE: standing by");
}

fn idle_exit(ctx: &mut FsmContext) {
    ctx.session = ctx.session.wrapping_add(1);
    debug!("IDLE: opening session {}", ctx.session);
}

fn idle_update(ctx: &mut FsmContext) -> Option<StateId> {
    match ctx.stimulus {
        Stimulus::Trigger(TriggerKind::Start) => Some(StateId::CountingDown),
        Stimulus::Trigger(TriggerKind::Bypass) => {
            info!("IDLE: rapid double activation, skipping countdown");
            Some(StateId::Active)
        }
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  COUNTING_DOWN state: cancellable grace period before the alert fires
// ═══════════════════════════════════════════════════════════════════════════

fn countdown_enter(ctx: &mut FsmContext) {
    ctx.remaining = ctx.settings.countdown_seconds;
    ctx.location_error = None;
    ctx.effects.vibrate(&HAPTIC_COUNTDOWN);
    if ctx.remaining > 0 {
        ctx.effects.arm_countdown = true;
    }
    info!("COUNTING_DOWN: {}s to activation", ctx.remaining);
}

fn countdown_exit(ctx: &mut FsmContext) {
    ctx.remaining = 0;
    ctx.effects.arm_countdown = false;
    ctx.effects.disarm_countdown = true;
}

fn countdown_update(ctx: &mut FsmContext) -> Option<StateId> {
    match ctx.stimulus {
        Stimulus::Tick => {
            ctx.remaining = ctx.remaining.saturating_sub(1);
            debug!("COUNTING_DOWN: {}", ctx.remaining);
            None
        }
        Stimulus::Elapsed if ctx.remaining == 0 => Some(StateId::Active),
        Stimulus::Trigger(TriggerKind::Bypass) => {
            info!("COUNTING_DOWN: bypass with {}s left", ctx.remaining);
            Some(StateId::Active)
        }
        Stimulus::Trigger(TriggerKind::Start) => {
            debug!("COUNTING_DOWN: already counting, activation ignored");
            None
        }
        Stimulus::Cancel => {
            info!("COUNTING_DOWN: cancelled with {}s left", ctx.remaining);
            Some(StateId::Idle)
        }
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  ACTIVE state: alert live, subsystems fanned out
// ═══════════════════════════════════════════════════════════════════════════

fn active_enter(ctx: &mut FsmContext) {
    if ctx.settings.silent_mode {
        ctx.effects.vibrate(&HAPTIC_SILENT_ACTIVE);
    }
    if ctx.settings.auto_record {
        ctx.effects.start_recording = true;
    }
    ctx.effects.acquire_location = true;
    info!(
        "ACTIVE: session {} live (silent={}, record={})",
        ctx.session, ctx.settings.silent_mode, ctx.settings.auto_record
    );
}

fn active_exit(ctx: &mut FsmContext) {
    ctx.effects.silence_siren = true;
    ctx.effects.strobe_off = true;
    ctx.effects.stop_recording = true;
    info!("ACTIVE: tearing down session {}", ctx.session);
}

fn active_update(ctx: &mut FsmContext) -> Option<StateId> {
    match ctx.stimulus {
        Stimulus::Cancel => Some(StateId::Idle),
        Stimulus::Trigger(kind) => {
            debug!("ACTIVE: {:?} ignored, alert already live", kind);
            None
        }
        _ => None,
    }
}
