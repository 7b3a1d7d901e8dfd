//! Print-session state handlers and table builder.
//!
//! Each state is defined by three plain `fn` pointers (no closures, no
//! dynamic dispatch, no heap).
//!
//! ```text
//!  IDLE ──[start]──▶ HOMING ──[homed]──▶ EXPOSING ◀──────────┐
//!    ▲                                      │                 │
//!    │                               [deadline elapsed]       │
//!    │                                      ▼                 │
//!    │                                   LIFTING ──[more]─────┘
//!    │                                      │
//!    │                                   [last]
//!    │                                      ▼
//!    └──────────[at end]─────────────── FINISHING
//!
//!  Homing…Lifting ──[cancel]──▶ CANCELLED ──▶ IDLE
//!  any active state ──[fault]──▶ ERRORED ──▶ IDLE
//! ```
//!
//! Axis work is requested through [`ActuatorCommands::action`] and its
//! result comes back in [`SessionContext::motion_result`] on the next tick.

use log::{info, warn};

use super::context::{ActuatorCommands, AxisAction, SessionContext};
use super::{StateDescriptor, StateId};
use crate::app::events::JobOutcome;

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
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1: Homing
        StateDescriptor {
            id: StateId::Homing,
            name: "Homing",
            on_enter: Some(homing_enter),
            on_exit: None,
            on_update: homing_update,
        },
        // Index 2: Exposing
        StateDescriptor {
            id: StateId::Exposing,
            name: "Exposing",
            on_enter: Some(exposing_enter),
            on_exit: Some(exposing_exit),
            on_update: exposing_update,
        },
        // Index 3: Lifting
        StateDescriptor {
            id: StateId::Lifting,
            name: "Lifting",
            on_enter: Some(lifting_enter),
            on_exit: None,
            on_update: lifting_update,
        },
        // Index 4: Finishing
        StateDescriptor {
            id: StateId::Finishing,
            name: "Finishing",
            on_enter: Some(finishing_enter),
            on_exit: None,
            on_update: finishing_update,
        },
        // Index 5: Cancelled
        StateDescriptor {
            id: StateId::Cancelled,
            name: "Cancelled",
            on_enter: Some(cancelled_enter),
            on_exit: None,
            on_update: terminal_update,
        },
        // Index 6: Errored
        StateDescriptor {
            id: StateId::Errored,
            name: "Errored",
            on_enter: Some(errored_enter),
            on_exit: None,
            on_update: terminal_update,
        },
    ]
}

/// Consume the pending motion result, routing failures to `Errored`.
/// `None` while the action has not run yet.
fn take_motion(ctx: &mut SessionContext) -> Option<Result<(), StateId>> {
    match ctx.motion_result.take()? {
        Ok(()) => Some(Ok(())),
        Err(e) => {
            ctx.fault = Some(e);
            Some(Err(StateId::Errored))
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut SessionContext) {
    ctx.commands = ActuatorCommands::all_off();
    ctx.exposure = None;
    ctx.motion_result = None;
}

fn idle_update(_ctx: &mut SessionContext) -> Option<StateId> {
    // Left only through `PrintService::start`.
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  HOMING
// ═══════════════════════════════════════════════════════════════════════════

fn homing_enter(ctx: &mut SessionContext) {
    ctx.commands.uv_on = false;
    ctx.commands.action = Some(AxisAction::Home);
    info!("HOMING: {} layers queued", ctx.total_layers);
}

fn homing_update(ctx: &mut SessionContext) -> Option<StateId> {
    if ctx.has_fault() {
        return Some(StateId::Errored);
    }
    match take_motion(ctx)? {
        Ok(()) => Some(StateId::Exposing),
        Err(next) => Some(next),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  EXPOSING: image projected, UV on, waiting for the deadline
// ═══════════════════════════════════════════════════════════════════════════

fn exposing_enter(ctx: &mut SessionContext) {
    ctx.exposure = None;
    ctx.commands.uv_on = true;
    ctx.commands.action = Some(AxisAction::BeginLayer(ctx.current_layer));
}

fn exposing_exit(ctx: &mut SessionContext) {
    ctx.commands.uv_on = false;
}

fn exposing_update(ctx: &mut SessionContext) -> Option<StateId> {
    if ctx.has_fault() {
        return Some(StateId::Errored);
    }
    match ctx.exposure {
        Some(e) if e.is_elapsed(ctx.now_ms) => Some(StateId::Lifting),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  LIFTING: UV off, lift, retract
// ═══════════════════════════════════════════════════════════════════════════

fn lifting_enter(ctx: &mut SessionContext) {
    ctx.commands.uv_on = false;
    ctx.commands.action = Some(AxisAction::CompleteLayer);
}

fn lifting_update(ctx: &mut SessionContext) -> Option<StateId> {
    if ctx.has_fault() {
        return Some(StateId::Errored);
    }
    if let Err(next) = take_motion(ctx)? {
        return Some(next);
    }
    ctx.current_layer += 1;
    if ctx.current_layer >= ctx.total_layers {
        Some(StateId::Finishing)
    } else {
        Some(StateId::Exposing)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  FINISHING: platform to the END switch
// ═══════════════════════════════════════════════════════════════════════════

fn finishing_enter(ctx: &mut SessionContext) {
    ctx.commands.uv_on = false;
    ctx.commands.action = Some(AxisAction::GoToEnd);
    info!("FINISHING: all {} layers exposed", ctx.total_layers);
}

fn finishing_update(ctx: &mut SessionContext) -> Option<StateId> {
    if ctx.has_fault() {
        return Some(StateId::Errored);
    }
    if let Err(next) = take_motion(ctx)? {
        return Some(next);
    }
    ctx.outcome = Some(JobOutcome::Completed {
        layers: ctx.total_layers,
    });
    Some(StateId::Idle)
}

// ═══════════════════════════════════════════════════════════════════════════
//  CANCELLED / ERRORED: UV off, nothing pending, back to Idle
// ═══════════════════════════════════════════════════════════════════════════

fn cancelled_enter(ctx: &mut SessionContext) {
    ctx.commands = ActuatorCommands::all_off();
    ctx.outcome = Some(JobOutcome::Cancelled {
        layer: ctx.current_layer,
    });
    info!("CANCELLED at layer {}", ctx.current_layer + 1);
}

fn errored_enter(ctx: &mut SessionContext) {
    ctx.commands = ActuatorCommands::all_off();
    match ctx.fault.take() {
        Some(error) => {
            warn!("ERRORED at layer {}: {}", ctx.current_layer + 1, error);
            ctx.outcome = Some(JobOutcome::Failed {
                layer: ctx.current_layer,
                error,
            });
        }
        None => warn!("ERRORED without a recorded fault"),
    }
}

fn terminal_update(_ctx: &mut SessionContext) -> Option<StateId> {
    Some(StateId::Idle)
}
