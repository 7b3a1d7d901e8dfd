//! Function-pointer finite state machine for the print session.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  StateTable                                                 │
//! │  ┌───────────┬───────────┬──────────┬───────────────────┐   │
//! │  │ StateId   │ on_enter  │ on_exit  │ on_update         │   │
//! │  ├───────────┼───────────┼──────────┼───────────────────┤   │
//! │  │ Idle      │ fn(ctx)   │ -        │ fn(ctx)->Option<> │   │
//! │  │ Homing    │ fn(ctx)   │ -        │ fn(ctx)->Option<> │   │
//! │  │ Exposing  │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │   │
//! │  │ Lifting   │ fn(ctx)   │ -        │ fn(ctx)->Option<> │   │
//! │  │ Finishing │ fn(ctx)   │ -        │ fn(ctx)->Option<> │   │
//! │  │ Cancelled │ fn(ctx)   │ -        │ fn(ctx)->Option<> │   │
//! │  │ Errored   │ fn(ctx)   │ -        │ fn(ctx)->Option<> │   │
//! │  └───────────┴───────────┴──────────┴───────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! A tick runs the active row's `on_update`.  A `Some(next)` result
//! leaves the row through `on_exit` and enters `next` through its
//! `on_enter`.  Handlers only touch the [`SessionContext`] blackboard;
//! the service turns what they leave there into pin activity.

pub mod context;
pub mod states;

use context::SessionContext;
use log::debug;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Idle = 0,
    Homing = 1,
    Exposing = 2,
    Lifting = 3,
    Finishing = 4,
    Cancelled = 5,
    Errored = 6,
}

impl StateId {
    pub const COUNT: usize = 7;

    /// Convert an index back to `StateId`.  Out-of-range asserts in debug
    /// builds and maps to `Errored` in release.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::Homing,
            2 => Self::Exposing,
            3 => Self::Lifting,
            4 => Self::Finishing,
            5 => Self::Cancelled,
            6 => Self::Errored,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Errored
            }
        }
    }

    /// A job owns the axis in this state.
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// `cancel()` is honoured here.
    pub fn is_cancellable(self) -> bool {
        matches!(self, Self::Homing | Self::Exposing | Self::Lifting)
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// `on_enter` / `on_exit`: run exactly once per transition.
pub type StateActionFn = fn(&mut SessionContext);

/// Per-tick handler.  `Some(next)` triggers a transition.
pub type StateUpdateFn = fn(&mut SessionContext) -> Option<StateId>;

/// One row of the state table.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    active: usize,
    ticks: u64,
    entered_at: u64,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            active: initial as usize,
            ticks: 0,
            entered_at: 0,
        }
    }

    /// Enter the initial row.  Once, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut SessionContext) {
        let row = &self.table[self.active];
        debug!("Session FSM entering {}", row.name);
        if let Some(enter) = row.on_enter {
            enter(ctx);
        }
    }

    pub fn tick(&mut self, ctx: &mut SessionContext) {
        self.ticks += 1;
        ctx.total_ticks = self.ticks;
        ctx.ticks_in_state = self.ticks - self.entered_at;

        if let Some(next) = (self.table[self.active].on_update)(ctx) {
            self.transition(next, ctx);
        }
    }

    /// Transition immediately, regardless of `on_update` (start, cancel,
    /// emergency stop, actuator faults).
    pub fn force_transition(&mut self, next: StateId, ctx: &mut SessionContext) {
        if next as usize != self.active {
            self.transition(next, ctx);
        }
    }

    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.active)
    }

    pub fn state_name(&self) -> &'static str {
        self.table[self.active].name
    }

    pub fn ticks_in_current_state(&self) -> u64 {
        self.ticks - self.entered_at
    }

    fn transition(&mut self, next: StateId, ctx: &mut SessionContext) {
        let from = &self.table[self.active];
        let to = next as usize;
        debug!("Session FSM {} -> {}", from.name, self.table[to].name);

        if let Some(exit) = from.on_exit {
            exit(ctx);
        }
        self.active = to;
        self.entered_at = self.ticks;
        ctx.ticks_in_state = 0;

        if let Some(enter) = self.table[to].on_enter {
            enter(ctx);
        }
    }
}
