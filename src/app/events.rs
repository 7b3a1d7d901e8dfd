//! Outbound application events.
//!
//! The [`PrintService`](super::service::PrintService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (log lines, a UI progress bar, ...).

use crate::config::AxisConfig;
use crate::error::PrintError;
use crate::fsm::StateId;

/// How a job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// Every layer exposed and the platform parked at END.
    Completed { layers: u32 },
    /// Stopped by the operator during 0-based `layer`.
    Cancelled { layer: u32 },
    /// A fatal error during 0-based `layer`.
    Failed { layer: u32, error: PrintError },
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// One finished job, as kept in the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobRecord {
    pub outcome: JobOutcome,
    pub total_layers: u32,
    pub elapsed_ms: u64,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A DigitalIO session was bound.
    Connected(AxisConfig),

    /// The DigitalIO session was released.
    Disconnected,

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// A job was accepted.
    JobStarted { total_layers: u32 },

    /// UV went on for a layer.  `current_layer` is 0-based.
    LayerStarted {
        current_layer: u32,
        total_layers: u32,
        exposure_ms: u32,
    },

    /// A job reached a terminal state.
    JobFinished(JobRecord),

    /// The stop token was tripped.
    EmergencyStop,

    /// The latched stop was cleared.
    EmergencyStopReset,
}

/// Point-in-time view of the session for status displays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrintStatus {
    pub state: StateId,
    pub connected: bool,
    /// 1-based layer shown to the operator; 0 when idle.
    pub display_layer: u32,
    pub total_layers: u32,
    pub remaining_layers: u32,
    /// `(current + 1) * 100 / total`, capped at 100; 0 when idle.
    pub percent: u8,
    pub elapsed_ms: u64,
    /// Cure time left on the current layer.
    pub exposure_remaining_ms: Option<u64>,
    pub uv_on: bool,
    pub emergency_stop: bool,
}
