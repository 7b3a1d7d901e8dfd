//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (operator
//! console, UI, another thread) that the
//! [`PrintService`](super::service::PrintService) interprets and acts upon.

use crate::config::ExposurePlan;
use crate::layers::LayerSequence;

#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Begin a job over `layers` using `plan`.
    StartPrint {
        layers: LayerSequence,
        plan: ExposurePlan,
    },

    /// Abandon the running job.  UV off, no move to END.
    Cancel,

    /// Trip the stop token and force UV off.
    EmergencyStop,

    /// Clear a latched emergency stop.
    ResetEmergencyStop,

    /// Manual relative move (idle only).  Positive = up.
    Jog { distance_mm: f64 },

    /// Manual seek to HOME (idle only).
    Home,

    /// Manual seek to END (idle only).
    GoToEnd,

    /// Flip the UV output (idle only).
    ToggleUv,

    /// Log a [`PrintStatus`](super::events::PrintStatus) line.
    ReportStatus,
}
