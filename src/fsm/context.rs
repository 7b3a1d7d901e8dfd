//! Shared mutable context threaded through every FSM handler.
//!
//! `SessionContext` is the blackboard the print states read from and write
//! to: job progress, the active exposure, the motion result of the last
//! tick, and the actuator commands the service applies after each tick.
//! Handlers never touch hardware themselves.

use crate::app::events::JobOutcome;
use crate::config::ExposurePlan;
use crate::error::PrintError;
use crate::exposure::LayerExposure;

// ---------------------------------------------------------------------------
// Actuator commands (written by state handlers; consumed by the service)
// ---------------------------------------------------------------------------

/// One axis operation requested by a state handler.  Executed at most once,
/// right after the tick that requested it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisAction {
    /// Seek the HOME switch.
    Home,
    /// Project layer `n` and start its exposure.
    BeginLayer(u32),
    /// UV off, lift, retract.
    CompleteLayer,
    /// Seek the END switch.
    GoToEnd,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActuatorCommands {
    /// Desired UV output.  The service switches UV off before any action
    /// runs whenever this is `false`.
    pub uv_on: bool,
    pub action: Option<AxisAction>,
}

impl ActuatorCommands {
    /// UV off, nothing pending.
    pub fn all_off() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// SessionContext
// ---------------------------------------------------------------------------

pub struct SessionContext {
    // -- Timing --
    pub ticks_in_state: u64,
    pub total_ticks: u64,
    /// Clock reading taken at the start of the current tick.
    pub now_ms: u64,

    // -- Job --
    /// 0-based index of the layer being printed.
    pub current_layer: u32,
    pub total_layers: u32,
    pub plan: ExposurePlan,
    pub exposure: Option<LayerExposure>,

    // -- Actuator outputs --
    pub commands: ActuatorCommands,
    /// Result of the last `Home`, `CompleteLayer` or `GoToEnd` action.
    pub motion_result: Option<Result<(), PrintError>>,

    // -- Termination --
    /// Fatal error that sent the job to `Errored`.
    pub fault: Option<PrintError>,
    /// Set by the terminal states; taken by the service when it finalizes.
    pub outcome: Option<JobOutcome>,
}

impl SessionContext {
    pub fn new(plan: ExposurePlan) -> Self {
        Self {
            ticks_in_state: 0,
            total_ticks: 0,
            now_ms: 0,
            current_layer: 0,
            total_layers: 0,
            plan,
            exposure: None,
            commands: ActuatorCommands::all_off(),
            motion_result: None,
            fault: None,
            outcome: None,
        }
    }

    /// Reset job bookkeeping for a fresh print.
    pub fn begin_job(&mut self, plan: ExposurePlan, total_layers: u32) {
        self.plan = plan;
        self.total_layers = total_layers;
        self.current_layer = 0;
        self.exposure = None;
        self.commands = ActuatorCommands::all_off();
        self.motion_result = None;
        self.fault = None;
        self.outcome = None;
    }

    pub fn has_fault(&self) -> bool {
        self.fault.is_some()
    }

    /// Milliseconds of cure time left on the current layer.
    pub fn exposure_remaining_ms(&self) -> Option<u64> {
        self.exposure.map(|e| e.remaining_ms(self.now_ms))
    }
}
