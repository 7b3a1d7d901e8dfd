//! Application service: the hexagonal core.
//!
//! [`PrintService`] owns the DigitalIO session, the motion controller, the
//! session FSM and the job history.  It exposes a hardware-agnostic API;
//! the clock, projector and event sink are injected at call sites so the
//! whole service runs against mock adapters in tests.
//!
//! ```text
//!      Clock ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                │         PrintService          │
//!  Projector ◀── │  FSM · Motion · Exposure      │
//!                └──────────────┬───────────────┘
//!                               ▼
//!                        Axis<DigitalIo>
//! ```
//!
//! Every tick runs: read clock → FSM tick → apply actuator commands
//! (UV off first, then at most one axis action) → settle terminal states.
//! Cancelled and Errored are passed through to Idle within the same call,
//! with UV forced off on the way.

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::axis::Axis;
use crate::config::{AxisConfig, ExposurePlan, MotionTuning, PrinterConfig};
use crate::diagnostics::JobHistory;
use crate::error::PrintError;
use crate::exposure;
use crate::fsm::context::{AxisAction, SessionContext};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::layers::LayerSequence;
use crate::motion::{MotionController, MotionRequest, StepsCompleted, StopToken};

use super::commands::AppCommand;
use super::events::{AppEvent, JobOutcome, JobRecord, PrintStatus};
use super::ports::{Clock, DigitalIo, EventSink, Projector};

// ───────────────────────────────────────────────────────────────
// PrintService
// ───────────────────────────────────────────────────────────────

pub struct PrintService<D: DigitalIo, T: DelayNs> {
    fsm: Fsm,
    ctx: SessionContext,
    axis: Option<Axis<D>>,
    motion: MotionController<T>,
    stop: StopToken,
    cancel: StopToken,
    sequence: Option<LayerSequence>,
    started_at_ms: Option<u64>,
    history: JobHistory,
}

impl<D: DigitalIo, T: DelayNs> PrintService<D, T> {
    /// Build an idle, disconnected service.  `plan` is the default used by
    /// status queries until a job supplies its own.
    pub fn new(delay: T, tuning: MotionTuning, plan: ExposurePlan) -> Self {
        let stop = StopToken::new();
        let motion = MotionController::new(delay, tuning, stop.clone());
        let mut ctx = SessionContext::new(plan);
        let mut fsm = Fsm::new(build_state_table(), StateId::Idle);
        fsm.start(&mut ctx);

        Self {
            fsm,
            ctx,
            axis: None,
            motion,
            stop,
            cancel: StopToken::new(),
            sequence: None,
            started_at_ms: None,
            history: JobHistory::new(),
        }
    }

    pub fn from_config(delay: T, config: &PrinterConfig) -> Self {
        Self::new(delay, config.motion, config.plan)
    }

    // ── Connection lifecycle ──────────────────────────────────

    /// Bind `io` to `config`: pins configured, UV driven low.
    pub fn connect(
        &mut self,
        io: D,
        config: AxisConfig,
        sink: &mut impl EventSink,
    ) -> Result<(), PrintError> {
        if self.is_job_active() {
            return Err(PrintError::Busy);
        }
        if let Some(old) = self.axis.take() {
            drop(old.release());
            sink.emit(&AppEvent::Disconnected);
        }
        self.axis = Some(Axis::connect(io, config)?);
        sink.emit(&AppEvent::Connected(config));
        Ok(())
    }

    /// Force UV off and release the board handle.  A running job ends as
    /// `Failed(NotConnected)`.
    pub fn disconnect(&mut self, sink: &mut impl EventSink) -> Option<D> {
        if self.is_job_active() {
            self.fail(PrintError::NotConnected, sink);
            self.settle(sink);
        }
        let axis = self.axis.take()?;
        sink.emit(&AppEvent::Disconnected);
        Some(axis.release())
    }

    // ── Job control ───────────────────────────────────────────

    /// Accept a job and enter `Homing`.  The homing move runs on the next
    /// [`tick`](Self::tick).
    pub fn start(
        &mut self,
        layers: LayerSequence,
        plan: ExposurePlan,
        clock: &impl Clock,
        sink: &mut impl EventSink,
    ) -> Result<(), PrintError> {
        if self.is_job_active() {
            return Err(PrintError::Busy);
        }
        if layers.is_empty() {
            return Err(PrintError::NoSequence);
        }
        if self.axis.is_none() {
            return Err(PrintError::NotConnected);
        }
        if self.stop.is_tripped() {
            return Err(PrintError::EmergencyStop);
        }
        plan.validate()?;
        self.motion.tuning().validate()?;
        let total_layers = u32::try_from(layers.len())
            .map_err(|_| PrintError::InvalidConfig("too many layers"))?;

        self.cancel.reset();
        self.ctx.now_ms = clock.now_ms();
        self.ctx.begin_job(plan, total_layers);
        self.sequence = Some(layers);
        self.started_at_ms = Some(self.ctx.now_ms);

        info!("Job started: {} layers", total_layers);
        sink.emit(&AppEvent::JobStarted { total_layers });
        self.force(StateId::Homing, sink);
        Ok(())
    }

    /// Abandon the job: UV off, no move to END, back to Idle.
    ///
    /// Honoured from Homing through Lifting; a no-op when idle or once
    /// the job is already finishing.
    pub fn cancel(&mut self, sink: &mut impl EventSink) -> Option<JobOutcome> {
        self.cancel.reset();
        let state = self.fsm.current_state();
        if !state.is_cancellable() {
            if state.is_active() {
                info!("Cancel ignored in {}", self.fsm.state_name());
            }
            return None;
        }
        self.force(StateId::Cancelled, sink);
        self.settle(sink)
    }

    /// Trip the stop token and force UV off.  A running job ends as
    /// `Failed(EmergencyStop)`.  The stop stays latched until
    /// [`reset_emergency_stop`](Self::reset_emergency_stop).
    pub fn emergency_stop(&mut self, sink: &mut impl EventSink) -> Option<JobOutcome> {
        self.stop.trip();
        warn!("EMERGENCY STOP");
        if let Some(axis) = self.axis.as_mut() {
            axis.force_uv_off("emergency stop");
        }
        sink.emit(&AppEvent::EmergencyStop);

        if !self.is_job_active() {
            return None;
        }
        self.fail(PrintError::EmergencyStop, sink);
        self.settle(sink)
    }

    pub fn reset_emergency_stop(&mut self, sink: &mut impl EventSink) {
        if self.stop.is_tripped() {
            self.stop.reset();
            info!("Emergency stop cleared");
            sink.emit(&AppEvent::EmergencyStopReset);
        }
    }

    // ── Manual controls (idle only) ───────────────────────────

    pub fn jog(&mut self, distance_mm: f64) -> Result<StepsCompleted, PrintError> {
        self.check_manual()?;
        let axis = self.axis.as_mut().ok_or(PrintError::NotConnected)?;
        axis.uv_off()?;
        Ok(self.motion.move_axis(axis, MotionRequest::new(distance_mm))?)
    }

    pub fn home(&mut self) -> Result<(), PrintError> {
        self.check_manual()?;
        let axis = self.axis.as_mut().ok_or(PrintError::NotConnected)?;
        axis.uv_off()?;
        self.motion.home(axis)?;
        Ok(())
    }

    pub fn go_to_end(&mut self) -> Result<(), PrintError> {
        self.check_manual()?;
        let axis = self.axis.as_mut().ok_or(PrintError::NotConnected)?;
        axis.uv_off()?;
        self.motion.go_to_end(axis)?;
        Ok(())
    }

    /// Flip UV.  Returns the new state.  Switching on is refused while the
    /// emergency stop is latched.
    pub fn toggle_uv(&mut self) -> Result<bool, PrintError> {
        if self.is_job_active() {
            return Err(PrintError::Busy);
        }
        let axis = self.axis.as_mut().ok_or(PrintError::NotConnected)?;
        if axis.is_uv_on() {
            axis.uv_off()?;
            Ok(false)
        } else if self.stop.is_tripped() {
            Err(PrintError::EmergencyStop)
        } else {
            axis.uv_on()?;
            Ok(true)
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command.  Returns the job outcome when the
    /// command ended a job.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        clock: &impl Clock,
        sink: &mut impl EventSink,
    ) -> Result<Option<JobOutcome>, PrintError> {
        self.ctx.now_ms = clock.now_ms();
        match cmd {
            AppCommand::StartPrint { layers, plan } => {
                self.start(layers, plan, clock, sink)?;
                Ok(None)
            }
            AppCommand::Cancel => Ok(self.cancel(sink)),
            AppCommand::EmergencyStop => Ok(self.emergency_stop(sink)),
            AppCommand::ResetEmergencyStop => {
                self.reset_emergency_stop(sink);
                Ok(None)
            }
            AppCommand::Jog { distance_mm } => {
                let done = self.jog(distance_mm)?;
                info!(
                    "Jog {:+.3} mm: {}/{} steps",
                    distance_mm, done.steps, done.requested
                );
                Ok(None)
            }
            AppCommand::Home => self.home().map(|()| None),
            AppCommand::GoToEnd => self.go_to_end().map(|()| None),
            AppCommand::ToggleUv => self.toggle_uv().map(|_| None),
            AppCommand::ReportStatus => {
                let s = self.status(clock);
                let limits = match self.axis.as_mut().map(Axis::limits) {
                    Some(Ok(l)) => format!("home={} end={}", l.home_triggered, l.end_triggered),
                    Some(Err(e)) => format!("limits unreadable ({e})"),
                    None => "not connected".to_string(),
                };
                info!(
                    "STATUS | {:?} | layer {}/{} ({}%, {} left) | elapsed {} s | uv={} estop={} | {}",
                    s.state,
                    s.display_layer,
                    s.total_layers,
                    s.percent,
                    s.remaining_layers,
                    s.elapsed_ms / 1000,
                    s.uv_on,
                    s.emergency_stop,
                    limits
                );
                Ok(None)
            }
        }
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle.  Returns the outcome when the job ended
    /// during this tick.
    pub fn tick(
        &mut self,
        clock: &impl Clock,
        projector: &mut impl Projector,
        sink: &mut impl EventSink,
    ) -> Option<JobOutcome> {
        self.ctx.now_ms = clock.now_ms();

        // Stop and cancel tripped from another thread land here.
        if self.stop.is_tripped() && self.is_job_active() {
            return self.emergency_stop(sink);
        }
        if self.cancel.is_tripped() {
            if let Some(outcome) = self.cancel(sink) {
                return Some(outcome);
            }
        }

        let prev = self.fsm.current_state();
        self.fsm.tick(&mut self.ctx);
        self.note_transition(prev, sink);

        if !matches!(
            self.fsm.current_state(),
            StateId::Idle | StateId::Cancelled | StateId::Errored
        ) {
            if let Err(e) = self.apply_actuators(projector, sink) {
                self.fail(e, sink);
            }
        }

        self.settle(sink)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn status(&self, clock: &impl Clock) -> PrintStatus {
        let state = self.fsm.current_state();
        let total = self.ctx.total_layers;
        let (display_layer, remaining_layers, percent) = if state.is_active() && total > 0 {
            let current = self.ctx.current_layer.min(total - 1);
            let percent = (u64::from(current + 1) * 100 / u64::from(total)).min(100);
            (current + 1, total - current - 1, percent as u8)
        } else {
            (0, 0, 0)
        };
        let elapsed_ms = self
            .started_at_ms
            .map_or(0, |t| clock.now_ms().saturating_sub(t));
        let exposure_remaining_ms = match state {
            StateId::Exposing => self
                .ctx
                .exposure
                .map(|e| e.remaining_ms(clock.now_ms())),
            _ => None,
        };

        PrintStatus {
            state,
            connected: self.axis.is_some(),
            display_layer,
            total_layers: if state.is_active() { total } else { 0 },
            remaining_layers,
            percent,
            elapsed_ms,
            exposure_remaining_ms,
            uv_on: self.axis.as_ref().is_some_and(Axis::is_uv_on),
            emergency_stop: self.stop.is_tripped(),
        }
    }

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn is_job_active(&self) -> bool {
        self.fsm.current_state().is_active()
    }

    pub fn is_connected(&self) -> bool {
        self.axis.is_some()
    }

    /// 0-based index of the layer in progress.
    pub fn current_layer(&self) -> u32 {
        self.ctx.current_layer
    }

    pub fn axis(&self) -> Option<&Axis<D>> {
        self.axis.as_ref()
    }

    pub fn axis_mut(&mut self) -> Option<&mut Axis<D>> {
        self.axis.as_mut()
    }

    pub fn history(&self) -> &JobHistory {
        &self.history
    }

    /// Shared handle for tripping the stop from another thread.
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    /// Shared handle for cancelling from another thread.  Homing and the
    /// lift cycle poll it at the limit-check cadence; the job ends on the
    /// next tick as if [`cancel`](Self::cancel) had been called.
    pub fn cancel_token(&self) -> StopToken {
        self.cancel.clone()
    }

    // ── Internal ──────────────────────────────────────────────

    fn check_manual(&self) -> Result<(), PrintError> {
        if self.is_job_active() {
            return Err(PrintError::Busy);
        }
        if self.axis.is_none() {
            return Err(PrintError::NotConnected);
        }
        if self.stop.is_tripped() {
            return Err(PrintError::EmergencyStop);
        }
        Ok(())
    }

    /// Translate FSM actuator commands into axis calls.  UV-off is applied
    /// before any axis action.
    fn apply_actuators(
        &mut self,
        projector: &mut impl Projector,
        sink: &mut impl EventSink,
    ) -> Result<(), PrintError> {
        let axis = self.axis.as_mut().ok_or(PrintError::NotConnected)?;

        if !self.ctx.commands.uv_on && axis.is_uv_on() {
            if let Err(e) = axis.uv_off() {
                axis.force_uv_off("uv off failed");
                return Err(e.into());
            }
        }

        let Some(action) = self.ctx.commands.action.take() else {
            return Ok(());
        };
        let plan = self.ctx.plan;

        match action {
            AxisAction::Home => {
                self.motion.arm_cancel(self.cancel.clone());
                let result = self.motion.home(axis).map(|_| ()).map_err(PrintError::from);
                self.motion.disarm_cancel();
                self.ctx.motion_result = Some(result);
            }
            AxisAction::GoToEnd => {
                let result = self
                    .motion
                    .go_to_end(axis)
                    .map(|_| ())
                    .map_err(PrintError::from);
                self.ctx.motion_result = Some(result);
            }
            AxisAction::BeginLayer(layer) => {
                let image = self
                    .sequence
                    .as_ref()
                    .and_then(|s| s.get(layer))
                    .ok_or(PrintError::NoSequence)?;
                let exposure =
                    exposure::begin_layer(axis, projector, image, layer, &plan, self.ctx.now_ms)?;
                sink.emit(&AppEvent::LayerStarted {
                    current_layer: layer,
                    total_layers: self.ctx.total_layers,
                    exposure_ms: exposure.duration_ms,
                });
                self.ctx.exposure = Some(exposure);
            }
            AxisAction::CompleteLayer => {
                self.motion.arm_cancel(self.cancel.clone());
                let result = match self.ctx.exposure.as_mut() {
                    Some(exposure) => {
                        exposure::complete_layer(exposure, axis, &mut self.motion, &plan)
                    }
                    None => exposure::run_lift_cycle(axis, &mut self.motion, &plan),
                };
                self.motion.disarm_cancel();
                self.ctx.motion_result = Some(result);
            }
        }
        Ok(())
    }

    fn force(&mut self, next: StateId, sink: &mut impl EventSink) {
        let prev = self.fsm.current_state();
        self.fsm.force_transition(next, &mut self.ctx);
        self.note_transition(prev, sink);
    }

    fn note_transition(&self, prev: StateId, sink: &mut impl EventSink) {
        let to = self.fsm.current_state();
        if to != prev {
            sink.emit(&AppEvent::StateChanged { from: prev, to });
        }
    }

    /// Record `error` and enter `Errored`.
    fn fail(&mut self, error: PrintError, sink: &mut impl EventSink) {
        self.ctx.fault = Some(error);
        self.force(StateId::Errored, sink);
    }

    /// Walk terminal states to Idle and finalize the job if it ended.
    fn settle(&mut self, sink: &mut impl EventSink) -> Option<JobOutcome> {
        let state = self.fsm.current_state();
        if matches!(state, StateId::Cancelled | StateId::Errored) {
            if let Some(axis) = self.axis.as_mut() {
                axis.force_uv_off(if state == StateId::Cancelled {
                    "job cancelled"
                } else {
                    "job errored"
                });
            }
            self.force(StateId::Idle, sink);
        }

        if self.fsm.current_state() != StateId::Idle {
            return None;
        }
        let outcome = self.ctx.outcome.take()?;
        Some(self.finish_job(outcome, sink))
    }

    fn finish_job(&mut self, outcome: JobOutcome, sink: &mut impl EventSink) -> JobOutcome {
        if let Some(axis) = self.axis.as_mut() {
            axis.force_uv_off("job finished");
        }
        let elapsed_ms = self
            .started_at_ms
            .take()
            .map_or(0, |t| self.ctx.now_ms.saturating_sub(t));
        let record = JobRecord {
            outcome,
            total_layers: self.ctx.total_layers,
            elapsed_ms,
        };
        self.sequence = None;
        self.history.push(record);

        match outcome {
            JobOutcome::Completed { layers } => info!("Job completed: {} layers", layers),
            JobOutcome::Cancelled { layer } => info!("Job cancelled at layer {}", layer + 1),
            JobOutcome::Failed { layer, error } => {
                warn!("Job failed at layer {}: {}", layer + 1, error);
            }
        }
        sink.emit(&AppEvent::JobFinished(record));
        outcome
    }
}
