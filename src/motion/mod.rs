//! Motion controller: step pulse trains with a sampled limit-switch interlock.
//!
//! ```text
//!   MotionRequest(mm) ──▶ steps = round(|mm| · steps_per_mm), dir = sign(mm)
//!                              │
//!            pre-check guard switch ── triggered ──▶ Ok(0 steps)
//!                              │
//!                         write DIR once
//!                              │
//!   ┌──────────── for each step ───────────────────────────┐
//!   │  every Nth pulse: stop token? ──▶ Err(EmergencyStop)  │
//!   │                   cancel armed? ──▶ Err(Cancelled)    │
//!   │                   guard switch? ──▶ Ok(partial)       │
//!   │  STEP high ─ delay ─ STEP low ─ delay                 │
//!   └───────────────────────────────────────────────────────┘
//! ```
//!
//! Detection is sampled, not continuous: worst-case overtravel past a
//! closing switch is `limit_check_interval` steps.  The guard switch is the
//! one in the direction of travel (END going up, HOME going down).  A
//! triggered guard is an expected outcome, reported through
//! [`StepsCompleted`], never as an error.

mod homing;
mod stop;

pub use stop::StopToken;

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::app::ports::DigitalIo;
use crate::axis::Axis;
use crate::config::MotionTuning;
use crate::drivers::limit::Limit;
use crate::drivers::stepper::Direction;
use crate::error::MotionError;

// ---------------------------------------------------------------------------
// Request / result types
// ---------------------------------------------------------------------------

/// A relative Z move.  Positive = up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionRequest {
    pub distance_mm: f64,
}

impl MotionRequest {
    pub fn new(distance_mm: f64) -> Self {
        Self { distance_mm }
    }

    /// `round(|distance_mm| * steps_per_mm)`.
    pub fn steps(&self, steps_per_mm: f64) -> u32 {
        (self.distance_mm.abs() * steps_per_mm).round() as u32
    }

    pub fn direction(&self) -> Direction {
        Direction::from_distance(self.distance_mm)
    }
}

/// Outcome of a move that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepsCompleted {
    /// Pulses actually emitted.
    pub steps: u32,
    /// Pulses the request converted to.
    pub requested: u32,
    /// Set when a limit switch cut the train short.
    pub stopped_at: Option<Limit>,
}

impl StepsCompleted {
    pub fn is_complete(&self) -> bool {
        self.steps == self.requested
    }
}

/// The switch that guards travel in `direction`.
pub fn guard_for(direction: Direction) -> Limit {
    match direction {
        Direction::Up => Limit::End,
        Direction::Down => Limit::Home,
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Generates pulse trains on an [`Axis`].
///
/// Owns the pulse-width delay source and a clone of the session's
/// [`StopToken`], so an emergency stop raised on another thread takes
/// effect within one check interval.  A cancel token, while armed, is
/// polled at the same points.
pub struct MotionController<T: DelayNs> {
    delay: T,
    tuning: MotionTuning,
    stop: StopToken,
    cancel: Option<StopToken>,
}

impl<T: DelayNs> MotionController<T> {
    pub fn new(delay: T, tuning: MotionTuning, stop: StopToken) -> Self {
        Self {
            delay,
            tuning,
            stop,
            cancel: None,
        }
    }

    /// Let `token` interrupt the following moves with
    /// [`MotionError::Cancelled`] until [`disarm_cancel`](Self::disarm_cancel).
    pub fn arm_cancel(&mut self, token: StopToken) {
        self.cancel = Some(token);
    }

    pub fn disarm_cancel(&mut self) {
        self.cancel = None;
    }

    pub fn tuning(&self) -> &MotionTuning {
        &self.tuning
    }

    /// Move the platform by `request.distance_mm`.
    ///
    /// Zero distance (or one that rounds to zero steps) is a no-op success
    /// that touches no pins.
    pub fn move_axis<D: DigitalIo>(
        &mut self,
        axis: &mut Axis<D>,
        request: MotionRequest,
    ) -> Result<StepsCompleted, MotionError> {
        if !request.distance_mm.is_finite() {
            return Err(MotionError::InvalidDistance);
        }
        let requested = request.steps(axis.config().steps_per_mm);
        if requested == 0 {
            return Ok(StepsCompleted {
                steps: 0,
                requested: 0,
                stopped_at: None,
            });
        }
        self.check_stop()?;

        let direction = request.direction();
        let guard = axis.switch(guard_for(direction));
        let interval = self.tuning.limit_check_interval.max(1);
        let (io, stepper) = axis.io_and_stepper();

        if guard.is_triggered(io)? {
            info!(
                "Move {:+.3} mm refused: {:?} limit already triggered",
                request.distance_mm,
                guard.limit()
            );
            return Ok(StepsCompleted {
                steps: 0,
                requested,
                stopped_at: Some(guard.limit()),
            });
        }

        stepper.set_direction(io, direction)?;

        for step in 0..requested {
            if step > 0 && step % interval == 0 {
                if let Err(e) = self.check_stop() {
                    warn!("Move aborted after {} of {} steps: {}", step, requested, e);
                    return Err(e);
                }
                if guard.is_triggered(io)? {
                    info!(
                        "{:?} limit reached after {} of {} steps",
                        guard.limit(),
                        step,
                        requested
                    );
                    return Ok(StepsCompleted {
                        steps: step,
                        requested,
                        stopped_at: Some(guard.limit()),
                    });
                }
            }
            stepper.pulse(io, &mut self.delay, &self.tuning)?;
        }

        debug!("Moved {:+.3} mm ({} steps {:?})", request.distance_mm, requested, direction);
        Ok(StepsCompleted {
            steps: requested,
            requested,
            stopped_at: None,
        })
    }

    /// Emergency stop wins over cancel.
    fn check_stop(&self) -> Result<(), MotionError> {
        if self.stop.is_tripped() {
            Err(MotionError::EmergencyStop)
        } else if self.cancel.as_ref().is_some_and(StopToken::is_tripped) {
            Err(MotionError::Cancelled)
        } else {
            Ok(())
        }
    }
}
