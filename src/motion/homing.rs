//! Homing / endstop coordinator.
//!
//! Drives the axis towards one limit switch one pulse at a time, sampling
//! the switch after every pulse.  Travel to the switch is unknown up front,
//! so the loop is bounded by a step budget derived from
//! [`MotionTuning::max_travel_mm`](crate::config::MotionTuning); a switch
//! that never closes (unplugged, broken) ends in
//! [`MotionError::HomingTimeout`] instead of an endless pulse train.

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use super::MotionController;
use crate::app::ports::DigitalIo;
use crate::axis::Axis;
use crate::drivers::limit::Limit;
use crate::drivers::stepper::Direction;
use crate::error::MotionError;

impl<T: DelayNs> MotionController<T> {
    /// Drive down until HOME closes.  No pulses if it is already closed.
    pub fn home<D: DigitalIo>(&mut self, axis: &mut Axis<D>) -> Result<u32, MotionError> {
        self.seek_limit(axis, Limit::Home)
    }

    /// Drive up until END closes.  No pulses if it is already closed.
    pub fn go_to_end<D: DigitalIo>(&mut self, axis: &mut Axis<D>) -> Result<u32, MotionError> {
        self.seek_limit(axis, Limit::End)
    }

    /// `ceil(max_travel_mm * steps_per_mm)`.
    pub fn step_budget(&self, steps_per_mm: f64) -> u32 {
        (self.tuning.max_travel_mm * steps_per_mm).ceil() as u32
    }

    /// Returns the number of pulses it took to reach the switch.
    fn seek_limit<D: DigitalIo>(
        &mut self,
        axis: &mut Axis<D>,
        limit: Limit,
    ) -> Result<u32, MotionError> {
        self.check_stop()?;

        let switch = axis.switch(limit);
        let budget = self.step_budget(axis.config().steps_per_mm);
        let direction = match limit {
            Limit::Home => Direction::Down,
            Limit::End => Direction::Up,
        };
        let (io, stepper) = axis.io_and_stepper();

        if switch.is_triggered(io)? {
            info!("Already at {:?} limit", limit);
            return Ok(0);
        }

        stepper.set_direction(io, direction)?;

        let mut steps = 0u32;
        loop {
            if let Err(e) = self.check_stop() {
                warn!("Seek to {:?} aborted after {} steps: {}", limit, steps, e);
                return Err(e);
            }
            if steps >= budget {
                warn!("{:?} limit not reached within {} steps", limit, budget);
                return Err(MotionError::HomingTimeout { steps });
            }
            stepper.pulse(io, &mut self.delay, &self.tuning)?;
            steps += 1;
            if switch.is_triggered(io)? {
                info!("{:?} limit reached after {} steps", limit, steps);
                return Ok(steps);
            }
        }
    }
}
