//! STEP/DIR stepper driver interface.
//!
//! One rising edge on STEP advances the platform one microstep in the
//! direction latched on DIR.  Pulse widths come from [`MotionTuning`] and
//! are a setup/hold contract of the driver chip, independent of any layer
//! parameter.  Delays go through [`DelayNs`] so tests run without sleeping.

use embedded_hal::delay::DelayNs;

use crate::app::ports::{DigitalIo, Pin, PinMode, PinState};
use crate::config::MotionTuning;
use crate::error::IoError;

/// Platform travel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Away from the vat (DIR HIGH).
    Up,
    /// Towards the vat (DIR LOW).
    Down,
}

impl Direction {
    /// Direction encoded by the sign of a distance.
    pub fn from_distance(distance_mm: f64) -> Self {
        if distance_mm > 0.0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    pub fn level(self) -> PinState {
        match self {
            Direction::Up => PinState::High,
            Direction::Down => PinState::Low,
        }
    }
}

pub struct StepperDriver {
    step_pin: Pin,
    dir_pin: Pin,
    pulses: u64,
}

impl StepperDriver {
    pub fn new(step_pin: Pin, dir_pin: Pin) -> Self {
        Self {
            step_pin,
            dir_pin,
            pulses: 0,
        }
    }

    /// Configure both pins as outputs and park STEP low.
    pub fn configure(&mut self, io: &mut impl DigitalIo) -> Result<(), IoError> {
        io.configure(self.step_pin, PinMode::Output)?;
        io.configure(self.dir_pin, PinMode::Output)?;
        io.write(self.step_pin, PinState::Low)
    }

    pub fn set_direction(
        &mut self,
        io: &mut impl DigitalIo,
        direction: Direction,
    ) -> Result<(), IoError> {
        io.write(self.dir_pin, direction.level())
    }

    /// Emit one STEP pulse: high for `pulse_high_us`, low for `pulse_low_us`.
    pub fn pulse(
        &mut self,
        io: &mut impl DigitalIo,
        delay: &mut impl DelayNs,
        timing: &MotionTuning,
    ) -> Result<(), IoError> {
        io.write(self.step_pin, PinState::High)?;
        delay.delay_us(timing.pulse_high_us);
        io.write(self.step_pin, PinState::Low)?;
        delay.delay_us(timing.pulse_low_us);
        self.pulses += 1;
        Ok(())
    }

    /// Total pulses emitted since connect.
    pub fn pulse_count(&self) -> u64 {
        self.pulses
    }
}
