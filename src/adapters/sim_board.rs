//! Simulated microcontroller board.
//!
//! Implements [`DigitalIo`] for a virtual Z axis: rising edges on STEP
//! move a carriage by one step in the direction latched on DIR, and the
//! two limit inputs read LOW when the carriage sits at either end of its
//! travel.  Used by the binary's `sim` endpoint and in tests.

use log::trace;

use crate::app::ports::{DigitalIo, Pin, PinMode, PinState};
use crate::config::AxisConfig;
use crate::error::IoError;
use crate::pins;

const PIN_SLOTS: usize = pins::MAX_DIGITAL_PIN as usize + 1;

pub struct SimBoard {
    axis: AxisConfig,
    modes: [Option<PinMode>; PIN_SLOTS],
    outputs: [PinState; PIN_SLOTS],
    /// Carriage position in steps; 0 = HOME.
    position: i64,
    travel: i64,
    connected: bool,
}

impl SimBoard {
    /// A board wired per `axis` with `travel_mm` between the switches and
    /// the carriage starting `start_mm` above HOME.
    pub fn new(axis: AxisConfig, travel_mm: f64, start_mm: f64) -> Self {
        let travel = (travel_mm * axis.steps_per_mm).round() as i64;
        let position = ((start_mm * axis.steps_per_mm).round() as i64).clamp(0, travel);
        Self {
            axis,
            modes: [None; PIN_SLOTS],
            outputs: [PinState::Low; PIN_SLOTS],
            position,
            travel,
            connected: true,
        }
    }

    pub fn position_steps(&self) -> i64 {
        self.position
    }

    pub fn position_mm(&self) -> f64 {
        self.position as f64 / self.axis.steps_per_mm
    }

    pub fn uv_on(&self) -> bool {
        self.outputs[self.axis.pin_uv as usize] == PinState::High
    }

    /// Simulate the link dropping; every later call fails.
    pub fn unplug(&mut self) {
        self.connected = false;
    }

    fn slot(pin: Pin) -> Option<usize> {
        pins::is_assignable(pin).then_some(pin as usize)
    }
}

impl DigitalIo for SimBoard {
    fn configure(&mut self, pin: Pin, mode: PinMode) -> Result<(), IoError> {
        if !self.connected {
            return Err(IoError::Disconnected);
        }
        let slot = Self::slot(pin).ok_or(IoError::Configure { pin })?;
        self.modes[slot] = Some(mode);
        Ok(())
    }

    fn write(&mut self, pin: Pin, level: PinState) -> Result<(), IoError> {
        if !self.connected {
            return Err(IoError::Disconnected);
        }
        let slot = Self::slot(pin).ok_or(IoError::Write { pin })?;
        if self.modes[slot] != Some(PinMode::Output) {
            return Err(IoError::Write { pin });
        }

        let rising = self.outputs[slot] == PinState::Low && level == PinState::High;
        self.outputs[slot] = level;

        if pin == self.axis.pin_step && rising {
            let up = self.outputs[self.axis.pin_dir as usize] == PinState::High;
            // Hard mechanical stops at both ends.
            self.position = if up {
                (self.position + 1).min(self.travel)
            } else {
                (self.position - 1).max(0)
            };
            trace!("sim: position {} steps", self.position);
        }
        Ok(())
    }

    fn read(&mut self, pin: Pin) -> Result<PinState, IoError> {
        if !self.connected {
            return Err(IoError::Disconnected);
        }
        let slot = Self::slot(pin).ok_or(IoError::Read { pin })?;
        if self.modes[slot] != Some(PinMode::InputPullup) {
            return Err(IoError::Read { pin });
        }
        let closed = if pin == self.axis.pin_home {
            self.position <= 0
        } else if pin == self.axis.pin_end {
            self.position >= self.travel
        } else {
            false
        };
        Ok(if closed { PinState::Low } else { PinState::High })
    }
}
