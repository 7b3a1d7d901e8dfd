//! Mechanical limit switches (normally open, active-low, pulled up).
//!
//! LOW = switch closed = platform at the limit.  The state is never
//! cached: every call samples the pin, because the platform may have
//! moved since the last read.

use crate::app::ports::{DigitalIo, Pin, PinMode, PinState};
use crate::error::IoError;

/// Which end of travel a switch guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// Lower bound (platform fully down).
    Home,
    /// Upper bound (platform fully up).
    End,
}

#[derive(Debug, Clone, Copy)]
pub struct LimitSwitch {
    pin: Pin,
    limit: Limit,
}

impl LimitSwitch {
    pub fn new(pin: Pin, limit: Limit) -> Self {
        Self { pin, limit }
    }

    pub fn configure(&self, io: &mut impl DigitalIo) -> Result<(), IoError> {
        io.configure(self.pin, PinMode::InputPullup)
    }

    /// Sample the switch.  `true` = triggered.
    pub fn is_triggered(&self, io: &mut impl DigitalIo) -> Result<bool, IoError> {
        Ok(io.read(self.pin)? == PinState::Low)
    }

    pub fn limit(&self) -> Limit {
        self.limit
    }
}

/// Both switches sampled back to back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LimitState {
    pub home_triggered: bool,
    pub end_triggered: bool,
}
