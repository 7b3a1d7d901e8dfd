//! UV light source driver (LED array behind a MOSFET or relay).
//!
//! Single digital enable line.  The driver tracks what it last
//! commanded; the session uses [`UvLamp::force_off`] on every exit path
//! so the lamp is never left on after a job ends, whether or not the
//! write itself succeeds.

use log::{info, warn};

use crate::app::ports::{DigitalIo, Pin, PinMode, PinState};
use crate::error::IoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UvState {
    Off,
    On,
    /// A forced shutdown write failed; real output state is unknown.
    Faulted(IoError),
}

pub struct UvLamp {
    pin: Pin,
    state: UvState,
}

impl UvLamp {
    pub fn new(pin: Pin) -> Self {
        Self {
            pin,
            state: UvState::Off,
        }
    }

    /// Configure the enable pin as an output and drive it low.
    pub fn configure(&mut self, io: &mut impl DigitalIo) -> Result<(), IoError> {
        io.configure(self.pin, PinMode::Output)?;
        self.disable(io)
    }

    pub fn enable(&mut self, io: &mut impl DigitalIo) -> Result<(), IoError> {
        io.write(self.pin, PinState::High)?;
        if self.state != UvState::On {
            info!("UV on");
        }
        self.state = UvState::On;
        Ok(())
    }

    pub fn disable(&mut self, io: &mut impl DigitalIo) -> Result<(), IoError> {
        io.write(self.pin, PinState::Low)?;
        if self.state != UvState::Off {
            info!("UV off");
        }
        self.state = UvState::Off;
        Ok(())
    }

    /// Best-effort shutdown: always attempts the write, never propagates.
    pub fn force_off(&mut self, io: &mut impl DigitalIo, reason: &'static str) {
        match io.write(self.pin, PinState::Low) {
            Ok(()) => {
                if self.state != UvState::Off {
                    info!("UV forced off: {}", reason);
                }
                self.state = UvState::Off;
            }
            Err(e) => {
                warn!("UV forced off ({}) but write failed: {}", reason, e);
                self.state = UvState::Faulted(e);
            }
        }
    }

    pub fn state(&self) -> UvState {
        self.state
    }

    pub fn is_on(&self) -> bool {
        matches!(self.state, UvState::On)
    }
}
