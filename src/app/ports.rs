//! Port traits: the hexagonal boundary between sequencing logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ PrintService (domain)
//! ```
//!
//! Driven adapters (the microcontroller link, clocks, the projector, event
//! sinks, config storage) implement these traits.  The
//! [`PrintService`](super::service::PrintService) consumes them via generics,
//! so the domain core never touches a serial port or a window directly.
//!
//! ## Safety notes
//!
//! - **DigitalIo** calls are synchronous and exclusively owned: at most one
//!   read or write is in flight, and every component serialises through the
//!   single handle bound to an [`Axis`](crate::axis::Axis).
//! - **ConfigPort** implementations MUST validate before persisting.

use std::path::Path;

pub use embedded_hal::digital::PinState;

use crate::config::PrinterConfig;
use crate::error::{ConfigError, IoError};

/// Microcontroller digital pin number.
pub type Pin = u8;

// ───────────────────────────────────────────────────────────────
// DigitalIO port (driven adapter: domain ↔ microcontroller pins)
// ───────────────────────────────────────────────────────────────

/// Electrical mode of a digital pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Output,
    /// Input with the internal pull-up enabled (idle HIGH, switch pulls LOW).
    InputPullup,
}

/// Pin-level access to the microcontroller.
///
/// Each call returns after the underlying transport round-trip.  Any
/// failure leaves the hardware state unknown; callers surface it and
/// never retry.
pub trait DigitalIo {
    /// Set the electrical mode of `pin`.
    fn configure(&mut self, pin: Pin, mode: PinMode) -> Result<(), IoError>;

    /// Drive an output pin.
    fn write(&mut self, pin: Pin, level: PinState) -> Result<(), IoError>;

    /// Sample an input pin.
    fn read(&mut self, pin: Pin) -> Result<PinState, IoError>;
}

impl<T: DigitalIo + ?Sized> DigitalIo for &mut T {
    fn configure(&mut self, pin: Pin, mode: PinMode) -> Result<(), IoError> {
        (**self).configure(pin, mode)
    }

    fn write(&mut self, pin: Pin, level: PinState) -> Result<(), IoError> {
        (**self).write(pin, level)
    }

    fn read(&mut self, pin: Pin) -> Result<PinState, IoError> {
        (**self).read(pin)
    }
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: monotonic time source)
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock used for exposure deadlines and job timing.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin.
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Projector port (driven adapter: domain → image presentation)
// ───────────────────────────────────────────────────────────────

/// Presents one layer image on the masking display.
///
/// Fire-and-forget: the session does not wait for an acknowledgement and
/// a presentation failure never aborts a print.
pub trait Projector {
    fn show_image(&mut self, path: &Path);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / UI)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (log, UI, socket).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists printer configuration.
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration.
    /// Returns [`PrinterConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<PrinterConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &PrinterConfig) -> Result<(), ConfigError>;
}
