//! Default pin assignments for the Z-axis controller board.
//!
//! Single source of truth for the factory wiring. [`AxisConfig::default`]
//! reads these, and validation uses the usable digital range below.
//!
//! [`AxisConfig::default`]: crate::config::AxisConfig

use crate::app::ports::Pin;

// ---------------------------------------------------------------------------
// Stepper driver (STEP/DIR interface, e.g. A4988 / DRV8825)
// ---------------------------------------------------------------------------

/// Digital output: one rising edge per microstep.
pub const STEP_PIN: Pin = 2;
/// Digital output: HIGH = platform up, LOW = platform down.
pub const DIR_PIN: Pin = 3;

// ---------------------------------------------------------------------------
// Limit switches (active-low, internal pull-up)
// ---------------------------------------------------------------------------

/// Lower travel limit. LOW = platform at home.
pub const HOME_PIN: Pin = 4;
/// Upper travel limit. LOW = platform at end.
pub const END_PIN: Pin = 5;

// ---------------------------------------------------------------------------
// UV light source
// ---------------------------------------------------------------------------

/// Digital output: HIGH = UV on.
pub const UV_PIN: Pin = 6;

// ---------------------------------------------------------------------------
// Usable range
// ---------------------------------------------------------------------------

/// Lowest assignable digital pin (0 and 1 carry the serial link).
pub const MIN_DIGITAL_PIN: Pin = 2;
/// Highest assignable digital pin.
pub const MAX_DIGITAL_PIN: Pin = 13;

/// True if `pin` may be assigned to an axis function.
pub const fn is_assignable(pin: Pin) -> bool {
    pin >= MIN_DIGITAL_PIN && pin <= MAX_DIGITAL_PIN
}
