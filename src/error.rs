//! Unified error types for the print controller.
//!
//! Each layer of the stack owns one enum and converts upward:
//!
//! ```text
//! IoError ──▶ MotionError ──▶ PrintError
//!                 ConfigError ──▶ PrintError
//! ```
//!
//! All variants are `Copy` so they can be stored in the session context and
//! job history without allocation.  Nothing here is ever retried
//! automatically: after an I/O fault the platform position is unknown.

use core::fmt;

use crate::app::ports::Pin;

// ---------------------------------------------------------------------------
// Pin-level transport errors
// ---------------------------------------------------------------------------

/// A DigitalIO call did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoError {
    /// The board link is gone (cable pulled, port closed).
    Disconnected,
    /// Setting a pin mode failed.
    Configure { pin: Pin },
    /// Driving an output failed.
    Write { pin: Pin },
    /// Sampling an input failed.
    Read { pin: Pin },
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "board disconnected"),
            Self::Configure { pin } => write!(f, "configure pin {pin} failed"),
            Self::Write { pin } => write!(f, "write pin {pin} failed"),
            Self::Read { pin } => write!(f, "read pin {pin} failed"),
        }
    }
}

impl std::error::Error for IoError {}

// ---------------------------------------------------------------------------
// Motion errors
// ---------------------------------------------------------------------------

/// Failure of a single motion call.
///
/// A limit switch ending a move early is **not** an error; it is reported
/// through the returned step count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionError {
    /// A pin call failed mid pulse train.
    IoFailure(IoError),
    /// Homing exhausted its step budget without the switch closing.
    HomingTimeout { steps: u32 },
    /// The emergency-stop token was tripped.
    EmergencyStop,
    /// The job was cancelled while this move was in flight.
    Cancelled,
    /// Distance was NaN or infinite.
    InvalidDistance,
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IoFailure(e) => write!(f, "I/O failure: {e}"),
            Self::HomingTimeout { steps } => {
                write!(f, "limit switch not reached after {steps} steps")
            }
            Self::EmergencyStop => write!(f, "emergency stop"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::InvalidDistance => write!(f, "distance is not finite"),
        }
    }
}

impl std::error::Error for MotionError {}

impl From<IoError> for MotionError {
    fn from(e: IoError) -> Self {
        Self::IoFailure(e)
    }
}

// ---------------------------------------------------------------------------
// Session errors
// ---------------------------------------------------------------------------

/// Errors surfaced by the print session and the manual controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintError {
    /// Pin-level failure outside a motion call (UV, pin setup).
    IoFailure(IoError),
    /// No DigitalIO session is bound.
    NotConnected,
    /// The layer sequence is empty.
    NoSequence,
    /// A motion call failed; platform position is no longer trusted.
    MotionFailed(MotionError),
    /// A pin or parameter is out of range.
    InvalidConfig(&'static str),
    /// A job is running; manual controls are locked out.
    Busy,
    /// The emergency stop is latched.
    EmergencyStop,
}

impl fmt::Display for PrintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IoFailure(e) => write!(f, "I/O failure: {e}"),
            Self::NotConnected => write!(f, "printer not connected"),
            Self::NoSequence => write!(f, "no valid layer sequence"),
            Self::MotionFailed(e) => write!(f, "motion failed: {e}"),
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::Busy => write!(f, "print in progress"),
            Self::EmergencyStop => write!(f, "emergency stop latched"),
        }
    }
}

impl std::error::Error for PrintError {}

impl From<IoError> for PrintError {
    fn from(e: IoError) -> Self {
        Self::IoFailure(e)
    }
}

impl From<MotionError> for PrintError {
    fn from(e: MotionError) -> Self {
        Self::MotionFailed(e)
    }
}

impl From<ConfigError> for PrintError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::ValidationFailed(msg) => Self::InvalidConfig(msg),
            ConfigError::NotFound => Self::InvalidConfig("config not found"),
            ConfigError::Corrupted => Self::InvalidConfig("config corrupted"),
            ConfigError::IoError => Self::InvalidConfig("config unreadable"),
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from [`ConfigPort`](crate::app::ports::ConfigPort) operations and
/// from [`PrinterConfig::validate`](crate::config::PrinterConfig::validate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No stored config (first run).
    NotFound,
    /// Stored config failed to deserialize.
    Corrupted,
    /// A field failed range validation.
    /// The `&'static str` names the field and the accepted range.
    ValidationFailed(&'static str),
    /// The backing file could not be read or written.
    IoError,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
