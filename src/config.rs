//! Printer configuration parameters
//!
//! All externally supplied settings for the Z axis, the exposure plan and
//! the pulse timing.  Loaded through a [`ConfigPort`](crate::app::ports::ConfigPort)
//! and validated once at session start; the axis part is frozen when a
//! connection is established.

use serde::{Deserialize, Serialize};

use crate::app::ports::Pin;
use crate::error::ConfigError;
use crate::pins;

/// Top-level configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    /// Board link selection.
    pub connection: ConnectionConfig,
    /// Pin wiring and mechanics of the Z axis.
    pub axis: AxisConfig,
    /// Per-layer exposure and lift parameters.
    pub plan: ExposurePlan,
    /// Pulse timing and interlock cadence.
    pub motion: MotionTuning,
    /// Control loop interval (milliseconds).
    pub control_loop_interval_ms: u32,
}

/// Transport endpoint for the DigitalIO driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Serial port name, or `sim` for the built-in simulated board.
    pub endpoint: String,
    /// Board instance id announced by the firmware.
    pub instance_id: u8,
}

/// Z-axis wiring.  Immutable once a connection is established.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisConfig {
    /// Microsteps per millimetre of platform travel.
    pub steps_per_mm: f64,
    pub pin_step: Pin,
    pub pin_dir: Pin,
    /// Lower limit switch (active-low).
    pub pin_home: Pin,
    /// Upper limit switch (active-low).
    pub pin_end: Pin,
    pub pin_uv: Pin,
}

/// Exposure and lift parameters for one job.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExposurePlan {
    /// Number of leading layers exposed with `primary_exposure_ms`.
    pub primary_layer_count: u32,
    pub primary_exposure_ms: u32,
    pub normal_exposure_ms: u32,
    /// Lift after each layer; must exceed `layer_height_mm`.
    pub lift_distance_mm: f64,
    pub layer_height_mm: f64,
}

/// Hardware timing contract of the stepper driver and the limit interlock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionTuning {
    /// STEP high time (µs).
    pub pulse_high_us: u32,
    /// STEP low time (µs).
    pub pulse_low_us: u32,
    /// Limit switch and stop token are re-read every N pulses.
    pub limit_check_interval: u32,
    /// Homing step budget, expressed as travel.
    pub max_travel_mm: f64,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            axis: AxisConfig::default(),
            plan: ExposurePlan::default(),
            motion: MotionTuning::default(),
            control_loop_interval_ms: 20,
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            endpoint: "sim".to_string(),
            instance_id: 1,
        }
    }
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            steps_per_mm: 80.0,
            pin_step: pins::STEP_PIN,
            pin_dir: pins::DIR_PIN,
            pin_home: pins::HOME_PIN,
            pin_end: pins::END_PIN,
            pin_uv: pins::UV_PIN,
        }
    }
}

impl Default for ExposurePlan {
    fn default() -> Self {
        Self {
            primary_layer_count: 3,
            primary_exposure_ms: 30_000,
            normal_exposure_ms: 8_000,
            lift_distance_mm: 30.0,
            layer_height_mm: 0.05,
        }
    }
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            pulse_high_us: 100,
            pulse_low_us: 100,
            limit_check_interval: 10,
            max_travel_mm: 200.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl PrinterConfig {
    /// Range-check every field.  Nothing is clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.axis.validate()?;
        self.plan.validate()?;
        self.motion.validate()?;
        if !(1..=1000).contains(&self.control_loop_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "control_loop_interval_ms must be 1-1000",
            ));
        }
        Ok(())
    }
}

impl AxisConfig {
    /// All five pins in wiring order.
    pub fn pins(&self) -> [Pin; 5] {
        [
            self.pin_step,
            self.pin_dir,
            self.pin_home,
            self.pin_end,
            self.pin_uv,
        ]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.steps_per_mm.is_finite() || self.steps_per_mm <= 0.0 {
            return Err(ConfigError::ValidationFailed(
                "steps_per_mm must be a positive number",
            ));
        }
        let pins = self.pins();
        if !pins.iter().all(|&p| pins::is_assignable(p)) {
            return Err(ConfigError::ValidationFailed("axis pins must be 2-13"));
        }
        for (i, a) in pins.iter().enumerate() {
            if pins[i + 1..].contains(a) {
                return Err(ConfigError::ValidationFailed("axis pins must be distinct"));
            }
        }
        Ok(())
    }
}

impl ExposurePlan {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.layer_height_mm.is_finite() || self.layer_height_mm <= 0.0 {
            return Err(ConfigError::ValidationFailed(
                "layer_height_mm must be a positive number",
            ));
        }
        if !self.lift_distance_mm.is_finite() || self.lift_distance_mm <= self.layer_height_mm {
            return Err(ConfigError::ValidationFailed(
                "lift_distance_mm must be greater than layer_height_mm",
            ));
        }
        if self.primary_exposure_ms == 0 || self.normal_exposure_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "exposure times must be non-zero",
            ));
        }
        Ok(())
    }
}

impl MotionTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pulse_high_us == 0 || self.pulse_low_us == 0 {
            return Err(ConfigError::ValidationFailed("pulse widths must be non-zero"));
        }
        if self.limit_check_interval == 0 {
            return Err(ConfigError::ValidationFailed(
                "limit_check_interval must be at least 1",
            ));
        }
        if !self.max_travel_mm.is_finite() || self.max_travel_mm <= 0.0 {
            return Err(ConfigError::ValidationFailed(
                "max_travel_mm must be a positive number",
            ));
        }
        Ok(())
    }
}
