//! Exposure scheduler: per-layer duration selection, UV sequencing and the
//! lift/retract cycle.
//!
//! A layer runs through
//!
//! ```text
//! ProjectImage → UvOn → Exposing(duration) → UvOff → LiftUp → RetractDown → Done
//! ```
//!
//! split in two halves so the session never blocks while curing:
//! [`begin_layer`] runs up to `Exposing` and returns a [`LayerExposure`]
//! carrying the deadline; the session polls it each tick and calls
//! [`complete_layer`] once it has elapsed.  Both halves force UV off on
//! any error before returning.

use std::path::Path;

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::app::ports::{DigitalIo, Projector};
use crate::axis::Axis;
use crate::config::ExposurePlan;
use crate::error::PrintError;
use crate::motion::{MotionController, MotionRequest};

impl ExposurePlan {
    /// `primary_exposure_ms` for the first `primary_layer_count` layers
    /// (0-based), `normal_exposure_ms` after.
    pub fn exposure_ms_for(&self, layer_index: u32) -> u32 {
        if layer_index < self.primary_layer_count {
            self.primary_exposure_ms
        } else {
            self.normal_exposure_ms
        }
    }

    /// Downward travel after the lift: `lift - layer_height`.
    pub fn retract_distance_mm(&self) -> f64 {
        self.lift_distance_mm - self.layer_height_mm
    }

    /// Net platform rise per completed layer.
    pub fn net_rise_mm(&self) -> f64 {
        self.lift_distance_mm - self.retract_distance_mm()
    }
}

/// Where a layer is in its exposure sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExposurePhase {
    ProjectImage,
    UvOn,
    Exposing,
    UvOff,
    LiftUp,
    RetractDown,
    Done,
}

/// Bookkeeping for the layer currently on the vat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerExposure {
    pub layer_index: u32,
    pub duration_ms: u32,
    pub started_at_ms: u64,
    phase: ExposurePhase,
}

impl LayerExposure {
    pub fn new(layer_index: u32, plan: &ExposurePlan) -> Self {
        Self {
            layer_index,
            duration_ms: plan.exposure_ms_for(layer_index),
            started_at_ms: 0,
            phase: ExposurePhase::ProjectImage,
        }
    }

    /// An exposure already curing, clock started at `now_ms`.
    pub fn started(layer_index: u32, plan: &ExposurePlan, now_ms: u64) -> Self {
        Self {
            started_at_ms: now_ms,
            phase: ExposurePhase::Exposing,
            ..Self::new(layer_index, plan)
        }
    }

    pub fn phase(&self) -> ExposurePhase {
        self.phase
    }

    pub fn deadline_ms(&self) -> u64 {
        self.started_at_ms + u64::from(self.duration_ms)
    }

    /// `true` once the cure time has run out.  Always `false` before UV on.
    pub fn is_elapsed(&self, now_ms: u64) -> bool {
        self.phase == ExposurePhase::Exposing && now_ms >= self.deadline_ms()
    }

    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        match self.phase {
            ExposurePhase::Exposing => self.deadline_ms().saturating_sub(now_ms),
            _ => 0,
        }
    }
}

/// Project the layer image and switch UV on.  The returned exposure is in
/// [`ExposurePhase::Exposing`] with its clock started at `now_ms`.
pub fn begin_layer<D: DigitalIo>(
    axis: &mut Axis<D>,
    projector: &mut impl Projector,
    image: &Path,
    layer_index: u32,
    plan: &ExposurePlan,
    now_ms: u64,
) -> Result<LayerExposure, PrintError> {
    projector.show_image(image);

    if let Err(e) = axis.uv_on() {
        axis.force_uv_off("uv on failed");
        return Err(e.into());
    }

    let exposure = LayerExposure::started(layer_index, plan, now_ms);
    info!(
        "Layer {} exposing for {} ms ({})",
        layer_index + 1,
        exposure.duration_ms,
        image.display()
    );
    Ok(exposure)
}

/// UV off, then lift and retract.  Leaves the exposure in
/// [`ExposurePhase::Done`] on success.
pub fn complete_layer<D: DigitalIo, T: DelayNs>(
    exposure: &mut LayerExposure,
    axis: &mut Axis<D>,
    motion: &mut MotionController<T>,
    plan: &ExposurePlan,
) -> Result<(), PrintError> {
    exposure.phase = ExposurePhase::UvOff;
    if let Err(e) = axis.uv_off() {
        axis.force_uv_off("uv off failed");
        return Err(e.into());
    }

    exposure.phase = ExposurePhase::LiftUp;
    if let Err(e) = lift(axis, motion, plan) {
        axis.force_uv_off("lift failed");
        return Err(e);
    }

    exposure.phase = ExposurePhase::RetractDown;
    if let Err(e) = retract(axis, motion, plan) {
        axis.force_uv_off("retract failed");
        return Err(e);
    }

    exposure.phase = ExposurePhase::Done;
    debug!("Layer {} done", exposure.layer_index + 1);
    Ok(())
}

/// Lift then retract without an exposure in front of it.
pub fn run_lift_cycle<D: DigitalIo, T: DelayNs>(
    axis: &mut Axis<D>,
    motion: &mut MotionController<T>,
    plan: &ExposurePlan,
) -> Result<(), PrintError> {
    axis.uv_off()?;
    let result = lift(axis, motion, plan).and_then(|()| retract(axis, motion, plan));
    if result.is_err() {
        axis.force_uv_off("lift cycle failed");
    }
    result
}

fn lift<D: DigitalIo, T: DelayNs>(
    axis: &mut Axis<D>,
    motion: &mut MotionController<T>,
    plan: &ExposurePlan,
) -> Result<(), PrintError> {
    let done = motion.move_axis(axis, MotionRequest::new(plan.lift_distance_mm))?;
    if !done.is_complete() {
        warn!(
            "Lift stopped at {:?} limit after {} of {} steps",
            done.stopped_at, done.steps, done.requested
        );
    }
    Ok(())
}

fn retract<D: DigitalIo, T: DelayNs>(
    axis: &mut Axis<D>,
    motion: &mut MotionController<T>,
    plan: &ExposurePlan,
) -> Result<(), PrintError> {
    let done = motion.move_axis(axis, MotionRequest::new(-plan.retract_distance_mm()))?;
    if !done.is_complete() {
        warn!(
            "Retract stopped at {:?} limit after {} of {} steps",
            done.stopped_at, done.steps, done.requested
        );
    }
    Ok(())
}
