//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing each application event as one
//! structured log line.  A UI adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::{AppEvent, JobOutcome};
use crate::app::ports::EventSink;

#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Connected(axis) => {
                info!(
                    "CONN  | step={} dir={} home={} end={} uv={} | {} steps/mm",
                    axis.pin_step,
                    axis.pin_dir,
                    axis.pin_home,
                    axis.pin_end,
                    axis.pin_uv,
                    axis.steps_per_mm
                );
            }
            AppEvent::Disconnected => info!("CONN  | released"),
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::JobStarted { total_layers } => {
                info!("JOB   | started | layers={}", total_layers);
            }
            AppEvent::LayerStarted {
                current_layer,
                total_layers,
                exposure_ms,
            } => {
                info!(
                    "LAYER | {}/{} | exposure={}ms",
                    current_layer + 1,
                    total_layers,
                    exposure_ms
                );
            }
            AppEvent::JobFinished(record) => {
                let secs = record.elapsed_ms / 1000;
                let hms = format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60);
                match record.outcome {
                    JobOutcome::Completed { layers } => {
                        info!("JOB   | completed | layers={} | elapsed={}", layers, hms);
                    }
                    JobOutcome::Cancelled { layer } => {
                        info!(
                            "JOB   | cancelled | layer={}/{} | elapsed={}",
                            layer + 1,
                            record.total_layers,
                            hms
                        );
                    }
                    JobOutcome::Failed { layer, error } => {
                        warn!(
                            "JOB   | failed | layer={}/{} | error={} | elapsed={}",
                            layer + 1,
                            record.total_layers,
                            error,
                            hms
                        );
                    }
                }
            }
            AppEvent::EmergencyStop => warn!("ESTOP | tripped, UV forced off"),
            AppEvent::EmergencyStopReset => info!("ESTOP | cleared"),
        }
    }
}
