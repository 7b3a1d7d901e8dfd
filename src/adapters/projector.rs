//! Headless projector adapter.
//!
//! Stands in for the masking display: logs each layer image it is asked
//! to show.  A missing file is reported and otherwise ignored; projection
//! is fire-and-forget and never aborts a job.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::Projector;

#[derive(Default)]
pub struct LogProjector {
    current: Option<PathBuf>,
    shown: u32,
}

impl LogProjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Image currently on the display.
    pub fn current(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    /// Images shown since construction.
    pub fn shown(&self) -> u32 {
        self.shown
    }
}

impl Projector for LogProjector {
    fn show_image(&mut self, path: &Path) {
        if path.is_file() {
            info!("PROJ  | {}", path.display());
        } else {
            warn!("PROJ  | {} not found, display left blank", path.display());
        }
        self.current = Some(path.to_path_buf());
        self.shown += 1;
    }
}
