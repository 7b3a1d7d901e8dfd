//! Mock adapters for integration tests.
//!
//! `FakeBoard` records every DigitalIO call and models a carriage between
//! two switches, with knobs for broken switches, write failures and a
//! stop token tripped mid pulse train.

use std::cell::Cell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use resinprint::app::events::{AppEvent, JobOutcome};
use resinprint::app::ports::{Clock, DigitalIo, EventSink, Pin, PinMode, PinState, Projector};
use resinprint::config::AxisConfig;
use resinprint::error::IoError;
use resinprint::motion::StopToken;

// ── DigitalIO call record ────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum IoCall {
    Configure(Pin, PinMode),
    Write(Pin, PinState),
    Read(Pin),
}

// ── FakeBoard ────────────────────────────────────────────────

pub struct FakeBoard {
    pub calls: Vec<IoCall>,
    pins: AxisConfig,
    /// Steps above HOME.  Not clamped, so overtravel is visible.
    pub position: i64,
    /// END closes at `position >= travel`.
    pub travel: i64,
    pub home_broken: bool,
    pub end_broken: bool,
    /// Fail the n-th (1-based) write to `pin`.
    pub fail_write: Option<(Pin, usize)>,
    /// Trip this token once this many pulses have been emitted.
    pub trip_at_pulse: Option<(u32, StopToken)>,
    pub disconnected: bool,
    pub pulses_up: u32,
    pub pulses_down: u32,
    dir_up: bool,
    step_high: bool,
    writes: HashMap<Pin, usize>,
}

#[allow(dead_code)]
impl FakeBoard {
    pub fn new(pins: AxisConfig, position: i64, travel: i64) -> Self {
        Self {
            calls: Vec::new(),
            pins,
            position,
            travel,
            home_broken: false,
            end_broken: false,
            fail_write: None,
            trip_at_pulse: None,
            disconnected: false,
            pulses_up: 0,
            pulses_down: 0,
            dir_up: false,
            step_high: false,
            writes: HashMap::new(),
        }
    }

    pub fn pulses(&self) -> u32 {
        self.pulses_up + self.pulses_down
    }

    pub fn writes_to(&self, pin: Pin) -> Vec<PinState> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                IoCall::Write(p, level) if *p == pin => Some(*level),
                _ => None,
            })
            .collect()
    }

    pub fn dir_writes(&self) -> Vec<PinState> {
        self.writes_to(self.pins.pin_dir)
    }

    /// Last level written to the UV pin.
    pub fn uv_on(&self) -> bool {
        self.writes_to(self.pins.pin_uv).last() == Some(&PinState::High)
    }

    pub fn reads_of(&self, pin: Pin) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, IoCall::Read(p) if *p == pin))
            .count()
    }
}

impl DigitalIo for FakeBoard {
    fn configure(&mut self, pin: Pin, mode: PinMode) -> Result<(), IoError> {
        self.calls.push(IoCall::Configure(pin, mode));
        if self.disconnected {
            return Err(IoError::Disconnected);
        }
        Ok(())
    }

    fn write(&mut self, pin: Pin, level: PinState) -> Result<(), IoError> {
        self.calls.push(IoCall::Write(pin, level));
        if self.disconnected {
            return Err(IoError::Disconnected);
        }
        let n = self.writes.entry(pin).or_insert(0);
        *n += 1;
        if self.fail_write == Some((pin, *n)) {
            return Err(IoError::Write { pin });
        }

        if pin == self.pins.pin_dir {
            self.dir_up = level == PinState::High;
        } else if pin == self.pins.pin_step {
            let rising = !self.step_high && level == PinState::High;
            self.step_high = level == PinState::High;
            if rising {
                if self.dir_up {
                    self.position += 1;
                    self.pulses_up += 1;
                } else {
                    self.position -= 1;
                    self.pulses_down += 1;
                }
                if let Some((at, token)) = &self.trip_at_pulse {
                    if self.pulses() >= *at {
                        token.trip();
                    }
                }
            }
        }
        Ok(())
    }

    fn read(&mut self, pin: Pin) -> Result<PinState, IoError> {
        self.calls.push(IoCall::Read(pin));
        if self.disconnected {
            return Err(IoError::Disconnected);
        }
        let closed = if pin == self.pins.pin_home {
            !self.home_broken && self.position <= 0
        } else if pin == self.pins.pin_end {
            !self.end_broken && self.position >= self.travel
        } else {
            false
        };
        Ok(if closed { PinState::Low } else { PinState::High })
    }
}

// ── NoDelay ──────────────────────────────────────────────────

pub struct NoDelay;

impl embedded_hal::delay::DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

// ── FakeClock ────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeClock {
    now: Cell<u64>,
}

#[allow(dead_code)]
impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

// ── RecordingProjector ───────────────────────────────────────

#[derive(Default)]
pub struct RecordingProjector {
    pub shown: Vec<PathBuf>,
}

impl Projector for RecordingProjector {
    fn show_image(&mut self, path: &Path) {
        self.shown.push(path.to_path_buf());
    }
}

// ── RecordingSink ────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn exposures(&self) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::LayerStarted { exposure_ms, .. } => Some(*exposure_ms),
                _ => None,
            })
            .collect()
    }

    pub fn finished(&self) -> Vec<JobOutcome> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::JobFinished(r) => Some(r.outcome),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
