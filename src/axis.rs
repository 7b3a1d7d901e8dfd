//! A live DigitalIO session bound to one [`AxisConfig`].
//!
//! `Axis` is the only owner of the board handle.  Creating one configures
//! every pin and drives UV low; dropping the binding via
//! [`Axis::release`] forces UV off and hands the handle back.

use log::info;

use crate::app::ports::DigitalIo;
use crate::config::AxisConfig;
use crate::drivers::limit::{Limit, LimitState, LimitSwitch};
use crate::drivers::stepper::StepperDriver;
use crate::drivers::uvc::UvLamp;
use crate::error::{IoError, PrintError};

pub struct Axis<D: DigitalIo> {
    io: D,
    config: AxisConfig,
    pub(crate) stepper: StepperDriver,
    pub(crate) uv: UvLamp,
    home: LimitSwitch,
    end: LimitSwitch,
}

impl<D: DigitalIo> Axis<D> {
    /// Validate `config`, then configure STEP/DIR/UV as outputs and
    /// HOME/END as pulled-up inputs.
    pub fn connect(mut io: D, config: AxisConfig) -> Result<Self, PrintError> {
        config.validate()?;

        let mut stepper = StepperDriver::new(config.pin_step, config.pin_dir);
        let mut uv = UvLamp::new(config.pin_uv);
        let home = LimitSwitch::new(config.pin_home, Limit::Home);
        let end = LimitSwitch::new(config.pin_end, Limit::End);

        stepper.configure(&mut io)?;
        home.configure(&mut io)?;
        end.configure(&mut io)?;
        uv.configure(&mut io)?;

        info!(
            "Axis bound: step={} dir={} home={} end={} uv={} @ {} steps/mm",
            config.pin_step,
            config.pin_dir,
            config.pin_home,
            config.pin_end,
            config.pin_uv,
            config.steps_per_mm
        );

        Ok(Self {
            io,
            config,
            stepper,
            uv,
            home,
            end,
        })
    }

    /// Force UV off and return the board handle.
    pub fn release(mut self) -> D {
        self.uv.force_off(&mut self.io, "disconnect");
        info!("Axis released after {} pulses", self.stepper.pulse_count());
        self.io
    }

    /// The bound board handle, for inspection.
    pub fn io(&self) -> &D {
        &self.io
    }

    /// Raw board access, bypassing driver bookkeeping.
    pub fn io_mut(&mut self) -> &mut D {
        &mut self.io
    }

    pub fn config(&self) -> &AxisConfig {
        &self.config
    }

    pub fn switch(&self, limit: Limit) -> LimitSwitch {
        match limit {
            Limit::Home => self.home,
            Limit::End => self.end,
        }
    }

    /// Sample one limit switch.
    pub fn limit_triggered(&mut self, limit: Limit) -> Result<bool, IoError> {
        let switch = self.switch(limit);
        switch.is_triggered(&mut self.io)
    }

    /// Sample both switches.
    pub fn limits(&mut self) -> Result<LimitState, IoError> {
        Ok(LimitState {
            home_triggered: self.limit_triggered(Limit::Home)?,
            end_triggered: self.limit_triggered(Limit::End)?,
        })
    }

    pub fn uv_on(&mut self) -> Result<(), IoError> {
        self.uv.enable(&mut self.io)
    }

    pub fn uv_off(&mut self) -> Result<(), IoError> {
        self.uv.disable(&mut self.io)
    }

    /// Best-effort UV shutdown; never fails.
    pub fn force_uv_off(&mut self, reason: &'static str) {
        self.uv.force_off(&mut self.io, reason);
    }

    pub fn is_uv_on(&self) -> bool {
        self.uv.is_on()
    }

    /// Split borrow for the motion loop.
    pub(crate) fn io_and_stepper(&mut self) -> (&mut D, &mut StepperDriver) {
        (&mut self.io, &mut self.stepper)
    }
}
