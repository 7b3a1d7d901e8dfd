//! Pin-level drivers for the Z axis and the UV source.
//!
//! Each driver is a dumb actuator or sensor over a borrowed
//! [`DigitalIo`](crate::app::ports::DigitalIo) handle; interlocks and
//! sequencing live in [`motion`](crate::motion) and the session FSM.

pub mod limit;
pub mod stepper;
pub mod uvc;
