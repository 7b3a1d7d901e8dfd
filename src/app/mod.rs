//! Application core: print sequencing, zero direct I/O.
//!
//! The business rules of the printer (session FSM orchestration, manual
//! controls, status and history) live here.  All interaction with the
//! board, the clock, the projector and the operator happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod channels;
pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
