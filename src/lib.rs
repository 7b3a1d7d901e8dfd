//! Z-axis resin printer controller.
//!
//! Sequences platform motion, UV exposure and layer projection against a
//! microcontroller that exposes plain digital I/O.  Everything
//! board-specific sits behind the port traits in [`app::ports`], so the
//! library runs unchanged against the simulated board and the test mocks.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod axis;
pub mod config;
pub mod diagnostics;
pub mod drivers;
pub mod error;
pub mod exposure;
pub mod fsm;
pub mod layers;
pub mod motion;
pub mod pins;
