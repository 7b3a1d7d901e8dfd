//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises one subsystem against
//! the recording mock adapters in `mock_hw`.  Everything runs on the host
//! with no board attached.

mod mock_hw;
mod motion_tests;
