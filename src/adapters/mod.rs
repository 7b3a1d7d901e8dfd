//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements   | Connects to                         |
//! |---------------|--------------|-------------------------------------|
//! | `sim_board`   | DigitalIo    | Simulated Z axis with two switches  |
//! | `time`        | Clock        | `std::time::Instant`                |
//! |               | DelayNs      | `std::thread::sleep`                |
//! | `log_sink`    | EventSink    | `log` output                        |
//! | `projector`   | Projector    | `log` output (headless display)     |
//! | `config_file` | ConfigPort   | JSON file on disk                   |

pub mod config_file;
pub mod log_sink;
pub mod projector;
pub mod sim_board;
pub mod time;
