//! Inter-thread command channel.
//!
//! A bounded `embassy-sync` channel carries [`AppCommand`]s from the
//! operator thread into the synchronous control loop.  The loop drains it
//! with `try_receive` between ticks, so cancel and emergency stop are seen
//! within one control interval even while a layer is curing.
//!
//! ```text
//! ┌──────────────┐  AppCommand  ┌──────────────┐
//! │  Operator    │────────────▶│ Control Loop │
//! │  (stdin)     │              │  (sync)      │
//! └──────────────┘              └──────────────┘
//! ```
//!
//! A pulse train in flight is not interrupted by a queued command; the
//! sender also trips the shared [`StopToken`](crate::motion::StopToken)
//! for that.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use super::commands::AppCommand;

/// Channel depth for inbound commands.
pub const COMMAND_DEPTH: usize = 8;

pub type CommandChannel = Channel<CriticalSectionRawMutex, AppCommand, COMMAND_DEPTH>;

/// Operator thread → control loop.
pub static COMMAND_CHANNEL: CommandChannel = Channel::new();
