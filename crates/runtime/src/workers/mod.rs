//! Worker tasks that back the runtime orchestration.
//!
//! The combat worker is the single writer of combat state; the tick driver
//! turns wall-clock intervals into scheduler ticks.

mod combat;
mod ticker;

pub(crate) use combat::{CombatWorker, Persistence};
pub use combat::Command;
pub use ticker::TickDriver;
