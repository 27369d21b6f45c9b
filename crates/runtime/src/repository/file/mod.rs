//! File-backed repositories.

mod log;
mod snapshots;

pub use log::FileEventLog;
pub use snapshots::{FileCombatantRepository, FileEffectRepository};
