//! In-memory repositories for tests and ephemeral sessions.

mod log;
mod snapshots;

pub use log::InMemoryEventLog;
pub use snapshots::{InMemoryCombatantRepository, InMemoryEffectRepository};
