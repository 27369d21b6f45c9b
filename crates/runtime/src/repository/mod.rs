//! Repository layer for dynamic combat data.
//!
//! Repositories handle data that CHANGES during a session:
//! - Scheduler and combatant snapshots (for restart and rollback)
//! - The combat event log (for replay and audit)
//!
//! Ability content is static and lives in the catalog, not here.

mod error;
mod file;
mod memory;
mod snapshot;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use file::{FileCombatantRepository, FileEffectRepository, FileEventLog};
pub use memory::{InMemoryCombatantRepository, InMemoryEffectRepository, InMemoryEventLog};
pub use snapshot::{Checkpoint, SnapshotService};
pub use traits::{CombatantRepository, EffectRepository, EventRepository};
pub use types::CombatantRecord;
