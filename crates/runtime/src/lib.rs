//! Runtime orchestration for combat sessions.
//!
//! This crate wires the pure `combat-core` engine into a long-running
//! service. Consumers embed [`Runtime`] to cast abilities, drive periodic
//! ticks, subscribe to events and persist state through [`CombatHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`repository`] persists snapshots and the event log
//! - [`replay`] rebuilds state from an event log and digests the result
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod replay;
pub mod repository;
pub mod runtime;

mod workers;

pub use api::{CombatHandle, Result, RuntimeError};
pub use events::{CombatEvent, EventBus, Topic};
pub use replay::{ReplayOutcome, replay, state_digest};
pub use repository::{
    Checkpoint, CombatantRecord, CombatantRepository, EffectRepository, EventRepository,
    FileCombatantRepository, FileEffectRepository, FileEventLog, InMemoryCombatantRepository,
    InMemoryEffectRepository, InMemoryEventLog, RepositoryError, SnapshotService,
};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use workers::TickDriver;
