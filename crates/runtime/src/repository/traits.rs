//! Repository contracts for saving and loading mutable combat state.
//!
//! Snapshots are keyed by checkpoint sequence: the number of events the
//! worker had logged when the snapshot was taken. Replaying the log from
//! that index on top of the snapshot reaches the live state.

use combat_core::SchedulerSnapshot;

use super::error::Result;
use super::types::CombatantRecord;
use crate::events::CombatEvent;

/// Repository for scheduler snapshots (every live ActiveEffect).
pub trait EffectRepository: Send + Sync {
    fn save(&self, sequence: u64, snapshot: &SchedulerSnapshot) -> Result<()>;

    fn load(&self, sequence: u64) -> Result<Option<SchedulerSnapshot>>;

    fn exists(&self, sequence: u64) -> bool;

    fn delete(&self, sequence: u64) -> Result<()>;

    /// Every stored sequence, ascending.
    fn list_sequences(&self) -> Result<Vec<u64>>;
}

/// Repository for combatant snapshots.
pub trait CombatantRepository: Send + Sync {
    fn save(&self, sequence: u64, record: &CombatantRecord) -> Result<()>;

    fn load(&self, sequence: u64) -> Result<Option<CombatantRecord>>;

    fn exists(&self, sequence: u64) -> bool;

    fn delete(&self, sequence: u64) -> Result<()>;

    /// Every stored sequence, ascending.
    fn list_sequences(&self) -> Result<Vec<u64>>;
}

/// Append-only combat event log.
///
/// # File Format
///
/// Each entry is stored as:
/// ```text
/// [u32 length][bincode serialized CombatEvent]
/// ```
pub trait EventRepository: Send {
    /// Append an event, returning the offset it was written at.
    fn append(&mut self, event: &CombatEvent) -> Result<u64>;

    /// Read the event at `offset`.
    ///
    /// Returns `Some((event, next_offset))`, or `None` past the end of the log.
    fn read_at_offset(&self, offset: u64) -> Result<Option<(CombatEvent, u64)>>;

    /// Flush buffered writes
    fn flush(&mut self) -> Result<()>;

    /// Current size of the log, in the implementation's offset unit
    fn size(&self) -> Result<u64>;

    fn session_id(&self) -> &str;

    /// Every event from the start of the log, in order.
    fn read_all(&self) -> Result<Vec<CombatEvent>> {
        let mut events = Vec::new();
        let mut offset = 0;
        while let Some((event, next)) = self.read_at_offset(offset)? {
            events.push(event);
            offset = next;
        }
        Ok(events)
    }
}
