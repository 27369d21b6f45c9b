//! In-memory snapshot repositories.

use std::collections::BTreeMap;
use std::sync::RwLock;

use combat_core::SchedulerSnapshot;

use crate::repository::{
    CombatantRecord, CombatantRepository, EffectRepository, RepositoryError, Result,
};

/// Sequence-indexed values behind a lock.
struct SequenceMap<T> {
    values: RwLock<BTreeMap<u64, T>>,
}

impl<T: Clone> SequenceMap<T> {
    fn new() -> Self {
        Self {
            values: RwLock::new(BTreeMap::new()),
        }
    }

    fn save(&self, sequence: u64, value: &T) -> Result<()> {
        let mut values = self
            .values
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        values.insert(sequence, value.clone());
        Ok(())
    }

    fn load(&self, sequence: u64) -> Result<Option<T>> {
        let values = self
            .values
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(values.get(&sequence).cloned())
    }

    fn exists(&self, sequence: u64) -> bool {
        self.values
            .read()
            .map(|values| values.contains_key(&sequence))
            .unwrap_or(false)
    }

    fn delete(&self, sequence: u64) -> Result<()> {
        let mut values = self
            .values
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        values.remove(&sequence);
        Ok(())
    }

    fn list_sequences(&self) -> Result<Vec<u64>> {
        let values = self
            .values
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(values.keys().copied().collect())
    }
}

/// In-memory implementation of [`EffectRepository`].
pub struct InMemoryEffectRepository {
    snapshots: SequenceMap<SchedulerSnapshot>,
}

impl InMemoryEffectRepository {
    pub fn new() -> Self {
        Self {
            snapshots: SequenceMap::new(),
        }
    }
}

impl Default for InMemoryEffectRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectRepository for InMemoryEffectRepository {
    fn save(&self, sequence: u64, snapshot: &SchedulerSnapshot) -> Result<()> {
        self.snapshots.save(sequence, snapshot)
    }

    fn load(&self, sequence: u64) -> Result<Option<SchedulerSnapshot>> {
        self.snapshots.load(sequence)
    }

    fn exists(&self, sequence: u64) -> bool {
        self.snapshots.exists(sequence)
    }

    fn delete(&self, sequence: u64) -> Result<()> {
        self.snapshots.delete(sequence)
    }

    fn list_sequences(&self) -> Result<Vec<u64>> {
        self.snapshots.list_sequences()
    }
}

/// In-memory implementation of [`CombatantRepository`].
pub struct InMemoryCombatantRepository {
    records: SequenceMap<CombatantRecord>,
}

impl InMemoryCombatantRepository {
    pub fn new() -> Self {
        Self {
            records: SequenceMap::new(),
        }
    }
}

impl Default for InMemoryCombatantRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl CombatantRepository for InMemoryCombatantRepository {
    fn save(&self, sequence: u64, record: &CombatantRecord) -> Result<()> {
        self.records.save(sequence, record)
    }

    fn load(&self, sequence: u64) -> Result<Option<CombatantRecord>> {
        self.records.load(sequence)
    }

    fn exists(&self, sequence: u64) -> bool {
        self.records.exists(sequence)
    }

    fn delete(&self, sequence: u64) -> Result<()> {
        self.records.delete(sequence)
    }

    fn list_sequences(&self) -> Result<Vec<u64>> {
        self.records.list_sequences()
    }
}
