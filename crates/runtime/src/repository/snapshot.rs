//! Snapshot service for coordinated checkpoint persistence.
//!
//! A checkpoint is written in two phases: the scheduler snapshot first,
//! then the combatant record. The combatant record is the commit point, so
//! if it exists the matching scheduler snapshot is guaranteed to exist.

use std::path::Path;

use combat_core::{CombatState, PeriodicScheduler};

use super::{
    CombatantRecord, CombatantRepository, EffectRepository, FileCombatantRepository,
    FileEffectRepository, InMemoryCombatantRepository, InMemoryEffectRepository,
    RepositoryError, Result,
};

/// A restored checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    /// Number of logged events the state reflects.
    pub sequence: u64,
    pub state: CombatState,
}

/// Saves and restores whole combat states through the two repositories.
pub struct SnapshotService {
    effects: Box<dyn EffectRepository>,
    combatants: Box<dyn CombatantRepository>,
}

impl SnapshotService {
    pub fn new(
        effects: Box<dyn EffectRepository>,
        combatants: Box<dyn CombatantRepository>,
    ) -> Self {
        Self {
            effects,
            combatants,
        }
    }

    /// File-based service storing `effects/` and `combatants/` under `base_dir`.
    pub fn file_based(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_path = base_dir.as_ref();
        Ok(Self::new(
            Box::new(FileEffectRepository::new(base_path.join("effects"))?),
            Box::new(FileCombatantRepository::new(base_path.join("combatants"))?),
        ))
    }

    pub fn in_memory() -> Self {
        Self::new(
            Box::new(InMemoryEffectRepository::new()),
            Box::new(InMemoryCombatantRepository::new()),
        )
    }

    /// Persists `state` as the checkpoint at `sequence`.
    pub fn save(&self, sequence: u64, state: &CombatState) -> Result<()> {
        // Phase 1: active effects
        self.effects.save(sequence, &state.scheduler.snapshot())?;

        // Phase 2: combatants (commit point)
        let record = CombatantRecord {
            nonce: state.nonce,
            roster: state.roster.clone(),
            cooldowns: state.cooldowns.clone(),
        };
        self.combatants.save(sequence, &record)?;

        tracing::info!(
            sequence,
            nonce = state.nonce,
            active_effects = state.scheduler.len(),
            "saved checkpoint"
        );
        Ok(())
    }

    /// Rebuilds the state stored at `sequence`.
    pub fn load(&self, sequence: u64) -> Result<Option<CombatState>> {
        let Some(record) = self.combatants.load(sequence)? else {
            return Ok(None);
        };
        let Some(snapshot) = self.effects.load(sequence)? else {
            return Err(RepositoryError::CorruptedData(format!(
                "checkpoint {} has combatants but no scheduler snapshot",
                sequence
            )));
        };

        Ok(Some(CombatState {
            nonce: record.nonce,
            roster: record.roster,
            cooldowns: record.cooldowns,
            scheduler: PeriodicScheduler::restore(snapshot),
        }))
    }

    /// The most recent committed checkpoint.
    pub fn latest(&self) -> Result<Option<Checkpoint>> {
        let Some(sequence) = self.combatants.list_sequences()?.last().copied() else {
            return Ok(None);
        };
        Ok(self
            .load(sequence)?
            .map(|state| Checkpoint { sequence, state }))
    }

    pub fn delete(&self, sequence: u64) -> Result<()> {
        self.combatants.delete(sequence)?;
        self.effects.delete(sequence)
    }

    pub fn effects(&self) -> &dyn EffectRepository {
        &*self.effects
    }

    pub fn combatants(&self) -> &dyn CombatantRepository {
        &*self.combatants
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{
        AttributeSet, CombatConfig, Combatant, CombatantId, ResourceMeter, Roster,
    };

    fn state() -> CombatState {
        let mut roster = Roster::new();
        roster.insert(Combatant::new(
            CombatantId(1),
            3,
            AttributeSet::default(),
            ResourceMeter::new(40, 90),
            ResourceMeter::full(20),
        ));
        let mut state = CombatState::new(roster, &CombatConfig::default());
        state.nonce = 5;
        state
    }

    #[test]
    fn latest_checkpoint_rebuilds_state() {
        let dir = tempfile::tempdir().unwrap();
        let service = SnapshotService::file_based(dir.path()).unwrap();
        let state = state();

        service.save(2, &CombatState::new(Roster::new(), &CombatConfig::default())).unwrap();
        service.save(9, &state).unwrap();

        let checkpoint = service.latest().unwrap().unwrap();
        assert_eq!(checkpoint.sequence, 9);
        assert_eq!(checkpoint.state, state);
    }

    #[test]
    fn missing_scheduler_half_is_corruption() {
        let service = SnapshotService::in_memory();
        service.save(1, &state()).unwrap();
        service.effects().delete(1).unwrap();

        assert!(matches!(
            service.load(1),
            Err(RepositoryError::CorruptedData(_))
        ));
    }
}
