//! Mutable combat state.
//!
//! [`CombatState`] bundles everything a cast or a scheduler tick may
//! mutate: combatant snapshots, the cooldown ledger and the scheduler's
//! active-effect set. Callers own it and pass it into the engine per call.
mod combatant;
mod common;
mod cooldown;
mod roster;

pub use combatant::{AttributeModifier, Combatant, ModifierSource};
pub use common::{ActiveEffectId, CombatantId, ResourceMeter, Tick};
pub use cooldown::CooldownLedger;
pub use roster::{CombatantStore, Roster};

use crate::config::CombatConfig;
use crate::scheduler::PeriodicScheduler;

/// Everything the engine mutates, in one place.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatState {
    /// Number of successful casts so far. Mixed into roll seeds.
    pub nonce: u64,
    pub roster: Roster,
    pub cooldowns: CooldownLedger,
    pub scheduler: PeriodicScheduler,
}

impl CombatState {
    pub fn new(roster: Roster, config: &CombatConfig) -> Self {
        Self {
            nonce: 0,
            roster,
            cooldowns: CooldownLedger::new(),
            scheduler: PeriodicScheduler::new(config.max_active_per_target),
        }
    }

    /// SHA-256 over the bincode encoding of the whole state.
    ///
    /// Two replays of the same event log must produce the same digest.
    #[cfg(feature = "serde")]
    pub fn digest(&self) -> Result<[u8; 32], bincode::Error> {
        use sha2::{Digest, Sha256};

        let bytes = bincode::serialize(self)?;
        Ok(Sha256::digest(&bytes).into())
    }
}
