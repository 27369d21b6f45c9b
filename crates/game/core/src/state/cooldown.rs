use std::collections::BTreeMap;

use crate::ability::AbilityId;

use super::common::{CombatantId, Tick};

/// Last cast time of every (caster, ability) pair.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CooldownLedger {
    last_cast: BTreeMap<(CombatantId, AbilityId), Tick>,
}

impl CooldownLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_cast(&self, caster: CombatantId, ability: AbilityId) -> Option<Tick> {
        self.last_cast.get(&(caster, ability)).copied()
    }

    /// Earliest tick at which the ability may be cast again.
    ///
    /// `None` means it has never been cast by this caster.
    pub fn ready_at(&self, caster: CombatantId, ability: AbilityId, cooldown: u64) -> Option<Tick> {
        self.last_cast(caster, ability)
            .map(|at| at.saturating_add(cooldown))
    }

    pub fn is_ready(&self, caster: CombatantId, ability: AbilityId, cooldown: u64, now: Tick) -> bool {
        self.ready_at(caster, ability, cooldown)
            .is_none_or(|ready| now >= ready)
    }

    pub fn record(&mut self, caster: CombatantId, ability: AbilityId, now: Tick) {
        self.last_cast.insert((caster, ability), now);
    }

    /// Forgets every cooldown held by a combatant (e.g. on removal from combat).
    pub fn clear_caster(&mut self, caster: CombatantId) {
        self.last_cast.retain(|(who, _), _| *who != caster);
    }
}
