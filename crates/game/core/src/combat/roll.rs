//! Seed derivation for the rolls of one cast.

use crate::env::compute_seed;
use crate::state::CombatantId;

/// What a roll decides. Each purpose gets its own seed per effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum RollPurpose {
    /// Bernoulli trial against `chance`.
    Chance = 0,
    /// Base magnitude inside `[value_min, value_max]`.
    Magnitude = 1,
}

/// Identifies one cast for seeding purposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RollContext {
    pub session_seed: u64,
    pub nonce: u64,
    pub caster: CombatantId,
}

impl RollContext {
    /// Purposes reserved per effect order.
    const SLOTS_PER_EFFECT: u32 = 4;

    pub fn new(session_seed: u64, nonce: u64, caster: CombatantId) -> Self {
        Self {
            session_seed,
            nonce,
            caster,
        }
    }

    pub fn seed(&self, order: u16, purpose: RollPurpose) -> u64 {
        let context = u32::from(order) * Self::SLOTS_PER_EFFECT + purpose as u32;
        compute_seed(self.session_seed, self.nonce, self.caster.0, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_effect_and_purpose_gets_its_own_seed() {
        let roll = RollContext::new(99, 3, CombatantId(1));
        let seeds = [
            roll.seed(1, RollPurpose::Chance),
            roll.seed(1, RollPurpose::Magnitude),
            roll.seed(2, RollPurpose::Chance),
            roll.seed(2, RollPurpose::Magnitude),
        ];
        for (i, a) in seeds.iter().enumerate() {
            for b in &seeds[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
