use crate::ability::{AbilityId, EffectType};
use crate::state::{ActiveEffectId, CombatantId, Tick};

use super::errors::EffectFault;

/// Outcome of one effect that passed its chance roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AppliedEffect {
    pub order: u16,
    pub effect_type: EffectType,
    pub recipient: CombatantId,
    pub rolled_value: u32,
    pub scaling_bonus: i32,
    /// Health change actually made (after clamping), or the signed size of
    /// the attribute modifier for buffs and debuffs.
    pub applied: u32,
    /// Resource returned to the caster by a drain.
    pub drained: u32,
    /// Scheduler entry for periodic effects.
    pub active_effect: Option<ActiveEffectId>,
}

/// Everything a committed cast did.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CastResult {
    pub ability: AbilityId,
    pub caster: CombatantId,
    pub target: CombatantId,
    pub cast_at: Tick,
    /// Cast sequence number used to seed this cast's rolls.
    pub nonce: u64,
    pub resource_spent: u32,
    pub applied_effects: Vec<AppliedEffect>,
    /// Non-aborting per-effect faults, in effect order.
    pub errors: Vec<EffectFault>,
    /// Scheduler entries cancelled because a recipient died during the cast.
    pub cancelled_effects: Vec<ActiveEffectId>,
}

impl CastResult {
    pub fn applied(&self, order: u16) -> Option<&AppliedEffect> {
        self.applied_effects.iter().find(|effect| effect.order == order)
    }

    /// Total health removed from `recipient` by instantaneous damage and drains.
    pub fn damage_to(&self, recipient: CombatantId) -> u64 {
        self.applied_effects
            .iter()
            .filter(|effect| effect.recipient == recipient)
            .filter(|effect| {
                matches!(
                    effect.effect_type,
                    EffectType::Damage | EffectType::Drain | EffectType::Dot
                )
            })
            .map(|effect| u64::from(effect.applied))
            .sum()
    }

    pub fn was_resisted(&self, order: u16) -> bool {
        self.errors
            .iter()
            .any(|fault| matches!(fault, EffectFault::Resisted { order: o } if *o == order))
    }
}
