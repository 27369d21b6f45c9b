//! Combatant snapshots.
//!
//! A combatant is owned by the session layer and handed to the engine by id.
//! Only the fields the engine reads or mutates live here.

use arrayvec::ArrayVec;

use crate::config::CombatConfig;
use crate::scheduler::EffectRef;
use crate::stats::{Attribute, AttributeSet};

use super::common::{ActiveEffectId, CombatantId, ResourceMeter};

/// What installed an attribute modifier, and therefore what removes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModifierSource {
    /// Owned by a time-bound buff/debuff; removed when that effect ends.
    Effect(ActiveEffectId),
    /// Installed by an untimed buff/debuff; lasts until dispelled.
    Untimed(EffectRef),
}

/// Signed adjustment to one primary attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeModifier {
    pub source: ModifierSource,
    pub attribute: Attribute,
    pub amount: i32,
}

/// Health, resource and attributes of one participant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combatant {
    pub id: CombatantId,
    pub level: u32,
    pub attributes: AttributeSet,
    pub health: ResourceMeter,
    pub resource: ResourceMeter,
    #[cfg_attr(feature = "serde", serde(default))]
    modifiers: ArrayVec<AttributeModifier, { CombatConfig::MAX_MODIFIERS }>,
}

impl Combatant {
    pub fn new(
        id: CombatantId,
        level: u32,
        attributes: AttributeSet,
        health: ResourceMeter,
        resource: ResourceMeter,
    ) -> Self {
        Self {
            id,
            level,
            attributes,
            health,
            resource,
            modifiers: ArrayVec::new(),
        }
    }

    /// Effective attribute value: base plus every modifier, floored at zero.
    pub fn attribute(&self, attribute: Attribute) -> i32 {
        let shift: i32 = self
            .modifiers
            .iter()
            .filter(|m| m.attribute == attribute)
            .map(|m| m.amount)
            .sum();
        self.attributes.get(attribute).saturating_add(shift).max(0)
    }

    pub fn is_defeated(&self) -> bool {
        self.health.is_depleted()
    }

    pub fn has_modifier_capacity(&self) -> bool {
        !self.modifiers.is_full()
    }

    /// Installs a modifier. Returns false when every slot is taken.
    pub fn add_modifier(&mut self, modifier: AttributeModifier) -> bool {
        self.modifiers.try_push(modifier).is_ok()
    }

    /// Removes every modifier installed by the given periodic effect.
    pub fn remove_modifiers_from(&mut self, effect: ActiveEffectId) -> usize {
        let before = self.modifiers.len();
        self.modifiers
            .retain(|m| m.source != ModifierSource::Effect(effect));
        before - self.modifiers.len()
    }

    /// Removes every untimed modifier (dispel).
    pub fn dispel_untimed(&mut self) -> usize {
        let before = self.modifiers.len();
        self.modifiers
            .retain(|m| !matches!(m.source, ModifierSource::Untimed(_)));
        before - self.modifiers.len()
    }

    pub fn modifiers(&self) -> impl Iterator<Item = &AttributeModifier> {
        self.modifiers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::AbilityId;

    fn combatant() -> Combatant {
        Combatant::new(
            CombatantId(3),
            1,
            AttributeSet::default(),
            ResourceMeter::full(100),
            ResourceMeter::full(50),
        )
    }

    #[test]
    fn effective_attribute_never_goes_negative() {
        let mut c = combatant();
        c.add_modifier(AttributeModifier {
            source: ModifierSource::Effect(ActiveEffectId(9)),
            attribute: Attribute::Strength,
            amount: -25,
        });
        assert_eq!(c.attribute(Attribute::Strength), 0);
    }

    #[test]
    fn removal_is_scoped_to_the_owning_effect() {
        let mut c = combatant();
        let untimed = ModifierSource::Untimed(EffectRef::new(AbilityId(4), 2));
        c.add_modifier(AttributeModifier {
            source: ModifierSource::Effect(ActiveEffectId(1)),
            attribute: Attribute::Agility,
            amount: 3,
        });
        c.add_modifier(AttributeModifier {
            source: untimed,
            attribute: Attribute::Agility,
            amount: 4,
        });
        assert_eq!(c.attribute(Attribute::Agility), 17);

        assert_eq!(c.remove_modifiers_from(ActiveEffectId(1)), 1);
        assert_eq!(c.attribute(Attribute::Agility), 14);

        assert_eq!(c.dispel_untimed(), 1);
        assert_eq!(c.attribute(Attribute::Agility), 10);
    }

    #[test]
    fn modifier_slots_are_bounded() {
        let mut c = combatant();
        for n in 0..CombatConfig::MAX_MODIFIERS {
            assert!(c.add_modifier(AttributeModifier {
                source: ModifierSource::Effect(ActiveEffectId(n as u64)),
                attribute: Attribute::Spirit,
                amount: 1,
            }));
        }
        assert!(!c.has_modifier_capacity());
        assert!(!c.add_modifier(AttributeModifier {
            source: ModifierSource::Effect(ActiveEffectId(99)),
            attribute: Attribute::Spirit,
            amount: 1,
        }));
    }
}
