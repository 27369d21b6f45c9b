//! Maps a combatant to the scalar values used by scaling formulas.

use std::str::FromStr;

use crate::ability::{Scaling, StatRequirement};
use crate::config::CombatConfig;
use crate::engine::ValidationError;
use crate::state::Combatant;

use super::attributes::Stat;

/// Resolves named stats on a combatant.
///
/// Attribute values include active modifiers and never drop below zero.
/// An attribute equal to [`StatResolver::BASELINE`] contributes no scaling.
pub struct StatResolver;

impl StatResolver {
    pub const BASELINE: i32 = CombatConfig::STAT_BASELINE;

    /// Resolve a stat by its content name (e.g. `"intelligence"`).
    pub fn resolve(combatant: &Combatant, name: &str) -> Result<i32, ValidationError> {
        let stat =
            Stat::from_str(name).map_err(|_| ValidationError::UnknownStat(name.to_string()))?;
        Ok(Self::value(combatant, stat))
    }

    /// Resolve an already-parsed stat.
    pub fn value(combatant: &Combatant, stat: Stat) -> i32 {
        if let Some(attribute) = stat.attribute() {
            return combatant.attribute(attribute);
        }
        let raw = match stat {
            Stat::Level => combatant.level,
            Stat::Health => combatant.health.current,
            Stat::MaxHealth => combatant.health.maximum,
            Stat::Resource => combatant.resource.current,
            Stat::MaxResource => combatant.resource.maximum,
            _ => 0,
        };
        i32::try_from(raw).unwrap_or(i32::MAX)
    }

    /// Linear bonus relative to the baseline: `floor((value - 10) * factor)`.
    pub fn scaling_bonus(combatant: &Combatant, scaling: &Scaling) -> i32 {
        let delta = Self::value(combatant, scaling.stat) - Self::BASELINE;
        (f64::from(delta) * f64::from(scaling.factor)).floor() as i32
    }

    /// True when the combatant satisfies a stat requirement.
    pub fn meets(combatant: &Combatant, requirement: &StatRequirement) -> bool {
        Self::value(combatant, requirement.stat) >= requirement.minimum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AttributeModifier, CombatantId, ModifierSource};
    use crate::stats::{Attribute, AttributeSet};
    use crate::{ActiveEffectId, ResourceMeter};

    fn caster(intelligence: i32) -> Combatant {
        Combatant::new(
            CombatantId(1),
            5,
            AttributeSet::default().with(Attribute::Intelligence, intelligence),
            ResourceMeter::full(100),
            ResourceMeter::new(40, 80),
        )
    }

    #[test]
    fn resolves_attributes_and_pools_by_name() {
        let c = caster(30);
        assert_eq!(StatResolver::resolve(&c, "intelligence"), Ok(30));
        assert_eq!(StatResolver::resolve(&c, "level"), Ok(5));
        assert_eq!(StatResolver::resolve(&c, "resource"), Ok(40));
        assert_eq!(StatResolver::resolve(&c, "max_resource"), Ok(80));
    }

    #[test]
    fn unknown_names_are_rejected() {
        let c = caster(10);
        assert_eq!(
            StatResolver::resolve(&c, "luck"),
            Err(ValidationError::UnknownStat("luck".to_string()))
        );
    }

    #[test]
    fn baseline_yields_no_bonus() {
        let scaling = Scaling::new(Stat::Intelligence, 2.5);
        assert_eq!(StatResolver::scaling_bonus(&caster(10), &scaling), 0);
        assert_eq!(StatResolver::scaling_bonus(&caster(30), &scaling), 50);
        assert_eq!(StatResolver::scaling_bonus(&caster(6), &scaling), -10);
    }

    #[test]
    fn modifiers_feed_into_resolution() {
        let mut c = caster(10);
        assert!(c.add_modifier(AttributeModifier {
            source: ModifierSource::Effect(ActiveEffectId(1)),
            attribute: Attribute::Intelligence,
            amount: 8,
        }));
        assert_eq!(StatResolver::resolve(&c, "intelligence"), Ok(18));
    }

    #[test]
    fn bonus_is_monotonic_for_positive_factors() {
        let scaling = Scaling::new(Stat::Intelligence, 0.3);
        let mut previous = i32::MIN;
        for value in 0..60 {
            let bonus = StatResolver::scaling_bonus(&caster(value), &scaling);
            assert!(bonus >= previous);
            previous = bonus;
        }
    }
}
