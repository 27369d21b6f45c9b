use super::effect::{Effect, EffectKind, ValueRange};

/// Display aggregates of an ability, derived from its effects.
///
/// Values are unscaled base magnitudes. The summary is rebuilt whenever an
/// ability is validated and has no authored counterpart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilitySummary {
    /// Sum of instantaneous damage ranges (damage, drain, dot openers).
    pub instant_damage: ValueRange,
    /// Sum of instantaneous heal ranges (heal, hot openers).
    pub instant_healing: ValueRange,
    /// Total unscaled damage dealt by every dot tick.
    pub periodic_damage: u64,
    /// Total unscaled healing done by every hot tick.
    pub periodic_healing: u64,
    /// Longest periodic duration in milliseconds.
    pub longest_duration: u64,
    pub effect_count: usize,
}

impl AbilitySummary {
    pub fn from_effects(effects: &[Effect]) -> Self {
        let mut summary = Self {
            effect_count: effects.len(),
            ..Self::default()
        };

        for effect in effects {
            let kind = &effect.kind;
            let range = kind.magnitude().range;
            match kind {
                EffectKind::Damage(_) | EffectKind::Drain { .. } => {
                    summary.instant_damage = summary.instant_damage.combine(range);
                }
                EffectKind::Heal(_) => {
                    summary.instant_healing = summary.instant_healing.combine(range);
                }
                EffectKind::DamageOverTime { periodic, .. } => {
                    summary.instant_damage = summary.instant_damage.combine(range);
                    summary.periodic_damage += periodic.total();
                }
                EffectKind::HealOverTime { periodic, .. } => {
                    summary.instant_healing = summary.instant_healing.combine(range);
                    summary.periodic_healing += periodic.total();
                }
                EffectKind::Buff(_) | EffectKind::Debuff(_) => {}
            }
            if let Some(periodic) = kind.periodic() {
                summary.longest_duration = summary.longest_duration.max(periodic.duration());
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::{EffectTarget, Magnitude, PeriodicSpec};

    #[test]
    fn aggregates_are_derived_from_effects() {
        let effects = [
            Effect::new(1, EffectTarget::Enemy, EffectKind::Damage(Magnitude::flat(12, 18))),
            Effect::new(
                2,
                EffectTarget::Enemy,
                EffectKind::DamageOverTime {
                    magnitude: Magnitude::flat(0, 0),
                    periodic: PeriodicSpec::new(5, 1_000, 6),
                },
            ),
            Effect::new(
                3,
                EffectTarget::Caster,
                EffectKind::HealOverTime {
                    magnitude: Magnitude::flat(10, 10),
                    periodic: PeriodicSpec::new(40, 3_000, 5),
                },
            ),
        ];

        let summary = AbilitySummary::from_effects(&effects);
        assert_eq!(summary.instant_damage, ValueRange::new(12, 18));
        assert_eq!(summary.instant_healing, ValueRange::new(10, 10));
        assert_eq!(summary.periodic_damage, 30);
        assert_eq!(summary.periodic_healing, 200);
        assert_eq!(summary.longest_duration, 15_000);
        assert_eq!(summary.effect_count, 3);
    }
}
