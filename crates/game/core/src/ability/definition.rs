//! Flat content records and their validation.
//!
//! Definitions mirror the authored shape: one record per effect with every
//! kind-specific field optional. [`AbilityDefinition::validate`] is the only
//! way to turn them into an [`Ability`].

use std::str::FromStr;

use crate::stats::{Attribute, Stat};

use super::effect::{
    AttributeShift, Effect, EffectKind, EffectTarget, EffectType, Magnitude, PeriodicSpec,
    Scaling, ValueRange,
};
use super::error::ContentError;
use super::summary::AbilitySummary;
use super::{Ability, AbilityId, StatRequirement};

/// Authored ability record.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityDefinition {
    pub id: u32,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub resource_cost: u32,
    /// Milliseconds.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cooldown: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub required_level: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub required_primary_stat: Option<StatRequirementDefinition>,
    pub effects: Vec<EffectDefinition>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatRequirementDefinition {
    pub stat: String,
    pub minimum: i32,
}

/// Authored effect record. Which optional fields may be set depends on `effect_type`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectDefinition {
    pub effect_order: u16,
    pub effect_type: EffectType,
    pub target: EffectTarget,
    #[cfg_attr(feature = "serde", serde(default))]
    pub value_min: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub value_max: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stat_scaling: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub scaling_factor: Option<f32>,
    #[cfg_attr(feature = "serde", serde(default = "default_chance"))]
    pub chance: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tick_value: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tick_interval: Option<u64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tick_count: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration: Option<u64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub drain_percent: Option<f32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub attribute: Option<String>,
}

#[cfg(feature = "serde")]
fn default_chance() -> f32 {
    1.0
}

impl EffectDefinition {
    /// A record with only the mandatory fields set.
    pub fn new(effect_order: u16, effect_type: EffectType, target: EffectTarget) -> Self {
        Self {
            effect_order,
            effect_type,
            target,
            value_min: 0,
            value_max: 0,
            stat_scaling: None,
            scaling_factor: None,
            chance: 1.0,
            tick_value: None,
            tick_interval: None,
            tick_count: None,
            duration: None,
            drain_percent: None,
            attribute: None,
        }
    }

    fn has_tick_fields(&self) -> bool {
        self.tick_value.is_some()
            || self.tick_interval.is_some()
            || self.tick_count.is_some()
            || self.duration.is_some()
    }

    /// Validates this record and converts it into its typed variant.
    pub fn validate(&self, ability: &str) -> Result<Effect, ContentError> {
        let order = self.effect_order;
        let malformed = |reason: &str| ContentError::malformed(ability, order, reason);

        if !(0.0..=1.0).contains(&self.chance) {
            return Err(malformed("chance must lie in [0, 1]"));
        }
        if self.value_min > self.value_max {
            return Err(malformed("value_min exceeds value_max"));
        }

        let scaling = match (&self.stat_scaling, self.scaling_factor) {
            (None, None) => None,
            (Some(name), Some(factor)) => {
                let stat = Stat::from_str(name).map_err(|_| ContentError::UnknownStat {
                    ability: ability.to_string(),
                    name: name.clone(),
                })?;
                if !factor.is_finite() {
                    return Err(malformed("scaling_factor must be finite"));
                }
                Some(Scaling::new(stat, factor))
            }
            (Some(_), None) => return Err(malformed("stat_scaling without scaling_factor")),
            (None, Some(_)) => return Err(malformed("scaling_factor without stat_scaling")),
        };
        let magnitude = Magnitude {
            range: ValueRange::new(self.value_min, self.value_max),
            scaling,
        };

        if self.effect_type != EffectType::Drain && self.drain_percent.is_some() {
            return Err(malformed("drain_percent is only valid on drain effects"));
        }
        let is_shift = matches!(self.effect_type, EffectType::Buff | EffectType::Debuff);
        if !is_shift && self.attribute.is_some() {
            return Err(malformed("attribute is only valid on buff and debuff effects"));
        }

        let kind = match self.effect_type {
            EffectType::Damage | EffectType::Heal | EffectType::Drain => {
                if self.has_tick_fields() {
                    return Err(malformed("instantaneous effect carries tick fields"));
                }
                if magnitude.range.is_zero() {
                    return Err(malformed("instantaneous effect has a zero value range"));
                }
                match self.effect_type {
                    EffectType::Damage => EffectKind::Damage(magnitude),
                    EffectType::Heal => EffectKind::Heal(magnitude),
                    _ => {
                        let drain_percent = self
                            .drain_percent
                            .ok_or_else(|| malformed("drain effect without drain_percent"))?;
                        if !(0.0..=1.0).contains(&drain_percent) {
                            return Err(malformed("drain_percent must lie in [0, 1]"));
                        }
                        EffectKind::Drain {
                            magnitude,
                            drain_percent,
                        }
                    }
                }
            }
            EffectType::Dot | EffectType::Hot => {
                let periodic = self
                    .periodic(ability)?
                    .ok_or_else(|| malformed("periodic effect without tick fields"))?;
                if self.effect_type == EffectType::Dot {
                    EffectKind::DamageOverTime {
                        magnitude,
                        periodic,
                    }
                } else {
                    EffectKind::HealOverTime {
                        magnitude,
                        periodic,
                    }
                }
            }
            EffectType::Buff | EffectType::Debuff => {
                let name = self
                    .attribute
                    .as_deref()
                    .ok_or_else(|| malformed("buff or debuff without attribute"))?;
                let attribute =
                    Attribute::from_str(name).map_err(|_| ContentError::UnknownStat {
                        ability: ability.to_string(),
                        name: name.to_string(),
                    })?;
                let periodic = self.periodic(ability)?;
                if magnitude.range.is_zero() && periodic.is_none() {
                    return Err(malformed("untimed attribute shift has a zero value range"));
                }
                let shift = AttributeShift {
                    attribute,
                    magnitude,
                    periodic,
                };
                if self.effect_type == EffectType::Buff {
                    EffectKind::Buff(shift)
                } else {
                    EffectKind::Debuff(shift)
                }
            }
        };

        Ok(Effect {
            order,
            target: self.target,
            chance: self.chance,
            kind,
        })
    }

    /// Tick schedule, `None` when no tick field is set at all.
    fn periodic(&self, ability: &str) -> Result<Option<PeriodicSpec>, ContentError> {
        let malformed = |reason: &str| ContentError::malformed(ability, self.effect_order, reason);

        if !self.has_tick_fields() {
            return Ok(None);
        }
        let tick_value = self
            .tick_value
            .ok_or_else(|| malformed("missing tick_value"))?;
        let tick_interval = self
            .tick_interval
            .ok_or_else(|| malformed("missing tick_interval"))?;
        let tick_count = self
            .tick_count
            .ok_or_else(|| malformed("missing tick_count"))?;
        if tick_interval == 0 {
            return Err(malformed("tick_interval must be positive"));
        }
        if tick_count == 0 {
            return Err(malformed("tick_count must be at least 1"));
        }

        let spec = PeriodicSpec::new(tick_value, tick_interval, tick_count);
        let expected = tick_interval
            .checked_mul(u64::from(tick_count))
            .ok_or_else(|| malformed("duration overflows"))?;
        if let Some(duration) = self.duration
            && duration != expected
        {
            return Err(malformed(&format!(
                "duration {duration} does not equal tick_interval x tick_count ({expected})"
            )));
        }
        Ok(Some(spec))
    }
}

impl AbilityDefinition {
    /// Validates the record and every effect in it.
    pub fn validate(&self) -> Result<Ability, ContentError> {
        if self.name.trim().is_empty() {
            return Err(ContentError::MalformedAbility {
                ability: format!("#{}", self.id),
                reason: "name is empty".to_string(),
            });
        }
        if self.effects.is_empty() {
            return Err(ContentError::EmptyAbility(self.name.clone()));
        }

        let required_primary_stat = self
            .required_primary_stat
            .as_ref()
            .map(|requirement| {
                Stat::from_str(&requirement.stat)
                    .map(|stat| StatRequirement {
                        stat,
                        minimum: requirement.minimum,
                    })
                    .map_err(|_| ContentError::UnknownStat {
                        ability: self.name.clone(),
                        name: requirement.stat.clone(),
                    })
            })
            .transpose()?;

        let mut effects = self
            .effects
            .iter()
            .map(|definition| definition.validate(&self.name))
            .collect::<Result<Vec<_>, _>>()?;
        effects.sort_by_key(|effect| effect.order);

        for (expected, effect) in (1u16..).zip(&effects) {
            if effect.order != expected {
                return Err(ContentError::NonContiguousOrder {
                    ability: self.name.clone(),
                    expected,
                    found: effect.order,
                });
            }
        }

        let summary = AbilitySummary::from_effects(&effects);
        Ok(Ability {
            id: AbilityId(self.id),
            name: self.name.clone(),
            description: self.description.clone(),
            resource_cost: self.resource_cost,
            cooldown: self.cooldown,
            required_level: self.required_level,
            required_primary_stat,
            effects,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot() -> EffectDefinition {
        EffectDefinition {
            stat_scaling: Some("intelligence".into()),
            scaling_factor: Some(0.2),
            tick_value: Some(8),
            tick_interval: Some(2_000),
            tick_count: Some(4),
            ..EffectDefinition::new(1, EffectType::Dot, EffectTarget::Enemy)
        }
    }

    fn reason(error: ContentError) -> String {
        match error {
            ContentError::MalformedEffect { reason, .. } => reason,
            other => panic!("expected MalformedEffect, got {other:?}"),
        }
    }

    #[test]
    fn periodic_effect_becomes_typed_variant() {
        let effect = dot().validate("Rot").unwrap();
        assert_eq!(
            effect.kind,
            EffectKind::DamageOverTime {
                magnitude: Magnitude::scaled(0, 0, Scaling::new(Stat::Intelligence, 0.2)),
                periodic: PeriodicSpec::new(8, 2_000, 4),
            }
        );
        assert!(!effect.kind.has_instant_portion());
    }

    #[test]
    fn duration_must_match_tick_schedule() {
        let ok = EffectDefinition {
            duration: Some(8_000),
            ..dot()
        };
        assert!(ok.validate("Rot").is_ok());

        let bad = EffectDefinition {
            duration: Some(9_000),
            ..dot()
        };
        assert!(reason(bad.validate("Rot").unwrap_err()).contains("duration"));
    }

    #[test]
    fn periodic_effect_requires_interval() {
        let bad = EffectDefinition {
            tick_interval: None,
            ..dot()
        };
        assert_eq!(
            reason(bad.validate("Rot").unwrap_err()),
            "missing tick_interval"
        );

        let zero = EffectDefinition {
            tick_interval: Some(0),
            ..dot()
        };
        assert!(zero.validate("Rot").is_err());
    }

    #[test]
    fn instant_effects_reject_foreign_fields() {
        let with_ticks = EffectDefinition {
            value_min: 5,
            value_max: 9,
            tick_count: Some(3),
            ..EffectDefinition::new(1, EffectType::Damage, EffectTarget::Enemy)
        };
        assert!(with_ticks.validate("Bolt").is_err());

        let with_drain = EffectDefinition {
            value_min: 5,
            value_max: 9,
            drain_percent: Some(0.5),
            ..EffectDefinition::new(1, EffectType::Heal, EffectTarget::Caster)
        };
        assert!(reason(with_drain.validate("Mend").unwrap_err()).contains("drain_percent"));
    }

    #[test]
    fn drain_requires_a_valid_percentage() {
        let base = EffectDefinition {
            value_min: 20,
            value_max: 20,
            ..EffectDefinition::new(1, EffectType::Drain, EffectTarget::Enemy)
        };
        assert!(base.validate("Siphon").is_err());

        let over = EffectDefinition {
            drain_percent: Some(1.5),
            ..base.clone()
        };
        assert!(over.validate("Siphon").is_err());

        let ok = EffectDefinition {
            drain_percent: Some(0.5),
            ..base
        };
        assert!(matches!(
            ok.validate("Siphon").unwrap().kind,
            EffectKind::Drain { drain_percent, .. } if drain_percent == 0.5
        ));
    }

    #[test]
    fn buff_attribute_must_be_known() {
        let buff = EffectDefinition {
            value_min: 3,
            value_max: 3,
            attribute: Some("charisma".into()),
            ..EffectDefinition::new(1, EffectType::Buff, EffectTarget::Caster)
        };
        assert_eq!(
            buff.validate("Aura").unwrap_err(),
            ContentError::UnknownStat {
                ability: "Aura".into(),
                name: "charisma".into()
            }
        );
    }

    #[test]
    fn orders_must_start_at_one_without_gaps() {
        let damage = |order| EffectDefinition {
            value_min: 1,
            value_max: 2,
            ..EffectDefinition::new(order, EffectType::Damage, EffectTarget::Enemy)
        };
        let ability = AbilityDefinition {
            id: 1,
            name: "Flurry".into(),
            description: None,
            resource_cost: 0,
            cooldown: 0,
            required_level: 0,
            required_primary_stat: None,
            effects: vec![damage(3), damage(1)],
        };
        assert_eq!(
            ability.validate().unwrap_err(),
            ContentError::NonContiguousOrder {
                ability: "Flurry".into(),
                expected: 2,
                found: 3
            }
        );

        let fixed = AbilityDefinition {
            effects: vec![damage(2), damage(1)],
            ..ability
        };
        let orders: Vec<_> = fixed
            .validate()
            .unwrap()
            .effects()
            .iter()
            .map(|e| e.order)
            .collect();
        assert_eq!(orders, vec![1, 2]);
    }
}
