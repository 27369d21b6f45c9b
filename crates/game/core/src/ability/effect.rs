//! Validated effect variants.
//!
//! Content arrives as flat records where every kind-specific field is
//! optional. After validation each effect becomes one [`EffectKind`] variant
//! that holds only the fields its kind uses, so a damage effect carrying a
//! drain percentage or a heal carrying tick fields cannot be represented.

use strum::{Display, EnumString, IntoStaticStr};

use crate::scheduler::PeriodicKind;
use crate::stats::{Attribute, Stat};

/// Effect kind tag as it appears in content (`effect_type`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EffectType {
    Damage,
    Heal,
    Dot,
    Hot,
    Drain,
    Buff,
    Debuff,
}

/// Who receives an effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectTarget {
    /// The caster.
    #[strum(to_string = "self", serialize = "caster")]
    #[cfg_attr(feature = "serde", serde(rename = "self", alias = "caster"))]
    Caster,
    /// The cast's target.
    #[strum(serialize = "enemy")]
    #[cfg_attr(feature = "serde", serde(rename = "enemy"))]
    Enemy,
}

/// Inclusive integer range for instantaneous magnitudes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueRange {
    pub min: u32,
    pub max: u32,
}

impl ValueRange {
    pub const ZERO: Self = Self { min: 0, max: 0 };

    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub const fn is_zero(&self) -> bool {
        self.max == 0
    }

    /// Component-wise saturating sum.
    pub const fn combine(self, other: Self) -> Self {
        Self {
            min: self.min.saturating_add(other.min),
            max: self.max.saturating_add(other.max),
        }
    }
}

/// Linear stat scaling: `(stat - 10) * factor`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scaling {
    pub stat: Stat,
    pub factor: f32,
}

impl Scaling {
    pub const fn new(stat: Stat, factor: f32) -> Self {
        Self { stat, factor }
    }
}

/// Instantaneous magnitude: a rolled base plus optional stat scaling.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Magnitude {
    pub range: ValueRange,
    pub scaling: Option<Scaling>,
}

impl Magnitude {
    pub const fn flat(min: u32, max: u32) -> Self {
        Self {
            range: ValueRange::new(min, max),
            scaling: None,
        }
    }

    pub const fn scaled(min: u32, max: u32, scaling: Scaling) -> Self {
        Self {
            range: ValueRange::new(min, max),
            scaling: Some(scaling),
        }
    }
}

/// Tick schedule of a periodic effect. `duration == tick_interval * tick_count`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeriodicSpec {
    pub tick_value: u32,
    /// Milliseconds between ticks, always > 0.
    pub tick_interval: u64,
    /// Number of ticks, always >= 1.
    pub tick_count: u32,
}

impl PeriodicSpec {
    pub const fn new(tick_value: u32, tick_interval: u64, tick_count: u32) -> Self {
        Self {
            tick_value,
            tick_interval,
            tick_count,
        }
    }

    pub const fn duration(&self) -> u64 {
        self.tick_interval * self.tick_count as u64
    }

    /// Unscaled sum of all ticks.
    pub const fn total(&self) -> u64 {
        self.tick_value as u64 * self.tick_count as u64
    }
}

/// Attribute change applied by a buff or debuff.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeShift {
    pub attribute: Attribute,
    pub magnitude: Magnitude,
    /// Present for time-bound shifts; the modifier lasts for the tick schedule.
    pub periodic: Option<PeriodicSpec>,
}

/// One validated effect variant.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    Damage(Magnitude),
    Heal(Magnitude),
    /// Damage that also refills the caster's resource by a share of the roll.
    Drain {
        magnitude: Magnitude,
        drain_percent: f32,
    },
    DamageOverTime {
        magnitude: Magnitude,
        periodic: PeriodicSpec,
    },
    HealOverTime {
        magnitude: Magnitude,
        periodic: PeriodicSpec,
    },
    Buff(AttributeShift),
    Debuff(AttributeShift),
}

impl EffectKind {
    pub const fn effect_type(&self) -> EffectType {
        match self {
            Self::Damage(_) => EffectType::Damage,
            Self::Heal(_) => EffectType::Heal,
            Self::Drain { .. } => EffectType::Drain,
            Self::DamageOverTime { .. } => EffectType::Dot,
            Self::HealOverTime { .. } => EffectType::Hot,
            Self::Buff(_) => EffectType::Buff,
            Self::Debuff(_) => EffectType::Debuff,
        }
    }

    pub const fn magnitude(&self) -> &Magnitude {
        match self {
            Self::Damage(m) | Self::Heal(m) => m,
            Self::Drain { magnitude, .. }
            | Self::DamageOverTime { magnitude, .. }
            | Self::HealOverTime { magnitude, .. } => magnitude,
            Self::Buff(shift) | Self::Debuff(shift) => &shift.magnitude,
        }
    }

    pub const fn periodic(&self) -> Option<&PeriodicSpec> {
        match self {
            Self::DamageOverTime { periodic, .. } | Self::HealOverTime { periodic, .. } => {
                Some(periodic)
            }
            Self::Buff(shift) | Self::Debuff(shift) => shift.periodic.as_ref(),
            Self::Damage(_) | Self::Heal(_) | Self::Drain { .. } => None,
        }
    }

    /// How the scheduler should apply ticks, for periodic variants.
    pub const fn periodic_kind(&self) -> Option<PeriodicKind> {
        match self {
            Self::DamageOverTime { .. } => Some(PeriodicKind::DamageOverTime),
            Self::HealOverTime { .. } => Some(PeriodicKind::HealOverTime),
            Self::Buff(AttributeShift {
                periodic: Some(_), ..
            }) => Some(PeriodicKind::Buff),
            Self::Debuff(AttributeShift {
                periodic: Some(_), ..
            }) => Some(PeriodicKind::Debuff),
            _ => None,
        }
    }

    /// Periodic variants only apply an instant portion when their range is non-zero.
    pub const fn has_instant_portion(&self) -> bool {
        match self {
            Self::DamageOverTime { magnitude, .. } | Self::HealOverTime { magnitude, .. } => {
                !magnitude.range.is_zero()
            }
            _ => true,
        }
    }
}

/// An effect inside an ability, with its position in the application order.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Effect {
    /// 1-based, contiguous within the owning ability.
    pub order: u16,
    pub target: EffectTarget,
    /// Probability in `[0, 1]` that the effect applies.
    pub chance: f32,
    pub kind: EffectKind,
}

impl Effect {
    pub const fn new(order: u16, target: EffectTarget, kind: EffectKind) -> Self {
        Self {
            order,
            target,
            chance: 1.0,
            kind,
        }
    }

    #[must_use]
    pub const fn with_chance(mut self, chance: f32) -> Self {
        self.chance = chance;
        self
    }
}
