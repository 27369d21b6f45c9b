//! Instantaneous numeric outcome of one effect.

use crate::ability::Effect;
use crate::env::RngOracle;
use crate::state::Combatant;
use crate::stats::StatResolver;

use super::roll::{RollContext, RollPurpose};

/// Rolled magnitude of one effect for one cast.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvaluatedEffect {
    /// Uniform draw from `[value_min, value_max]`.
    pub base: u32,
    /// Stat bonus relative to the baseline. Frozen into periodic ticks.
    pub scaling_bonus: i32,
    /// `max(0, base + scaling_bonus)`.
    pub rolled_value: u32,
}

impl EvaluatedEffect {
    /// Amount one periodic tick applies: `max(0, tick_value + scaling_bonus)`.
    pub fn tick_amount(&self, tick_value: u32) -> u32 {
        periodic_amount(tick_value, self.scaling_bonus)
    }
}

pub(crate) fn periodic_amount(tick_value: u32, scaling_bonus: i32) -> u32 {
    clamp_to_u32(i64::from(tick_value) + i64::from(scaling_bonus))
}

fn clamp_to_u32(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}

/// Computes effect magnitudes from the caster's current stats.
///
/// # Formula
///
/// ```text
/// base          = uniform(value_min, value_max)
/// scaling_bonus = floor((stat - 10) * scaling_factor)   // 0 without scaling
/// rolled_value  = max(0, base + scaling_bonus)
/// drained       = min(floor(rolled_value * drain_percent), caster.missing_resource)
/// ```
#[derive(Clone, Copy)]
pub struct EffectEvaluator<'a> {
    rng: &'a dyn RngOracle,
}

impl<'a> EffectEvaluator<'a> {
    pub fn new(rng: &'a dyn RngOracle) -> Self {
        Self { rng }
    }

    /// Independent Bernoulli trial for this effect.
    ///
    /// Draws `u` in `[0, 1)` and succeeds when `u < chance`, so a chance of
    /// `1.0` always passes and `0.0` never does.
    pub fn roll_chance(&self, effect: &Effect, roll: &RollContext) -> bool {
        let draw = self
            .rng
            .unit_interval(roll.seed(effect.order, RollPurpose::Chance));
        draw < f64::from(effect.chance)
    }

    pub fn evaluate(&self, effect: &Effect, caster: &Combatant, roll: &RollContext) -> EvaluatedEffect {
        let magnitude = effect.kind.magnitude();
        let base = if magnitude.range.is_zero() {
            0
        } else {
            self.rng.range(
                roll.seed(effect.order, RollPurpose::Magnitude),
                magnitude.range.min,
                magnitude.range.max,
            )
        };
        let scaling_bonus = magnitude
            .scaling
            .map(|scaling| StatResolver::scaling_bonus(caster, &scaling))
            .unwrap_or(0);

        EvaluatedEffect {
            base,
            scaling_bonus,
            rolled_value: clamp_to_u32(i64::from(base) + i64::from(scaling_bonus)),
        }
    }

    /// Resource a drain returns to its caster.
    ///
    /// Based on the rolled value and capped by the caster's missing resource.
    pub fn drain_amount(rolled_value: u32, drain_percent: f32, caster: &Combatant) -> u32 {
        let raw = (f64::from(rolled_value) * f64::from(drain_percent)).floor();
        clamp_to_u32(raw as i64).min(caster.resource.missing())
    }
}

impl std::fmt::Debug for EffectEvaluator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectEvaluator").finish_non_exhaustive()
    }
}
