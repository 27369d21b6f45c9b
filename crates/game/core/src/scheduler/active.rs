use std::fmt;

use strum::{Display, IntoStaticStr};

use crate::ability::{AbilityId, PeriodicSpec};
use crate::combat::periodic_amount;
use crate::state::{ActiveEffectId, AttributeModifier, CombatantId, Tick};
use crate::stats::Attribute;

/// Points back at the authored effect an active effect came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectRef {
    pub ability: AbilityId,
    pub order: u16,
}

impl EffectRef {
    pub const fn new(ability: AbilityId, order: u16) -> Self {
        Self { ability, order }
    }
}

impl fmt::Display for EffectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.ability, self.order)
    }
}

/// How a tick changes its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PeriodicKind {
    /// Removes health.
    DamageOverTime,
    /// Restores health.
    HealOverTime,
    /// Restores resource while the attribute modifier is held.
    Buff,
    /// Removes resource while the attribute modifier is held.
    Debuff,
}

impl PeriodicKind {
    pub const fn is_harmful(&self) -> bool {
        matches!(self, Self::DamageOverTime | Self::Debuff)
    }
}

/// Lifecycle of an active effect.
///
/// `Scheduled -> Active -> {Expired | Cancelled}`. Terminal phases only appear
/// on values handed back to callers; the scheduler never stores them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectPhase {
    Scheduled,
    Active,
    Expired,
    Cancelled,
}

impl EffectPhase {
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Expired | Self::Cancelled)
    }
}

/// What the engine hands the scheduler when a periodic effect lands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeriodicRegistration {
    pub source: EffectRef,
    pub kind: PeriodicKind,
    pub caster: CombatantId,
    pub target: CombatantId,
    pub periodic: PeriodicSpec,
    /// Frozen at cast time and added to every tick.
    pub scaling_bonus: i32,
    /// Attribute change held for the lifetime of a buff or debuff.
    pub shift: Option<(Attribute, i32)>,
    pub registered_at: Tick,
}

/// Runtime instance of a periodic effect on one target.
///
/// Holds everything needed to resume ticking after a restart.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveEffect {
    pub id: ActiveEffectId,
    pub source: EffectRef,
    pub kind: PeriodicKind,
    pub caster: CombatantId,
    pub target: CombatantId,
    /// Position in the global registration sequence; breaks ties within a target.
    pub registration: u64,
    pub tick_value: u32,
    pub tick_interval: u64,
    pub remaining_ticks: u32,
    pub next_tick_at: Tick,
    pub scaling_bonus: i32,
    pub modifier: Option<AttributeModifier>,
    pub phase: EffectPhase,
}

impl ActiveEffect {
    /// Amount each tick applies.
    pub fn tick_amount(&self) -> u32 {
        periodic_amount(self.tick_value, self.scaling_bonus)
    }

    pub fn is_due(&self, now: Tick) -> bool {
        self.remaining_ticks > 0 && self.next_tick_at <= now
    }

    /// Tick at which the last remaining tick lands.
    pub fn ends_at(&self) -> Tick {
        let remaining = u64::from(self.remaining_ticks.saturating_sub(1));
        self.next_tick_at
            .saturating_add(self.tick_interval.saturating_mul(remaining))
    }

    pub(crate) fn key(&self) -> (CombatantId, u64) {
        (self.target, self.registration)
    }
}
