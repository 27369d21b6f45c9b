use crate::state::{ActiveEffectId, CombatantId, Tick};

use super::active::{EffectRef, PeriodicKind};

/// One tick applied to one target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickApplication {
    pub effect: ActiveEffectId,
    pub source: EffectRef,
    pub kind: PeriodicKind,
    pub caster: CombatantId,
    pub target: CombatantId,
    /// Scheduled time of this tick (may lie before the `tick` call's `now`).
    pub at: Tick,
    /// `tick_value + scaling_bonus`, floored at zero.
    pub requested: u32,
    /// What actually changed after clamping to the target's pools.
    pub applied: u32,
    pub remaining_ticks: u32,
}

/// Everything one `tick(now)` call did, in application order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickReport {
    pub now: Tick,
    pub applications: Vec<TickApplication>,
    /// Entries that ran out of ticks.
    pub expired: Vec<ActiveEffectId>,
    /// Entries removed because their target died.
    pub cancelled: Vec<ActiveEffectId>,
    /// Entries whose target no longer exists.
    pub dropped: Vec<ActiveEffectId>,
}

impl TickReport {
    pub fn new(now: Tick) -> Self {
        Self {
            now,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.applications.is_empty()
            && self.expired.is_empty()
            && self.cancelled.is_empty()
            && self.dropped.is_empty()
    }

    /// Sum of applied amounts for one kind on one target.
    pub fn total_applied(&self, target: CombatantId, kind: PeriodicKind) -> u64 {
        self.applications
            .iter()
            .filter(|a| a.target == target && a.kind == kind)
            .map(|a| u64::from(a.applied))
            .sum()
    }
}
