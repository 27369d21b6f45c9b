//! Event payloads.

use combat_core::{
    AbilityId, ActiveEffectId, CastResult, CombatantId, Tick, TickReport, ValidationError,
};
use serde::{Deserialize, Serialize};

use super::bus::Topic;

/// Something the combat worker did.
///
/// The event log stores these in order; replaying the state-changing ones
/// against the initial roster rebuilds the exact same combat state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// A cast passed validation and was committed.
    CastResolved(CastResult),

    /// A cast failed validation. Nothing changed.
    CastRejected {
        caster: CombatantId,
        target: CombatantId,
        ability: AbilityId,
        at: Tick,
        error: ValidationError,
    },

    /// A scheduler step that did something.
    TicksApplied(TickReport),

    /// An active effect was cancelled on request.
    EffectCancelled { effect: ActiveEffectId, at: Tick },

    /// Every periodic effect and untimed modifier was stripped from a combatant.
    Dispelled {
        target: CombatantId,
        at: Tick,
        cancelled: Vec<ActiveEffectId>,
    },
}

impl CombatEvent {
    pub fn topic(&self) -> Topic {
        match self {
            CombatEvent::CastResolved(_) | CombatEvent::CastRejected { .. } => Topic::Cast,
            CombatEvent::TicksApplied(_)
            | CombatEvent::EffectCancelled { .. }
            | CombatEvent::Dispelled { .. } => Topic::Periodic,
        }
    }

    /// Game time the event happened at.
    pub fn at(&self) -> Tick {
        match self {
            CombatEvent::CastResolved(result) => result.cast_at,
            CombatEvent::TicksApplied(report) => report.now,
            CombatEvent::CastRejected { at, .. }
            | CombatEvent::EffectCancelled { at, .. }
            | CombatEvent::Dispelled { at, .. } => *at,
        }
    }

    /// Whether replaying this event changes combat state.
    pub fn mutates_state(&self) -> bool {
        !matches!(self, CombatEvent::CastRejected { .. })
    }
}
