//! Read-only cast preconditions.
//!
//! Every check borrows the state immutably, so a rejected cast cannot have
//! touched anything.

use crate::ability::Ability;
use crate::state::{CombatState, CombatantId, CombatantStore, Tick};
use crate::stats::{Stat, StatResolver};

use super::errors::ValidationError;

/// Checks run in this order:
/// combatants exist, caster alive, resource, cooldown, level and stat requirements.
pub(super) fn validate_cast(
    state: &CombatState,
    ability: &Ability,
    caster: CombatantId,
    target: CombatantId,
    now: Tick,
) -> Result<(), ValidationError> {
    let caster_snapshot = state
        .roster
        .combatant(caster)
        .ok_or(ValidationError::UnknownCombatant(caster))?;
    if !state.roster.contains(target) {
        return Err(ValidationError::UnknownCombatant(target));
    }
    if caster_snapshot.is_defeated() {
        return Err(ValidationError::CasterDefeated(caster));
    }

    let available = caster_snapshot.resource.current;
    if available < ability.resource_cost {
        return Err(ValidationError::InsufficientResource {
            required: ability.resource_cost,
            available,
        });
    }

    if let Some(ready_at) = state
        .cooldowns
        .ready_at(caster, ability.id, ability.cooldown)
        && now < ready_at
    {
        return Err(ValidationError::OnCooldown { ready_at });
    }

    if caster_snapshot.level < ability.required_level {
        return Err(ValidationError::RequirementNotMet {
            stat: Stat::Level,
            required: i32::try_from(ability.required_level).unwrap_or(i32::MAX),
            actual: StatResolver::value(caster_snapshot, Stat::Level),
        });
    }
    if let Some(requirement) = &ability.required_primary_stat
        && !StatResolver::meets(caster_snapshot, requirement)
    {
        return Err(ValidationError::RequirementNotMet {
            stat: requirement.stat,
            required: requirement.minimum,
            actual: StatResolver::value(caster_snapshot, requirement.stat),
        });
    }

    Ok(())
}
