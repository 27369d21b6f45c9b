//! Cast resolution pipeline.
//!
//! The [`ResolutionEngine`] is the only writer of [`CombatState`] during a
//! cast. It validates preconditions without mutating anything, then commits
//! the cost, the cooldown and every effect in order. Periodic effects are
//! handed to the scheduler; the same engine drives scheduler ticks so all
//! mutation of a session flows through one place.

mod errors;
mod result;
mod validation;

pub use errors::{EffectFault, ValidationError};
pub use result::{AppliedEffect, CastResult};

use crate::ability::{
    Ability, AbilityId, AttributeShift, Effect, EffectKind, EffectTarget, PeriodicSpec,
};
use crate::combat::{EffectEvaluator, EvaluatedEffect, RollContext};
use crate::env::CombatEnv;
use crate::scheduler::{ActiveEffect, EffectRef, PeriodicRegistration, SchedulerError, TickReport};
use crate::state::{
    ActiveEffectId, AttributeModifier, CombatState, CombatantId, CombatantStore, ModifierSource,
    Tick,
};
use crate::stats::Attribute;

/// Resolves casts and drives periodic effects against one combat state.
pub struct ResolutionEngine<'a> {
    state: &'a mut CombatState,
}

/// Per-cast data shared by every effect.
struct CastContext<'e> {
    ability: &'e Ability,
    evaluator: EffectEvaluator<'e>,
    roll: RollContext,
    now: Tick,
}

impl<'a> ResolutionEngine<'a> {
    pub fn new(state: &'a mut CombatState) -> Self {
        Self { state }
    }

    /// Casts `ability` from `caster` at `target`.
    ///
    /// Validation failures leave the state untouched. Once validation
    /// passes the cast always commits: the cost is paid, the cooldown
    /// starts and each effect resolves independently, with per-effect
    /// problems reported in [`CastResult::errors`].
    pub fn cast(
        &mut self,
        env: CombatEnv<'_>,
        caster: CombatantId,
        target: CombatantId,
        ability: AbilityId,
        now: Tick,
    ) -> Result<CastResult, ValidationError> {
        let ability = env.catalog.get(ability)?;
        validation::validate_cast(self.state, ability, caster, target, now).inspect_err(
            |error| {
                tracing::debug!(ability = %ability.name, caster = %caster, %error, "cast rejected");
            },
        )?;

        let nonce = self.state.nonce;
        self.state.nonce += 1;
        let resource_spent = self
            .state
            .roster
            .combatant_mut(caster)
            .map(|c| c.resource.drain(ability.resource_cost))
            .unwrap_or_default();
        self.state.cooldowns.record(caster, ability.id, now);

        let context = CastContext {
            ability,
            evaluator: EffectEvaluator::new(env.rng),
            roll: RollContext::new(env.config.session_seed, nonce, caster),
            now,
        };
        let mut result = CastResult {
            ability: ability.id,
            caster,
            target,
            cast_at: now,
            nonce,
            resource_spent,
            applied_effects: Vec::with_capacity(ability.effects().len()),
            errors: Vec::new(),
            cancelled_effects: Vec::new(),
        };

        for effect in ability.effects() {
            self.resolve_effect(&context, effect, &mut result);
        }

        tracing::debug!(
            ability = %ability.name,
            caster = %caster,
            recipient = %target,
            nonce,
            applied = result.applied_effects.len(),
            faults = result.errors.len(),
            "cast resolved"
        );
        Ok(result)
    }

    /// Advances every periodic effect due at or before `now`.
    pub fn tick(&mut self, now: Tick) -> TickReport {
        let state = &mut *self.state;
        state.scheduler.tick(now, &mut state.roster)
    }

    /// Cancels one periodic effect, releasing any modifier it holds.
    pub fn cancel(&mut self, id: ActiveEffectId) -> Option<ActiveEffect> {
        let state = &mut *self.state;
        state.scheduler.cancel(id, &mut state.roster)
    }

    /// Removes every periodic effect and every untimed modifier from a combatant.
    pub fn dispel(&mut self, target: CombatantId) -> Vec<ActiveEffectId> {
        let state = &mut *self.state;
        let cancelled = state.scheduler.cancel_target(target, &mut state.roster);
        if let Some(combatant) = state.roster.combatant_mut(target) {
            combatant.dispel_untimed();
        }
        cancelled
    }

    fn resolve_effect(&mut self, cx: &CastContext<'_>, effect: &Effect, result: &mut CastResult) {
        let order = effect.order;
        if !cx.evaluator.roll_chance(effect, &cx.roll) {
            result.errors.push(EffectFault::Resisted { order });
            return;
        }

        let recipient = match effect.target {
            EffectTarget::Caster => result.caster,
            EffectTarget::Enemy => result.target,
        };
        let state = &mut *self.state;
        let (Some(caster), Some(receiver)) = (
            state.roster.combatant(result.caster).cloned(),
            state.roster.combatant(recipient),
        ) else {
            return;
        };
        if receiver.is_defeated() {
            result
                .errors
                .push(EffectFault::TargetDefeated { order, recipient });
            return;
        }
        if effect.kind.periodic().is_some() && !state.scheduler.has_capacity(recipient) {
            result.errors.push(EffectFault::SchedulerRejected {
                order,
                error: SchedulerError::TargetSaturated {
                    target: recipient,
                    limit: state.scheduler.max_active_per_target(),
                },
            });
            return;
        }

        let evaluated = cx.evaluator.evaluate(effect, &caster, &cx.roll);
        if matches!(effect.kind, EffectKind::Buff(_) | EffectKind::Debuff(_))
            && evaluated.rolled_value > 0
            && !receiver.has_modifier_capacity()
        {
            result
                .errors
                .push(EffectFault::ModifierSlotsFull { order, recipient });
            return;
        }
        let mut applied = AppliedEffect {
            order,
            effect_type: effect.kind.effect_type(),
            recipient,
            rolled_value: evaluated.rolled_value,
            scaling_bonus: evaluated.scaling_bonus,
            applied: 0,
            drained: 0,
            active_effect: None,
        };

        let Some(receiver) = state.roster.combatant_mut(recipient) else {
            return;
        };
        let rolled = evaluated.rolled_value;
        match effect.kind {
            EffectKind::Damage(_) => applied.applied = receiver.health.drain(rolled),
            EffectKind::Heal(_) => applied.applied = receiver.health.restore(rolled),
            EffectKind::Drain { drain_percent, .. } => {
                applied.applied = receiver.health.drain(rolled);
                if let Some(caster) = state.roster.combatant_mut(result.caster) {
                    let amount = EffectEvaluator::drain_amount(rolled, drain_percent, caster);
                    applied.drained = caster.resource.restore(amount);
                }
            }
            EffectKind::DamageOverTime { periodic, .. } => {
                if effect.kind.has_instant_portion() {
                    applied.applied = receiver.health.drain(rolled);
                }
                applied.active_effect =
                    self.schedule(cx, effect, recipient, periodic, &evaluated, None, result);
            }
            EffectKind::HealOverTime { periodic, .. } => {
                if effect.kind.has_instant_portion() {
                    applied.applied = receiver.health.restore(rolled);
                }
                applied.active_effect =
                    self.schedule(cx, effect, recipient, periodic, &evaluated, None, result);
            }
            EffectKind::Buff(shift) | EffectKind::Debuff(shift) => {
                let amount = signed_shift(&effect.kind, rolled);
                applied.applied = rolled;
                applied.active_effect =
                    self.apply_shift(cx, effect, recipient, shift, amount, &evaluated, result);
            }
        }

        let state = &mut *self.state;
        if state
            .roster
            .combatant(recipient)
            .is_some_and(|c| c.is_defeated())
        {
            tracing::debug!(combatant = %recipient, order, "recipient defeated during cast");
            let cancelled = state.scheduler.cancel_target(recipient, &mut state.roster);
            if applied
                .active_effect
                .is_some_and(|id| cancelled.contains(&id))
            {
                applied.active_effect = None;
            }
            result.cancelled_effects.extend(cancelled);
        }
        result.applied_effects.push(applied);
    }

    /// Installs a buff or debuff modifier, timed through the scheduler or untimed.
    #[allow(clippy::too_many_arguments)]
    fn apply_shift(
        &mut self,
        cx: &CastContext<'_>,
        effect: &Effect,
        recipient: CombatantId,
        shift: AttributeShift,
        amount: i32,
        evaluated: &EvaluatedEffect,
        result: &mut CastResult,
    ) -> Option<ActiveEffectId> {
        let held = (amount != 0).then_some((shift.attribute, amount));
        if let Some(periodic) = shift.periodic {
            return self.schedule(cx, effect, recipient, periodic, evaluated, held, result);
        }

        let (attribute, amount) = held?;
        let source = EffectRef::new(cx.ability.id, effect.order);
        let installed = self
            .state
            .roster
            .combatant_mut(recipient)
            .is_some_and(|receiver| {
                receiver.add_modifier(AttributeModifier {
                    source: ModifierSource::Untimed(source),
                    attribute,
                    amount,
                })
            });
        if !installed {
            result.errors.push(EffectFault::ModifierSlotsFull {
                order: effect.order,
                recipient,
            });
        }
        None
    }

    #[allow(clippy::too_many_arguments)]
    fn schedule(
        &mut self,
        cx: &CastContext<'_>,
        effect: &Effect,
        recipient: CombatantId,
        periodic: PeriodicSpec,
        evaluated: &EvaluatedEffect,
        shift: Option<(Attribute, i32)>,
        result: &mut CastResult,
    ) -> Option<ActiveEffectId> {
        let kind = effect.kind.periodic_kind()?;
        let state = &mut *self.state;
        if state
            .roster
            .combatant(recipient)
            .is_some_and(|c| c.is_defeated())
        {
            return None;
        }

        let registration = PeriodicRegistration {
            source: EffectRef::new(cx.ability.id, effect.order),
            kind,
            caster: result.caster,
            target: recipient,
            periodic,
            scaling_bonus: evaluated.scaling_bonus,
            shift,
            registered_at: cx.now,
        };
        match state.scheduler.register(registration) {
            Ok(entry) => {
                let id = entry.id;
                if let Some(modifier) = entry.modifier
                    && let Some(receiver) = state.roster.combatant_mut(recipient)
                    && !receiver.add_modifier(modifier)
                {
                    state.scheduler.cancel(id, &mut state.roster);
                    result.errors.push(EffectFault::ModifierSlotsFull {
                        order: effect.order,
                        recipient,
                    });
                    return None;
                }
                Some(id)
            }
            Err(error) => {
                result.errors.push(EffectFault::SchedulerRejected {
                    order: effect.order,
                    error,
                });
                None
            }
        }
    }
}

/// Buffs raise the attribute, debuffs lower it.
fn signed_shift(kind: &EffectKind, rolled: u32) -> i32 {
    let magnitude = i32::try_from(rolled).unwrap_or(i32::MAX);
    match kind {
        EffectKind::Debuff(_) => -magnitude,
        _ => magnitude,
    }
}
