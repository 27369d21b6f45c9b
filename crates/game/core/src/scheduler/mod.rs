//! Periodic effect scheduling.
//!
//! [`PeriodicScheduler`] owns every live [`ActiveEffect`] (damage and heal
//! over time, time-bound buffs and debuffs) and advances them when the game
//! loop calls [`PeriodicScheduler::tick`]. Entries are keyed by
//! `(target, registration)`, so iteration order is the deterministic
//! application order replays rely on.
mod active;
mod error;
mod report;

pub use active::{ActiveEffect, EffectPhase, EffectRef, PeriodicKind, PeriodicRegistration};
pub use error::SchedulerError;
pub use report::{TickApplication, TickReport};

use std::collections::BTreeMap;

use crate::state::{
    ActiveEffectId, AttributeModifier, Combatant, CombatantId, CombatantStore, ModifierSource,
    Tick,
};

type EntryKey = (CombatantId, u64);

/// Persisted shape of the scheduler, enough to resume after a restart.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchedulerSnapshot {
    pub max_active_per_target: u32,
    pub next_registration: u64,
    pub effects: Vec<ActiveEffect>,
}

/// Tracks and advances active periodic effects across all targets.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(from = "SchedulerSnapshot", into = "SchedulerSnapshot")
)]
pub struct PeriodicScheduler {
    max_active_per_target: u32,
    next_registration: u64,
    entries: BTreeMap<EntryKey, ActiveEffect>,
}

impl PeriodicScheduler {
    pub fn new(max_active_per_target: u32) -> Self {
        Self {
            max_active_per_target,
            next_registration: 0,
            entries: BTreeMap::new(),
        }
    }

    pub fn max_active_per_target(&self) -> u32 {
        self.max_active_per_target
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in application order.
    pub fn iter(&self) -> impl Iterator<Item = &ActiveEffect> {
        self.entries.values()
    }

    pub fn get(&self, id: ActiveEffectId) -> Option<&ActiveEffect> {
        self.entries.values().find(|effect| effect.id == id)
    }

    pub fn active_on(&self, target: CombatantId) -> impl Iterator<Item = &ActiveEffect> {
        self.entries
            .range((target, 0)..=(target, u64::MAX))
            .map(|(_, effect)| effect)
    }

    pub fn has_capacity(&self, target: CombatantId) -> bool {
        self.active_on(target).count() < self.max_active_per_target as usize
    }

    /// Inserts a new entry in the `Scheduled` phase.
    ///
    /// The first tick lands one interval after `registered_at`. When the
    /// registration carries an attribute shift, the returned entry's
    /// `modifier` is the value the caller installs on the target.
    pub fn register(
        &mut self,
        registration: PeriodicRegistration,
    ) -> Result<&ActiveEffect, SchedulerError> {
        if !self.has_capacity(registration.target) {
            return Err(SchedulerError::TargetSaturated {
                target: registration.target,
                limit: self.max_active_per_target,
            });
        }

        let sequence = self.next_registration;
        self.next_registration += 1;
        let id = ActiveEffectId(sequence);
        let periodic = registration.periodic;

        let effect = ActiveEffect {
            id,
            source: registration.source,
            kind: registration.kind,
            caster: registration.caster,
            target: registration.target,
            registration: sequence,
            tick_value: periodic.tick_value,
            tick_interval: periodic.tick_interval,
            remaining_ticks: periodic.tick_count,
            next_tick_at: registration
                .registered_at
                .saturating_add(periodic.tick_interval),
            scaling_bonus: registration.scaling_bonus,
            modifier: registration
                .shift
                .map(|(attribute, amount)| AttributeModifier {
                    source: ModifierSource::Effect(id),
                    attribute,
                    amount,
                }),
            phase: EffectPhase::Scheduled,
        };

        tracing::debug!(
            effect = %id,
            source = %effect.source,
            kind = %effect.kind,
            combatant = %effect.target,
            first_tick = %effect.next_tick_at,
            ticks = effect.remaining_ticks,
            "registered periodic effect"
        );

        Ok(self.entries.entry(effect.key()).or_insert(effect))
    }

    /// Applies every tick due at or before `now`.
    ///
    /// Due entries are applied in `(target, registration)` order, whatever
    /// time each one fell due at. An entry that fell several intervals behind
    /// catches up on all of them before the next entry runs; calling again
    /// with the same `now` applies nothing.
    pub fn tick<S>(&mut self, now: Tick, store: &mut S) -> TickReport
    where
        S: CombatantStore + ?Sized,
    {
        let mut report = TickReport::new(now);

        while let Some(key) = self.next_due(now) {
            let (target_id, _) = key;
            let Some(target) = store.combatant_mut(target_id) else {
                if let Some(stale) = self.entries.remove(&key) {
                    tracing::warn!(
                        effect = %stale.id,
                        combatant = %target_id,
                        "dropping periodic effect for missing target"
                    );
                    report.dropped.push(stale.id);
                }
                continue;
            };

            if target.is_defeated() {
                report
                    .cancelled
                    .extend(self.cancel_on(target_id, Some(target)));
                continue;
            }

            let Some(entry) = self.entries.get_mut(&key) else {
                continue;
            };
            let at = entry.next_tick_at;
            let requested = entry.tick_amount();
            let applied = match entry.kind {
                PeriodicKind::DamageOverTime => target.health.drain(requested),
                PeriodicKind::HealOverTime => target.health.restore(requested),
                PeriodicKind::Buff => target.resource.restore(requested),
                PeriodicKind::Debuff => target.resource.drain(requested),
            };
            entry.phase = EffectPhase::Active;
            entry.remaining_ticks -= 1;
            entry.next_tick_at = at.saturating_add(entry.tick_interval);

            report.applications.push(TickApplication {
                effect: entry.id,
                source: entry.source,
                kind: entry.kind,
                caster: entry.caster,
                target: target_id,
                at,
                requested,
                applied,
                remaining_ticks: entry.remaining_ticks,
            });

            if entry.remaining_ticks == 0
                && let Some(mut finished) = self.entries.remove(&key)
            {
                finished.phase = EffectPhase::Expired;
                release_modifier(&finished, Some(&mut *target));
                tracing::debug!(effect = %finished.id, combatant = %target_id, "periodic effect expired");
                report.expired.push(finished.id);
            }

            if target.is_defeated() {
                report
                    .cancelled
                    .extend(self.cancel_on(target_id, Some(target)));
            }
        }

        report
    }

    /// Removes one entry immediately without a final partial tick.
    pub fn cancel<S>(&mut self, id: ActiveEffectId, store: &mut S) -> Option<ActiveEffect>
    where
        S: CombatantStore + ?Sized,
    {
        let key = self
            .entries
            .iter()
            .find(|(_, effect)| effect.id == id)
            .map(|(key, _)| *key)?;
        let mut cancelled = self.entries.remove(&key)?;
        cancelled.phase = EffectPhase::Cancelled;
        release_modifier(&cancelled, store.combatant_mut(cancelled.target));
        tracing::debug!(effect = %id, combatant = %cancelled.target, "periodic effect cancelled");
        Some(cancelled)
    }

    /// Cancels every entry on a target (death, dispel).
    pub fn cancel_target<S>(&mut self, target: CombatantId, store: &mut S) -> Vec<ActiveEffectId>
    where
        S: CombatantStore + ?Sized,
    {
        self.cancel_on(target, store.combatant_mut(target))
    }

    fn cancel_on(
        &mut self,
        target: CombatantId,
        mut combatant: Option<&mut Combatant>,
    ) -> Vec<ActiveEffectId> {
        let keys: Vec<EntryKey> = self
            .entries
            .range((target, 0)..=(target, u64::MAX))
            .map(|(key, _)| *key)
            .collect();

        let mut ids = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(mut cancelled) = self.entries.remove(&key) {
                cancelled.phase = EffectPhase::Cancelled;
                release_modifier(&cancelled, combatant.as_deref_mut());
                ids.push(cancelled.id);
            }
        }
        if !ids.is_empty() {
            tracing::debug!(combatant = %target, count = ids.len(), "cancelled periodic effects on target");
        }
        ids
    }

    fn next_due(&self, now: Tick) -> Option<EntryKey> {
        self.entries
            .iter()
            .find(|(_, effect)| effect.is_due(now))
            .map(|(key, _)| *key)
    }

    pub fn snapshot(&self) -> SchedulerSnapshot {
        SchedulerSnapshot {
            max_active_per_target: self.max_active_per_target,
            next_registration: self.next_registration,
            effects: self.entries.values().cloned().collect(),
        }
    }

    /// Rebuilds a scheduler from a snapshot.
    ///
    /// Entries keep their registration numbers, so ordering survives the
    /// round trip. Entries without remaining ticks are discarded.
    pub fn restore(snapshot: SchedulerSnapshot) -> Self {
        let mut next_registration = snapshot.next_registration;
        let mut entries = BTreeMap::new();
        for effect in snapshot.effects {
            if effect.remaining_ticks == 0 || effect.phase.is_terminal() {
                continue;
            }
            next_registration = next_registration.max(effect.registration + 1);
            entries.insert(effect.key(), effect);
        }
        Self {
            max_active_per_target: snapshot.max_active_per_target,
            next_registration,
            entries,
        }
    }
}

fn release_modifier(effect: &ActiveEffect, combatant: Option<&mut Combatant>) {
    if effect.modifier.is_some()
        && let Some(combatant) = combatant
    {
        combatant.remove_modifiers_from(effect.id);
    }
}

impl From<SchedulerSnapshot> for PeriodicScheduler {
    fn from(snapshot: SchedulerSnapshot) -> Self {
        Self::restore(snapshot)
    }
}

impl From<PeriodicScheduler> for SchedulerSnapshot {
    fn from(scheduler: PeriodicScheduler) -> Self {
        Self {
            max_active_per_target: scheduler.max_active_per_target,
            next_registration: scheduler.next_registration,
            effects: scheduler.entries.into_values().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::{AbilityId, PeriodicSpec};
    use crate::state::{ResourceMeter, Roster};
    use crate::stats::{Attribute, AttributeSet};

    fn combatant(id: u32, health: u32) -> Combatant {
        Combatant::new(
            CombatantId(id),
            1,
            AttributeSet::default(),
            ResourceMeter::new(health, 1_000),
            ResourceMeter::new(50, 100),
        )
    }

    fn registration(
        target: u32,
        kind: PeriodicKind,
        periodic: PeriodicSpec,
    ) -> PeriodicRegistration {
        PeriodicRegistration {
            source: EffectRef::new(AbilityId(1), 1),
            kind,
            caster: CombatantId(99),
            target: CombatantId(target),
            periodic,
            scaling_bonus: 0,
            shift: None,
            registered_at: Tick::ZERO,
        }
    }

    fn renew() -> PeriodicSpec {
        PeriodicSpec::new(40, 3_000, 5)
    }

    #[test]
    fn heal_over_time_lands_five_times() {
        let mut roster: Roster = [combatant(1, 100)].into_iter().collect();
        let mut scheduler = PeriodicScheduler::new(4);
        let id = scheduler
            .register(registration(1, PeriodicKind::HealOverTime, renew()))
            .unwrap()
            .id;

        let mut total = 0;
        let mut landed_at = Vec::new();
        for step in 1..=20 {
            let report = scheduler.tick(Tick(step * 1_000), &mut roster);
            for application in &report.applications {
                total += application.applied;
                landed_at.push(application.at.0);
            }
        }

        assert_eq!(total, 200);
        assert_eq!(landed_at, vec![3_000, 6_000, 9_000, 12_000, 15_000]);
        assert!(scheduler.get(id).is_none());
        assert_eq!(roster.combatant(CombatantId(1)).unwrap().health.current, 300);
    }

    #[test]
    fn ticking_twice_at_the_same_time_applies_once() {
        let mut roster: Roster = [combatant(1, 500)].into_iter().collect();
        let mut scheduler = PeriodicScheduler::new(4);
        scheduler
            .register(registration(1, PeriodicKind::DamageOverTime, renew()))
            .unwrap();

        let first = scheduler.tick(Tick(3_000), &mut roster);
        let second = scheduler.tick(Tick(3_000), &mut roster);
        assert_eq!(first.applications.len(), 1);
        assert!(second.is_empty());
        assert_eq!(roster.combatant(CombatantId(1)).unwrap().health.current, 460);
    }

    #[test]
    fn lagging_driver_catches_up_on_missed_ticks() {
        let mut roster: Roster = [combatant(1, 500)].into_iter().collect();
        let mut scheduler = PeriodicScheduler::new(4);
        let id = scheduler
            .register(registration(1, PeriodicKind::DamageOverTime, renew()))
            .unwrap()
            .id;

        let report = scheduler.tick(Tick(20_000), &mut roster);
        assert_eq!(report.applications.len(), 5);
        assert_eq!(report.expired, vec![id]);
        assert_eq!(roster.combatant(CombatantId(1)).unwrap().health.current, 300);
    }

    #[test]
    fn same_instant_ticks_apply_in_target_then_registration_order() {
        let mut roster: Roster = [combatant(1, 500), combatant(2, 500)].into_iter().collect();
        let mut scheduler = PeriodicScheduler::new(4);
        let spec = PeriodicSpec::new(5, 1_000, 1);
        let late = scheduler
            .register(registration(2, PeriodicKind::DamageOverTime, spec))
            .unwrap()
            .id;
        let early_a = scheduler
            .register(registration(1, PeriodicKind::DamageOverTime, spec))
            .unwrap()
            .id;
        let early_b = scheduler
            .register(registration(1, PeriodicKind::HealOverTime, spec))
            .unwrap()
            .id;

        let report = scheduler.tick(Tick(1_000), &mut roster);
        let order: Vec<_> = report.applications.iter().map(|a| a.effect).collect();
        assert_eq!(order, vec![early_a, early_b, late]);
    }

    #[test]
    fn earlier_registration_runs_first_even_when_due_later() {
        let mut roster: Roster = [combatant(1, 30)].into_iter().collect();
        let mut scheduler = PeriodicScheduler::new(4);
        let dot = scheduler
            .register(registration(
                1,
                PeriodicKind::DamageOverTime,
                PeriodicSpec::new(40, 2_000, 1),
            ))
            .unwrap()
            .id;
        let hot = scheduler
            .register(registration(
                1,
                PeriodicKind::HealOverTime,
                PeriodicSpec::new(40, 1_000, 2),
            ))
            .unwrap()
            .id;

        let report = scheduler.tick(Tick(2_000), &mut roster);
        let order: Vec<_> = report
            .applications
            .iter()
            .map(|a| (a.effect, a.at.0))
            .collect();
        assert_eq!(order, vec![(dot, 2_000)]);
        assert_eq!(report.cancelled, vec![hot]);
        assert_eq!(roster.combatant(CombatantId(1)).unwrap().health.current, 0);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn missing_target_is_dropped_not_fatal() {
        let mut roster: Roster = [combatant(1, 500)].into_iter().collect();
        let mut scheduler = PeriodicScheduler::new(4);
        let ghost = scheduler
            .register(registration(7, PeriodicKind::DamageOverTime, renew()))
            .unwrap()
            .id;
        scheduler
            .register(registration(1, PeriodicKind::DamageOverTime, renew()))
            .unwrap();

        let report = scheduler.tick(Tick(3_000), &mut roster);
        assert_eq!(report.dropped, vec![ghost]);
        assert_eq!(report.applications.len(), 1);
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn lethal_tick_cancels_the_rest_of_the_target() {
        let mut roster: Roster = [combatant(1, 30)].into_iter().collect();
        let mut scheduler = PeriodicScheduler::new(4);
        scheduler
            .register(registration(1, PeriodicKind::DamageOverTime, renew()))
            .unwrap();
        let hot = scheduler
            .register(registration(1, PeriodicKind::HealOverTime, renew()))
            .unwrap()
            .id;

        let report = scheduler.tick(Tick(3_000), &mut roster);
        assert_eq!(report.applications.len(), 1);
        assert_eq!(report.applications[0].applied, 30);
        assert_eq!(report.cancelled.len(), 2);
        assert!(report.cancelled.contains(&hot));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn cancel_removes_modifier_without_partial_tick() {
        let mut roster: Roster = [combatant(1, 500)].into_iter().collect();
        let mut scheduler = PeriodicScheduler::new(4);
        let mut buff = registration(1, PeriodicKind::Buff, renew());
        buff.shift = Some((Attribute::Spirit, 6));
        let modifier = scheduler.register(buff).unwrap().modifier.unwrap();
        let id = match modifier.source {
            ModifierSource::Effect(id) => id,
            ModifierSource::Untimed(_) => unreachable!(),
        };

        let target = roster.combatant_mut(CombatantId(1)).unwrap();
        assert!(target.add_modifier(modifier));
        assert_eq!(target.attribute(Attribute::Spirit), 16);

        let cancelled = scheduler.cancel(id, &mut roster).unwrap();
        assert_eq!(cancelled.phase, EffectPhase::Cancelled);
        let target = roster.combatant(CombatantId(1)).unwrap();
        assert_eq!(target.attribute(Attribute::Spirit), 10);
        assert_eq!(target.resource.current, 50);
        assert!(scheduler.tick(Tick(60_000), &mut roster).is_empty());
    }

    #[test]
    fn saturated_target_rejects_registration() {
        let mut scheduler = PeriodicScheduler::new(2);
        for _ in 0..2 {
            scheduler
                .register(registration(1, PeriodicKind::DamageOverTime, renew()))
                .unwrap();
        }
        assert_eq!(
            scheduler
                .register(registration(1, PeriodicKind::DamageOverTime, renew()))
                .unwrap_err(),
            SchedulerError::TargetSaturated {
                target: CombatantId(1),
                limit: 2
            }
        );
        assert!(
            scheduler
                .register(registration(2, PeriodicKind::DamageOverTime, renew()))
                .is_ok()
        );
    }

    #[test]
    fn restored_scheduler_resumes_identically() {
        let mut roster: Roster = [combatant(1, 500), combatant(2, 500)].into_iter().collect();
        let mut scheduler = PeriodicScheduler::new(4);
        scheduler
            .register(registration(2, PeriodicKind::DamageOverTime, renew()))
            .unwrap();
        scheduler
            .register(registration(1, PeriodicKind::HealOverTime, renew()))
            .unwrap();
        scheduler.tick(Tick(6_000), &mut roster);

        let mut restored = PeriodicScheduler::restore(scheduler.snapshot());
        let mut restored_roster = roster.clone();
        assert_eq!(restored, scheduler);

        let original = scheduler.tick(Tick(15_000), &mut roster);
        let resumed = restored.tick(Tick(15_000), &mut restored_roster);
        assert_eq!(original, resumed);
        assert_eq!(roster, restored_roster);
    }
}
