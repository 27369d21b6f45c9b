//! Deterministic ability effect resolution.
//!
//! `combat-core` computes what happens when a combatant casts an ability at a
//! target: instant damage and healing, resource drains, attribute buffs and
//! debuffs, and periodic effects that keep ticking after the cast returns.
//!
//! The crate is layered leaves-first:
//! - [`ability`] holds the immutable, load-time validated [`AbilityCatalog`]
//! - [`stats`] resolves named stats on a combatant ([`StatResolver`])
//! - [`combat`] evaluates a single effect against caster stats ([`EffectEvaluator`])
//! - [`scheduler`] advances periodic effects across all targets ([`PeriodicScheduler`])
//! - [`engine`] orchestrates a cast ([`ResolutionEngine`])
//!
//! All mutable state lives in [`CombatState`] and is passed in per call; the
//! only shared state is the read-only catalog.
pub mod ability;
pub mod combat;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod scheduler;
pub mod state;
pub mod stats;

pub use ability::{
    Ability, AbilityCatalog, AbilityDefinition, AbilityId, AbilitySummary, AttributeShift,
    ContentError, Effect, EffectDefinition, EffectKind, EffectTarget, EffectType, Magnitude,
    PeriodicSpec, Scaling, StatRequirement, StatRequirementDefinition, ValueRange,
};
pub use combat::{EffectEvaluator, EvaluatedEffect, RollContext, RollPurpose};
pub use config::CombatConfig;
pub use engine::{AppliedEffect, CastResult, EffectFault, ResolutionEngine, ValidationError};
pub use env::{CombatEnv, PcgRng, RngOracle, compute_seed};
pub use error::{CombatError, ErrorSeverity};
pub use scheduler::{
    ActiveEffect, EffectPhase, EffectRef, PeriodicKind, PeriodicRegistration, PeriodicScheduler,
    SchedulerError, SchedulerSnapshot, TickApplication, TickReport,
};
pub use state::{
    ActiveEffectId, AttributeModifier, CombatState, Combatant, CombatantId, CombatantStore,
    CooldownLedger, ModifierSource, ResourceMeter, Roster, Tick,
};
pub use stats::{Attribute, AttributeSet, Stat, StatResolver};
