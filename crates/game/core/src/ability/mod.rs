//! Abilities and their effects.
//!
//! Authored content enters as flat [`AbilityDefinition`] records. The
//! [`AbilityCatalog`] validates a whole batch at once and turns each record
//! into an immutable [`Ability`] whose effects are typed [`EffectKind`]
//! variants sorted by application order.
mod catalog;
mod definition;
mod effect;
mod error;
mod summary;

pub use catalog::AbilityCatalog;
pub use definition::{AbilityDefinition, EffectDefinition, StatRequirementDefinition};
pub use effect::{
    AttributeShift, Effect, EffectKind, EffectTarget, EffectType, Magnitude, PeriodicSpec,
    Scaling, ValueRange,
};
pub use error::ContentError;
pub use summary::AbilitySummary;

use std::fmt;

use crate::stats::Stat;

/// Stable identifier of an ability in the content store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AbilityId(pub u32);

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ability:{}", self.0)
    }
}

/// Minimum effective value of one stat required to cast.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatRequirement {
    pub stat: Stat,
    pub minimum: i32,
}

/// A validated, immutable ability.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ability {
    pub id: AbilityId,
    pub name: String,
    pub description: Option<String>,
    pub resource_cost: u32,
    /// Milliseconds between two casts by the same caster.
    pub cooldown: u64,
    pub required_level: u32,
    pub required_primary_stat: Option<StatRequirement>,
    effects: Vec<Effect>,
    summary: AbilitySummary,
}

impl Ability {
    /// Effects in application order.
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn effect(&self, order: u16) -> Option<&Effect> {
        self.effects.iter().find(|effect| effect.order == order)
    }

    /// Aggregates derived from the effects when the ability was loaded.
    pub fn summary(&self) -> &AbilitySummary {
        &self.summary
    }

    pub fn has_periodic_effects(&self) -> bool {
        self.effects
            .iter()
            .any(|effect| effect.kind.periodic_kind().is_some())
    }
}
