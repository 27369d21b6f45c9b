//! Effect evaluation.
//!
//! Pure functions of an effect, the caster snapshot and a seeded oracle.
//! Nothing here mutates combat state; the engine applies the results.

mod evaluator;
mod roll;

pub use evaluator::{EffectEvaluator, EvaluatedEffect};
pub use roll::{RollContext, RollPurpose};

pub(crate) use evaluator::periodic_amount;
