//! Stat resolution.
//!
//! Combatants store five primary attributes plus level and two resource
//! pools. Scaling formulas reference these by name; [`StatResolver`] turns a
//! name into the number the formula needs.

pub mod attributes;
pub mod resolver;

pub use attributes::{Attribute, AttributeSet, Stat};
pub use resolver::StatResolver;
