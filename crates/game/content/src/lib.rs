//! Data-driven combat content and loaders.
//!
//! This crate turns authored files into engine inputs:
//! - Ability catalogs (RON, validated through [`combat_core::AbilityCatalog`])
//! - Combatant rosters (RON)
//! - Engine configuration (TOML)
//!
//! A small built-in ability set ships embedded in the binary so tools and
//! tests can run without a data directory.
//!
//! Content is read-only once loaded and never appears in combat state.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    AbilityFile, AbilityLoader, CombatantSpec, ConfigLoader, ContentFactory, RosterFile,
    RosterLoader,
};
