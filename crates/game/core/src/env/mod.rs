//! Read-only services the engine consults during a cast.
//!
//! The engine never owns a source of randomness or content. Callers bundle
//! the catalog, an [`RngOracle`] and the [`CombatConfig`] into a
//! [`CombatEnv`] so production code can use [`PcgRng`] while tests pin rolls
//! to exact values.
mod rng;

pub use rng::{PcgRng, RngOracle, compute_seed};

use crate::ability::AbilityCatalog;
use crate::config::CombatConfig;

/// Aggregates the read-only inputs of the resolution pipeline.
#[derive(Clone, Copy)]
pub struct CombatEnv<'a> {
    pub catalog: &'a AbilityCatalog,
    pub rng: &'a dyn RngOracle,
    pub config: &'a CombatConfig,
}

impl<'a> CombatEnv<'a> {
    pub fn new(
        catalog: &'a AbilityCatalog,
        rng: &'a dyn RngOracle,
        config: &'a CombatConfig,
    ) -> Self {
        Self {
            catalog,
            rng,
            config,
        }
    }
}

impl std::fmt::Debug for CombatEnv<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatEnv")
            .field("abilities", &self.catalog.len())
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}
