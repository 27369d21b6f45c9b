//! Content loaders for reading combat data from files.
//!
//! Every loader returns [`LoadResult`] with the offending path in the error
//! context, so a bad file is reported by name at startup.

pub mod abilities;
pub mod config;
pub mod factory;
pub mod roster;

pub use abilities::{AbilityFile, AbilityLoader};
pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use roster::{CombatantSpec, RosterFile, RosterLoader};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
