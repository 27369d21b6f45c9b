//! Content factory that loads a whole data directory.

use std::path::{Path, PathBuf};

use combat_core::{AbilityCatalog, CombatConfig};

use crate::loaders::{AbilityLoader, ConfigLoader, LoadResult, RosterFile, RosterLoader};

/// Loads combat content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── combat.toml
/// ├── abilities/
/// │   ├── arcane.ron
/// │   └── nature.ron
/// └── rosters/
///     └── duel.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Factory over the data directory shipped with this crate.
    pub fn bundled() -> Self {
        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))
    }

    /// Loads `combat.toml`, falling back to defaults when the file is absent.
    pub fn load_config(&self) -> LoadResult<CombatConfig> {
        let path = self.data_dir.join("combat.toml");
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no combat.toml, using defaults");
            return Ok(CombatConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Loads every ability file under `abilities/` as one catalog.
    pub fn load_abilities(&self) -> LoadResult<AbilityCatalog> {
        AbilityLoader::load_dir(&self.data_dir.join("abilities"))
    }

    /// Loads `rosters/{name}.ron`.
    pub fn load_roster(&self, name: &str) -> LoadResult<RosterFile> {
        let path = self.data_dir.join("rosters").join(format!("{}.ron", name));
        RosterLoader::load(&path)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn bundled_directory_matches_builtin() {
        let factory = ContentFactory::bundled();
        let catalog = factory.load_abilities().unwrap();
        assert_eq!(catalog.len(), AbilityLoader::builtin().unwrap().len());
        assert_eq!(factory.load_roster("duel").unwrap().combatants.len(), 2);
        assert_eq!(factory.load_config().unwrap().max_active_per_target, 16);
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let factory = ContentFactory::new("/nonexistent/combat-data");
        assert_eq!(factory.load_config().unwrap(), CombatConfig::default());
    }
}
