//! Engine configuration loader.

use std::path::Path;

use combat_core::CombatConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`CombatConfig`] from TOML files. Missing keys keep their defaults.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn parse(content: &str) -> LoadResult<CombatConfig> {
        let config: CombatConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        if config.max_active_per_target == 0 {
            anyhow::bail!("max_active_per_target must be at least 1");
        }
        if config.tick_interval_ms == 0 {
            anyhow::bail!("tick_interval_ms must be positive");
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> LoadResult<CombatConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("{} ({})", e, path.display()))
    }
}
