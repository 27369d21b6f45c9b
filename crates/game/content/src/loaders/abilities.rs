//! Ability catalog loader.
//!
//! Loads ability definitions from RON files and validates them as one batch.

use std::path::Path;

use anyhow::Context;
use combat_core::{AbilityCatalog, AbilityDefinition};

use crate::loaders::{LoadResult, read_file};

/// On-disk shape of an ability file.
///
/// ```ron
/// (
///     abilities: [
///         (
///             id: 1,
///             name: "Fire Bolt",
///             resource_cost: 10,
///             cooldown: 2000,
///             effects: [
///                 (effect_order: 1, effect_type: damage, target: enemy,
///                  value_min: 12, value_max: 18,
///                  stat_scaling: Some("intelligence"), scaling_factor: Some(0.5)),
///             ],
///         ),
///     ],
/// )
/// ```
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AbilityFile {
    pub abilities: Vec<AbilityDefinition>,
}

/// Loader for ability catalogs.
pub struct AbilityLoader;

impl AbilityLoader {
    /// Ability files compiled into the crate.
    const BUILTIN: &'static [(&'static str, &'static str)] = &[
        (
            "arcane.ron",
            include_str!("../../data/abilities/arcane.ron"),
        ),
        (
            "nature.ron",
            include_str!("../../data/abilities/nature.ron"),
        ),
    ];

    /// Parses ability definitions without validating them.
    pub fn parse(content: &str, origin: &str) -> LoadResult<Vec<AbilityDefinition>> {
        let file: AbilityFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse ability RON {}: {}", origin, e))?;
        Ok(file.abilities)
    }

    /// Loads and validates a single ability file.
    pub fn load(path: &Path) -> LoadResult<AbilityCatalog> {
        let definitions = Self::load_definitions(path)?;
        Self::validate(definitions, &path.display().to_string())
    }

    /// Reads definitions from a file without validating them.
    pub fn load_definitions(path: &Path) -> LoadResult<Vec<AbilityDefinition>> {
        let content = read_file(path)?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Loads every `*.ron` file in a directory (sorted by file name) as one batch.
    pub fn load_dir(dir: &Path) -> LoadResult<AbilityCatalog> {
        let mut files: Vec<_> = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read ability directory {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "ron"))
            .collect();
        files.sort();

        let mut definitions = Vec::new();
        for path in &files {
            definitions.extend(Self::load_definitions(path)?);
        }
        tracing::debug!(files = files.len(), dir = %dir.display(), "read ability files");
        Self::validate(definitions, &dir.display().to_string())
    }

    /// The built-in ability set.
    pub fn builtin() -> LoadResult<AbilityCatalog> {
        let mut definitions = Vec::new();
        for (name, content) in Self::BUILTIN {
            definitions.extend(Self::parse(content, name)?);
        }
        Self::validate(definitions, "builtin abilities")
    }

    /// Validates a batch into a catalog, keeping the [`combat_core::ContentError`]
    /// reachable through `downcast_ref`.
    pub fn validate(definitions: Vec<AbilityDefinition>, origin: &str) -> LoadResult<AbilityCatalog> {
        let catalog = AbilityCatalog::load(definitions)
            .with_context(|| format!("Invalid ability content in {}", origin))?;
        tracing::info!(abilities = catalog.len(), origin, "ability catalog ready");
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{ContentError, EffectKind, EffectTarget};

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = AbilityLoader::builtin().unwrap();
        assert!(catalog.len() >= 6);

        let bolt = catalog.find_by_name("Fire Bolt").unwrap();
        assert_eq!(bolt.effects().len(), 1);
        assert!(matches!(bolt.effects()[0].kind, EffectKind::Damage(_)));

        let rejuvenation = catalog.find_by_name("Rejuvenation").unwrap();
        assert_eq!(rejuvenation.effects()[0].target, EffectTarget::Caster);
        assert_eq!(rejuvenation.summary().periodic_healing, 200);
    }

    #[test]
    fn rejection_keeps_content_error() {
        let content = r#"(
            abilities: [
                (
                    id: 1,
                    name: "Broken",
                    effects: [
                        (effect_order: 1, effect_type: hot, target: caster,
                         tick_value: Some(10), tick_count: Some(3)),
                    ],
                ),
            ],
        )"#;
        let definitions = AbilityLoader::parse(content, "inline").unwrap();
        let error = AbilityLoader::validate(definitions, "inline").unwrap_err();
        assert!(matches!(
            error.downcast_ref::<ContentError>(),
            Some(ContentError::MalformedEffect { order: 1, .. })
        ));
    }

    #[test]
    fn directory_batches_are_validated_together() {
        let dir = std::env::temp_dir().join(format!("combat-content-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let single = |id: u32, name: &str| {
            format!(
                "(abilities: [(id: {id}, name: \"{name}\", effects: [(effect_order: 1, effect_type: damage, target: enemy, value_min: 1, value_max: 2)])])"
            )
        };
        std::fs::write(dir.join("a.ron"), single(1, "Jab")).unwrap();
        std::fs::write(dir.join("b.ron"), single(2, "Jab")).unwrap();

        let error = AbilityLoader::load_dir(&dir).unwrap_err();
        assert_eq!(
            error.downcast_ref::<ContentError>(),
            Some(&ContentError::DuplicateName("Jab".into()))
        );

        std::fs::write(dir.join("b.ron"), single(2, "Hook")).unwrap();
        assert_eq!(AbilityLoader::load_dir(&dir).unwrap().len(), 2);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
