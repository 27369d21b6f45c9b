//! Combatant roster loader.
//!
//! A roster file lists the participants of a fight by id and display name.
//! Attributes default to the scaling baseline and pools start full unless a
//! current value is given.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use combat_core::{AttributeSet, Combatant, CombatantId, ResourceMeter, Roster};

use crate::loaders::{LoadResult, read_file};

/// Authored combatant record.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CombatantSpec {
    pub id: u32,
    pub name: String,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub attributes: AttributeSet,
    pub health: u32,
    #[serde(default)]
    pub current_health: Option<u32>,
    #[serde(default)]
    pub resource: u32,
    #[serde(default)]
    pub current_resource: Option<u32>,
}

fn default_level() -> u32 {
    1
}

impl CombatantSpec {
    pub fn to_combatant(&self) -> Combatant {
        let meter = |maximum: u32, current: Option<u32>| match current {
            Some(current) => ResourceMeter::new(current, maximum),
            None => ResourceMeter::full(maximum),
        };
        Combatant::new(
            CombatantId(self.id),
            self.level,
            self.attributes.clone(),
            meter(self.health, self.current_health),
            meter(self.resource, self.current_resource),
        )
    }
}

/// On-disk shape of a roster file.
///
/// ```ron
/// (
///     combatants: [
///         (id: 1, name: "Mage", level: 5, health: 120, resource: 100,
///          attributes: (intelligence: 16)),
///         (id: 2, name: "Brute", health: 200),
///     ],
/// )
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RosterFile {
    pub combatants: Vec<CombatantSpec>,
}

impl RosterFile {
    /// Builds the engine roster. Ids and names must both be unique.
    pub fn build_roster(&self) -> LoadResult<Roster> {
        let mut names = BTreeSet::new();
        let mut roster = Roster::new();
        for spec in &self.combatants {
            if !names.insert(spec.name.as_str()) {
                anyhow::bail!("Duplicate combatant name '{}'", spec.name);
            }
            if spec.health == 0 {
                anyhow::bail!("Combatant '{}' has no maximum health", spec.name);
            }
            if roster.insert(spec.to_combatant()).is_some() {
                anyhow::bail!("Duplicate combatant id {} ('{}')", spec.id, spec.name);
            }
        }
        Ok(roster)
    }

    /// Display name by id.
    pub fn names(&self) -> BTreeMap<CombatantId, String> {
        self.combatants
            .iter()
            .map(|spec| (CombatantId(spec.id), spec.name.clone()))
            .collect()
    }

    /// Looks a combatant up by display name (case-insensitive).
    pub fn id_of(&self, name: &str) -> Option<CombatantId> {
        self.combatants
            .iter()
            .find(|spec| spec.name.eq_ignore_ascii_case(name))
            .map(|spec| CombatantId(spec.id))
    }
}

/// Loader for roster files.
pub struct RosterLoader;

impl RosterLoader {
    const BUILTIN_DUEL: &'static str = include_str!("../../data/rosters/duel.ron");

    pub fn parse(content: &str, origin: &str) -> LoadResult<RosterFile> {
        let file: RosterFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse roster RON {}: {}", origin, e))?;
        file.build_roster()
            .map_err(|e| anyhow::anyhow!("Invalid roster {}: {}", origin, e))?;
        Ok(file)
    }

    pub fn load(path: &Path) -> LoadResult<RosterFile> {
        let content = read_file(path)?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Two-combatant roster used by the demo scripts.
    pub fn builtin() -> LoadResult<RosterFile> {
        Self::parse(Self::BUILTIN_DUEL, "builtin duel roster")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{Attribute, CombatantStore};

    #[test]
    fn builtin_duel_defaults_fill_in() {
        let file = RosterLoader::builtin().unwrap();
        let roster = file.build_roster().unwrap();
        assert_eq!(roster.len(), 2);

        let mage = file.id_of("mage").unwrap();
        let mage = roster.combatant(mage).unwrap();
        assert_eq!(mage.attribute(Attribute::Intelligence), 16);
        assert_eq!(mage.attribute(Attribute::Strength), 10);
        assert_eq!(mage.resource.current, mage.resource.maximum);
    }

    #[test]
    fn current_values_are_clamped_to_maximum() {
        let file = RosterLoader::parse(
            "(combatants: [(id: 7, name: \"Dummy\", health: 50, current_health: Some(80))])",
            "inline",
        )
        .unwrap();
        let combatant = file.combatants[0].to_combatant();
        assert_eq!(combatant.health, ResourceMeter::new(50, 50));
        assert_eq!(combatant.level, 1);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let error = RosterLoader::parse(
            "(combatants: [(id: 1, name: \"A\", health: 10), (id: 1, name: \"B\", health: 10)])",
            "inline",
        )
        .unwrap_err();
        assert!(error.to_string().contains("Duplicate combatant id 1"));
    }
}
