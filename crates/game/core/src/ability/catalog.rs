use std::collections::BTreeMap;

use crate::engine::ValidationError;

use super::definition::AbilityDefinition;
use super::error::ContentError;
use super::summary::AbilitySummary;
use super::{Ability, AbilityId};

/// Read-only registry of validated abilities.
///
/// Built once from a full batch of definitions. A single invalid record
/// rejects the whole batch.
#[derive(Clone, Debug, Default)]
pub struct AbilityCatalog {
    abilities: BTreeMap<AbilityId, Ability>,
    by_name: BTreeMap<String, AbilityId>,
}

impl AbilityCatalog {
    pub fn load<I>(definitions: I) -> Result<Self, ContentError>
    where
        I: IntoIterator<Item = AbilityDefinition>,
    {
        let mut abilities = BTreeMap::new();
        let mut by_name = BTreeMap::new();

        for definition in definitions {
            let ability = definition.validate().inspect_err(|error| {
                tracing::warn!(ability = %definition.name, %error, "rejecting ability batch");
            })?;
            if by_name.contains_key(&ability.name) {
                return Err(ContentError::DuplicateName(ability.name));
            }
            if abilities.contains_key(&ability.id) {
                return Err(ContentError::DuplicateId(ability.id.0));
            }
            by_name.insert(ability.name.clone(), ability.id);
            abilities.insert(ability.id, ability);
        }

        tracing::debug!(count = abilities.len(), "ability catalog loaded");
        Ok(Self { abilities, by_name })
    }

    pub fn get(&self, id: AbilityId) -> Result<&Ability, ValidationError> {
        self.abilities
            .get(&id)
            .ok_or(ValidationError::UnknownAbility(id))
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Ability> {
        self.by_name
            .get(name)
            .and_then(|id| self.abilities.get(id))
    }

    pub fn summary(&self, id: AbilityId) -> Result<&AbilitySummary, ValidationError> {
        self.get(id).map(Ability::summary)
    }

    /// Abilities in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Ability> {
        self.abilities.values()
    }

    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::{EffectDefinition, EffectTarget, EffectType};

    fn ability(id: u32, name: &str) -> AbilityDefinition {
        AbilityDefinition {
            id,
            name: name.into(),
            description: None,
            resource_cost: 10,
            cooldown: 1_500,
            required_level: 1,
            required_primary_stat: None,
            effects: vec![EffectDefinition {
                value_min: 4,
                value_max: 8,
                ..EffectDefinition::new(1, EffectType::Damage, EffectTarget::Enemy)
            }],
        }
    }

    #[test]
    fn lookup_by_id_and_name() {
        let catalog = AbilityCatalog::load([ability(1, "Strike"), ability(2, "Smite")]).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(AbilityId(2)).unwrap().name, "Smite");
        assert_eq!(catalog.find_by_name("Strike").unwrap().id, AbilityId(1));
        assert_eq!(
            catalog.get(AbilityId(9)).unwrap_err(),
            ValidationError::UnknownAbility(AbilityId(9))
        );
    }

    #[test]
    fn duplicate_names_reject_the_batch() {
        let result = AbilityCatalog::load([ability(1, "Strike"), ability(2, "Strike")]);
        assert_eq!(
            result.unwrap_err(),
            ContentError::DuplicateName("Strike".into())
        );
    }

    #[test]
    fn one_bad_effect_rejects_every_ability() {
        let mut broken = ability(3, "Broken");
        broken.effects[0].tick_interval = Some(1_000);

        let result = AbilityCatalog::load([ability(1, "Strike"), broken, ability(2, "Smite")]);
        assert!(matches!(
            result,
            Err(ContentError::MalformedEffect { ref ability, order: 1, .. }) if ability == "Broken"
        ));
    }
}
