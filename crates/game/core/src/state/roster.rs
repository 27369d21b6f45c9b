use std::collections::BTreeMap;

use super::combatant::Combatant;
use super::common::CombatantId;

/// Lookup of combatants by id.
///
/// The scheduler and engine only need this much; sessions can back it with
/// whatever store they already have.
pub trait CombatantStore {
    fn combatant(&self, id: CombatantId) -> Option<&Combatant>;

    fn combatant_mut(&mut self, id: CombatantId) -> Option<&mut Combatant>;

    fn contains(&self, id: CombatantId) -> bool {
        self.combatant(id).is_some()
    }
}

/// Ordered in-memory combatant store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Roster {
    combatants: BTreeMap<CombatantId, Combatant>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a combatant, returning the previous snapshot.
    pub fn insert(&mut self, combatant: Combatant) -> Option<Combatant> {
        self.combatants.insert(combatant.id, combatant)
    }

    pub fn remove(&mut self, id: CombatantId) -> Option<Combatant> {
        self.combatants.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.values()
    }

    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }
}

impl CombatantStore for Roster {
    fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.get(&id)
    }

    fn combatant_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.combatants.get_mut(&id)
    }
}

impl FromIterator<Combatant> for Roster {
    fn from_iter<T: IntoIterator<Item = Combatant>>(iter: T) -> Self {
        let mut roster = Self::new();
        for combatant in iter {
            roster.insert(combatant);
        }
        roster
    }
}
