//! Primary attributes and the named stats that scaling formulas may reference.

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::config::CombatConfig;

/// Primary attributes stored on every combatant.
///
/// Buffs and debuffs modify exactly one of these.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Attribute {
    Strength,
    Agility,
    Intelligence,
    Stamina,
    Spirit,
}

/// Every name a scaling formula or ability requirement can reference.
///
/// The first five mirror [`Attribute`]; the rest are read from level and
/// resource pools.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Stat {
    Strength,
    Agility,
    Intelligence,
    Stamina,
    Spirit,
    Level,
    Health,
    MaxHealth,
    Resource,
    MaxResource,
}

impl Stat {
    /// The primary attribute behind this stat, if it is one.
    pub const fn attribute(self) -> Option<Attribute> {
        match self {
            Self::Strength => Some(Attribute::Strength),
            Self::Agility => Some(Attribute::Agility),
            Self::Intelligence => Some(Attribute::Intelligence),
            Self::Stamina => Some(Attribute::Stamina),
            Self::Spirit => Some(Attribute::Spirit),
            Self::Level | Self::Health | Self::MaxHealth | Self::Resource | Self::MaxResource => {
                None
            }
        }
    }
}

impl From<Attribute> for Stat {
    fn from(attribute: Attribute) -> Self {
        match attribute {
            Attribute::Strength => Self::Strength,
            Attribute::Agility => Self::Agility,
            Attribute::Intelligence => Self::Intelligence,
            Attribute::Stamina => Self::Stamina,
            Attribute::Spirit => Self::Spirit,
        }
    }
}

/// Base attribute values of a combatant, before modifiers.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AttributeSet {
    pub strength: i32,
    pub agility: i32,
    pub intelligence: i32,
    pub stamina: i32,
    pub spirit: i32,
}

impl AttributeSet {
    pub fn new(strength: i32, agility: i32, intelligence: i32, stamina: i32, spirit: i32) -> Self {
        Self {
            strength,
            agility,
            intelligence,
            stamina,
            spirit,
        }
    }

    pub fn get(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Agility => self.agility,
            Attribute::Intelligence => self.intelligence,
            Attribute::Stamina => self.stamina,
            Attribute::Spirit => self.spirit,
        }
    }

    /// Builder-style override of a single attribute.
    #[must_use]
    pub fn with(mut self, attribute: Attribute, value: i32) -> Self {
        match attribute {
            Attribute::Strength => self.strength = value,
            Attribute::Agility => self.agility = value,
            Attribute::Intelligence => self.intelligence = value,
            Attribute::Stamina => self.stamina = value,
            Attribute::Spirit => self.spirit = value,
        }
        self
    }
}

impl Default for AttributeSet {
    /// Every attribute at the scaling baseline.
    fn default() -> Self {
        let base = CombatConfig::STAT_BASELINE;
        Self::new(base, base, base, base, base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn stat_names_parse_case_insensitively() {
        assert_eq!(Stat::from_str("intelligence"), Ok(Stat::Intelligence));
        assert_eq!(Stat::from_str("Intelligence"), Ok(Stat::Intelligence));
        assert_eq!(Stat::from_str("max_health"), Ok(Stat::MaxHealth));
        assert!(Stat::from_str("charisma").is_err());
    }

    #[test]
    fn every_attribute_maps_back_to_itself() {
        for attribute in Attribute::iter() {
            assert_eq!(Stat::from(attribute).attribute(), Some(attribute));
        }
    }

    #[test]
    fn with_overrides_only_the_named_attribute() {
        let set = AttributeSet::default().with(Attribute::Intelligence, 30);
        assert_eq!(set.get(Attribute::Intelligence), 30);
        assert_eq!(set.get(Attribute::Strength), 10);
    }
}
