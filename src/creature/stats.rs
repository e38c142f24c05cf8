//! Ability scores and their derived modifiers

use std::str::FromStr;

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, Result};

/// The six ability score names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Ability {
    #[display(fmt = "STR")]
    Str,
    #[display(fmt = "DEX")]
    Dex,
    #[display(fmt = "CON")]
    Con,
    #[display(fmt = "INT")]
    Int,
    #[display(fmt = "WIS")]
    Wis,
    #[display(fmt = "CHA")]
    Cha,
}

impl Ability {
    pub const ALL: [Ability; 6] = [
        Ability::Str,
        Ability::Dex,
        Ability::Con,
        Ability::Int,
        Ability::Wis,
        Ability::Cha,
    ];
}

impl FromStr for Ability {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "STR" => Ok(Ability::Str),
            "DEX" => Ok(Ability::Dex),
            "CON" => Ok(Ability::Con),
            "INT" => Ok(Ability::Int),
            "WIS" => Ok(Ability::Wis),
            "CHA" => Ok(Ability::Cha),
            _ => Err(EngineError::UnknownStat(s.to_string())),
        }
    }
}

/// A creature's six ability scores, all defaulting to 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    #[serde(rename = "STR")]
    pub strength: i32,
    #[serde(rename = "DEX")]
    pub dexterity: i32,
    #[serde(rename = "CON")]
    pub constitution: i32,
    #[serde(rename = "INT")]
    pub intelligence: i32,
    #[serde(rename = "WIS")]
    pub wisdom: i32,
    #[serde(rename = "CHA")]
    pub charisma: i32,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new(10, 10, 10, 10, 10, 10)
    }
}

impl Stats {
    pub const fn new(
        strength: i32,
        dexterity: i32,
        constitution: i32,
        intelligence: i32,
        wisdom: i32,
        charisma: i32,
    ) -> Self {
        Self { strength, dexterity, constitution, intelligence, wisdom, charisma }
    }

    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Str => self.strength,
            Ability::Dex => self.dexterity,
            Ability::Con => self.constitution,
            Ability::Int => self.intelligence,
            Ability::Wis => self.wisdom,
            Ability::Cha => self.charisma,
        }
    }

    pub fn set(&mut self, ability: Ability, value: i32) {
        *self.slot(ability) = value;
    }

    pub fn change(&mut self, ability: Ability, delta: i32) {
        *self.slot(ability) += delta;
    }

    /// Ability modifier: floor((value - 10) / 2).
    ///
    /// Floor division, not truncation toward zero: a score of 9 is -1, 7 is -2.
    pub fn modifier(&self, ability: Ability) -> i32 {
        (self.get(ability) - 10).div_euclid(2)
    }

    pub fn all_modifiers(&self) -> impl Iterator<Item = (Ability, i32)> + '_ {
        Ability::ALL.into_iter().map(|a| (a, self.modifier(a)))
    }

    fn slot(&mut self, ability: Ability) -> &mut i32 {
        match ability {
            Ability::Str => &mut self.strength,
            Ability::Dex => &mut self.dexterity,
            Ability::Con => &mut self.constitution,
            Ability::Int => &mut self.intelligence,
            Ability::Wis => &mut self.wisdom,
            Ability::Cha => &mut self.charisma,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_scores_are_ten() {
        let stats = Stats::default();
        for ability in Ability::ALL {
            assert_eq!(stats.get(ability), 10);
            assert_eq!(stats.modifier(ability), 0);
        }
    }

    #[test]
    fn test_modifier_uses_floor_division() {
        let mut stats = Stats::default();
        for (score, expected) in [(10, 0), (9, -1), (8, -1), (7, -2), (20, 5), (1, -5), (30, 10)] {
            stats.set(Ability::Dex, score);
            assert_eq!(stats.modifier(Ability::Dex), expected, "score {score}");
        }
    }

    #[test]
    fn test_set_and_change() {
        let mut stats = Stats::default();
        stats.set(Ability::Str, 18);
        stats.change(Ability::Cha, -2);
        assert_eq!(stats.get(Ability::Str), 18);
        assert_eq!(stats.get(Ability::Cha), 8);
    }

    #[test]
    fn test_ability_parse_is_case_insensitive() {
        assert_eq!("dex".parse::<Ability>().unwrap(), Ability::Dex);
        assert_eq!("WIS".parse::<Ability>().unwrap(), Ability::Wis);
        assert!("LCK".parse::<Ability>().is_err());
    }

    #[test]
    fn test_serde_uses_canonical_names() {
        let stats = Stats::new(13, 6, 16, 3, 6, 5);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["STR"], 13);
        assert_eq!(json["DEX"], 6);
        let back: Stats = serde_json::from_value(json).unwrap();
        assert_eq!(back, stats);
    }

    #[test]
    fn test_missing_fields_default_to_ten() {
        let stats: Stats = serde_json::from_str(r#"{"STR": 18}"#).unwrap();
        assert_eq!(stats.strength, 18);
        assert_eq!(stats.wisdom, 10);
    }

    proptest! {
        #[test]
        fn prop_modifier_matches_floor_formula(score in -50i32..100) {
            let mut stats = Stats::default();
            stats.set(Ability::Con, score);
            let expected = ((score - 10) as f64 / 2.0).floor() as i32;
            prop_assert_eq!(stats.modifier(Ability::Con), expected);
        }
    }
}
