//! Damage types and the per-creature resistance table
//!
//! The table is a fixed-size array indexed by the damage-type tag, so it is
//! structurally total over the type set: every type always resolves to
//! something, `(normal, 0)` unless overridden.

use std::collections::BTreeMap;
use std::str::FromStr;

use derive_more::Display;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::error::{EngineError, Result};

/// The fixed damage-type enumeration: `true` damage plus 13 base types,
/// each base type with a magical variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    True,
    Bludgeoning,
    BludgeoningMagic,
    Piercing,
    PiercingMagic,
    Slashing,
    SlashingMagic,
    Acid,
    AcidMagic,
    Cold,
    ColdMagic,
    Fire,
    FireMagic,
    Force,
    ForceMagic,
    Lightning,
    LightningMagic,
    Necrotic,
    NecroticMagic,
    Poison,
    PoisonMagic,
    Psychic,
    PsychicMagic,
    Radiant,
    RadiantMagic,
    Thunder,
    ThunderMagic,
}

impl DamageType {
    pub const COUNT: usize = 27;

    pub const ALL: [DamageType; Self::COUNT] = [
        DamageType::True,
        DamageType::Bludgeoning,
        DamageType::BludgeoningMagic,
        DamageType::Piercing,
        DamageType::PiercingMagic,
        DamageType::Slashing,
        DamageType::SlashingMagic,
        DamageType::Acid,
        DamageType::AcidMagic,
        DamageType::Cold,
        DamageType::ColdMagic,
        DamageType::Fire,
        DamageType::FireMagic,
        DamageType::Force,
        DamageType::ForceMagic,
        DamageType::Lightning,
        DamageType::LightningMagic,
        DamageType::Necrotic,
        DamageType::NecroticMagic,
        DamageType::Poison,
        DamageType::PoisonMagic,
        DamageType::Psychic,
        DamageType::PsychicMagic,
        DamageType::Radiant,
        DamageType::RadiantMagic,
        DamageType::Thunder,
        DamageType::ThunderMagic,
    ];

    /// Canonical snake_case name, also the wire format.
    pub fn name(self) -> &'static str {
        match self {
            DamageType::True => "true",
            DamageType::Bludgeoning => "bludgeoning",
            DamageType::BludgeoningMagic => "bludgeoning_magic",
            DamageType::Piercing => "piercing",
            DamageType::PiercingMagic => "piercing_magic",
            DamageType::Slashing => "slashing",
            DamageType::SlashingMagic => "slashing_magic",
            DamageType::Acid => "acid",
            DamageType::AcidMagic => "acid_magic",
            DamageType::Cold => "cold",
            DamageType::ColdMagic => "cold_magic",
            DamageType::Fire => "fire",
            DamageType::FireMagic => "fire_magic",
            DamageType::Force => "force",
            DamageType::ForceMagic => "force_magic",
            DamageType::Lightning => "lightning",
            DamageType::LightningMagic => "lightning_magic",
            DamageType::Necrotic => "necrotic",
            DamageType::NecroticMagic => "necrotic_magic",
            DamageType::Poison => "poison",
            DamageType::PoisonMagic => "poison_magic",
            DamageType::Psychic => "psychic",
            DamageType::PsychicMagic => "psychic_magic",
            DamageType::Radiant => "radiant",
            DamageType::RadiantMagic => "radiant_magic",
            DamageType::Thunder => "thunder",
            DamageType::ThunderMagic => "thunder_magic",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for DamageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DamageType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|dt| dt.name() == s)
            .ok_or_else(|| EngineError::UnknownDamageType(s.to_string()))
    }
}

/// How damage of one type is transformed before hit-point application.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ResistMode {
    #[default]
    #[display(fmt = "normal")]
    Normal,
    #[display(fmt = "resistant")]
    Resistant,
    #[display(fmt = "vulnerable")]
    Vulnerable,
    #[display(fmt = "immune")]
    Immune,
    #[display(fmt = "heal")]
    Heal,
}

impl ResistMode {
    /// Damage multiplier reported to callers. -1 is the heal-redirect
    /// sentinel: the damage pipeline converts the whole hit into healing.
    /// Immune is plain zero damage, never a heal.
    pub fn multiplier(self) -> f32 {
        match self {
            ResistMode::Normal => 1.0,
            ResistMode::Resistant => 0.5,
            ResistMode::Vulnerable => 2.0,
            ResistMode::Immune => 0.0,
            ResistMode::Heal => -1.0,
        }
    }
}

impl FromStr for ResistMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "normal" => Ok(ResistMode::Normal),
            "resistant" => Ok(ResistMode::Resistant),
            "vulnerable" => Ok(ResistMode::Vulnerable),
            "immune" => Ok(ResistMode::Immune),
            "heal" => Ok(ResistMode::Heal),
            _ => Err(EngineError::InvalidMode(s.to_string())),
        }
    }
}

/// One resistance entry: mode plus a flat damage modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resistance {
    pub mode: ResistMode,
    #[serde(default)]
    pub flat_modifier: i32,
}

/// Per-creature resistance table, total over all 27 damage types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResistanceTable {
    entries: [Resistance; DamageType::COUNT],
}

impl Default for ResistanceTable {
    fn default() -> Self {
        Self { entries: [Resistance::default(); DamageType::COUNT] }
    }
}

impl ResistanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, damage_type: DamageType) -> Resistance {
        self.entries[damage_type.index()]
    }

    pub fn set(&mut self, damage_type: DamageType, mode: ResistMode, flat_modifier: i32) {
        self.entries[damage_type.index()] = Resistance { mode, flat_modifier };
    }

    /// String-keyed variant for callers holding raw text (UI, persistence).
    pub fn set_named(&mut self, damage_type: &str, mode: &str, flat_modifier: i32) -> Result<()> {
        let damage_type = damage_type.parse::<DamageType>()?;
        let mode = mode.parse::<ResistMode>()?;
        self.set(damage_type, mode, flat_modifier);
        Ok(())
    }

    /// Resolve to the `(multiplier, flat_modifier)` pair the damage
    /// pipeline consumes.
    pub fn resolve(&self, damage_type: DamageType) -> (f32, i32) {
        let entry = self.get(damage_type);
        (entry.mode.multiplier(), entry.flat_modifier)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DamageType, Resistance)> + '_ {
        DamageType::ALL.into_iter().map(|dt| (dt, self.get(dt)))
    }
}

// Wire format: a JSON object with one entry per damage type, always all 27
// on write. The reader tolerates partial maps (missing types stay normal)
// and rejects unknown keys and modes.
impl Serialize for ResistanceTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(DamageType::COUNT))?;
        for (damage_type, entry) in self.iter() {
            map.serialize_entry(damage_type.name(), &entry)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ResistanceTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let entries = BTreeMap::<String, Resistance>::deserialize(deserializer)?;
        let mut table = ResistanceTable::default();
        for (key, entry) in entries {
            let damage_type = key.parse::<DamageType>().map_err(serde::de::Error::custom)?;
            table.entries[damage_type.index()] = entry;
        }
        Ok(table)
    }
}
