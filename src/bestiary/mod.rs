//! Archetype registry for spawning stock creatures
//!
//! Archetypes are data-only bundles (stat block, hit-point formula,
//! resistance overrides) registered explicitly at startup, not discovered
//! at runtime. Extra archetypes can be layered in from TOML files.

use std::fs;
use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, Result};
use crate::creature::{Creature, DamageType, HitPoints, ResistMode, ResistanceTable, Stats};
use crate::dice::EntropySource;

/// One resistance override in an archetype definition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResistanceOverride {
    pub damage_type: DamageType,
    pub mode: ResistMode,
    #[serde(default)]
    pub flat_modifier: i32,
}

/// Data-only description of a creature archetype.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchetypeDef {
    /// Registry key, e.g. `"bloated_zombie"`.
    pub key: String,
    /// Default creature name when spawning, e.g. `"Bloated Zombie"`.
    pub display_name: String,
    /// Hit-point dice formula, e.g. `"18 + 6d8"`.
    pub hp_formula: String,
    #[serde(default)]
    pub temporary: i32,
    #[serde(default)]
    pub shield: i32,
    #[serde(default)]
    pub stats: Stats,
    #[serde(default)]
    pub resistances: Vec<ResistanceOverride>,
}

impl ArchetypeDef {
    /// Build a creature from this definition under its display name.
    pub fn spawn(&self, rng: &mut dyn EntropySource) -> Result<Creature> {
        self.spawn_named(self.display_name.clone(), rng)
    }

    /// Build a creature from this definition under a custom name, rolling
    /// its hit points and applying the stat block and resistance overrides.
    pub fn spawn_named(
        &self,
        name: impl Into<String>,
        rng: &mut dyn EntropySource,
    ) -> Result<Creature> {
        let hp = HitPoints::rolled(&self.hp_formula, self.temporary, self.shield, rng)?;
        let mut resistances = ResistanceTable::default();
        for entry in &self.resistances {
            resistances.set(entry.damage_type, entry.mode, entry.flat_modifier);
        }
        Ok(Creature::with_parts(name, hp, self.stats, resistances, true))
    }
}

/// The archetype registry.
#[derive(Debug, Clone, Default)]
pub struct Bestiary {
    defs: AHashMap<String, ArchetypeDef>,
}

/// TOML document shape for external archetype files:
/// one or more `[[archetype]]` tables.
#[derive(Deserialize)]
struct ArchetypeFile {
    #[serde(default)]
    archetype: Vec<ArchetypeDef>,
}

impl Bestiary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the stock undead archetypes.
    pub fn standard() -> Self {
        let mut bestiary = Self::new();
        for def in standard_defs() {
            bestiary.register(def);
        }
        bestiary
    }

    /// Later registrations under the same key win.
    pub fn register(&mut self, def: ArchetypeDef) {
        self.defs.insert(def.key.clone(), def);
    }

    pub fn get(&self, key: &str) -> Option<&ArchetypeDef> {
        self.defs.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.defs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn spawn(&self, key: &str, rng: &mut dyn EntropySource) -> Result<Creature> {
        self.lookup(key)?.spawn(rng)
    }

    pub fn spawn_named(
        &self,
        key: &str,
        name: impl Into<String>,
        rng: &mut dyn EntropySource,
    ) -> Result<Creature> {
        self.lookup(key)?.spawn_named(name, rng)
    }

    /// Register every archetype in a TOML document. Returns how many.
    pub fn load_toml(&mut self, content: &str) -> Result<usize> {
        let file: ArchetypeFile = toml::from_str(content)?;
        let count = file.archetype.len();
        for def in file.archetype {
            tracing::debug!(key = %def.key, "registered archetype");
            self.register(def);
        }
        Ok(count)
    }

    /// Register every archetype from the `.toml` files in a directory.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize> {
        let mut count = 0;
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "toml") {
                let content = fs::read_to_string(&path)?;
                count += self.load_toml(&content)?;
            }
        }
        Ok(count)
    }

    fn lookup(&self, key: &str) -> Result<&ArchetypeDef> {
        self.defs
            .get(key)
            .ok_or_else(|| EngineError::UnknownArchetype(key.to_string()))
    }
}

fn standard_defs() -> Vec<ArchetypeDef> {
    use DamageType::*;
    use ResistMode::*;

    let def = |key: &str,
               display_name: &str,
               hp_formula: &str,
               stats: Stats,
               overrides: &[(DamageType, ResistMode)]| {
        ArchetypeDef {
            key: key.to_string(),
            display_name: display_name.to_string(),
            hp_formula: hp_formula.to_string(),
            temporary: 0,
            shield: 0,
            stats,
            resistances: overrides
                .iter()
                .map(|&(damage_type, mode)| ResistanceOverride {
                    damage_type,
                    mode,
                    flat_modifier: 0,
                })
                .collect(),
        }
    };

    vec![
        def(
            "zombie",
            "Zombie",
            "9 + 3d8",
            Stats::new(13, 6, 16, 3, 6, 5),
            &[(Poison, Immune), (PoisonMagic, Immune)],
        ),
        def(
            "skeleton",
            "Skeleton",
            "4 + 2d6",
            Stats::new(10, 14, 15, 6, 8, 5),
            &[
                (Poison, Immune),
                (PoisonMagic, Immune),
                (Bludgeoning, Vulnerable),
                (BludgeoningMagic, Vulnerable),
            ],
        ),
        def(
            "ghoul",
            "Ghoul",
            "5d8",
            Stats::new(13, 15, 10, 7, 10, 6),
            &[(Poison, Immune), (PoisonMagic, Immune)],
        ),
        def(
            "ghast",
            "Ghast",
            "8d8",
            Stats::new(16, 17, 10, 11, 10, 8),
            &[
                (Poison, Immune),
                (PoisonMagic, Immune),
                (Necrotic, Resistant),
                (NecroticMagic, Resistant),
            ],
        ),
        def(
            "big_skeleton",
            "Big Skeleton",
            "20 + 6d6",
            Stats::new(16, 12, 20, 6, 8, 5),
            &[
                (Poison, Immune),
                (PoisonMagic, Immune),
                (Bludgeoning, Vulnerable),
                (BludgeoningMagic, Vulnerable),
            ],
        ),
        def(
            "bloated_zombie",
            "Bloated Zombie",
            "18 + 6d8",
            Stats::new(15, 5, 16, 3, 9, 5),
            &[
                (Poison, Immune),
                (PoisonMagic, Immune),
                (Bludgeoning, Resistant),
                (BludgeoningMagic, Resistant),
                (Slashing, Vulnerable),
                (SlashingMagic, Vulnerable),
                (Piercing, Vulnerable),
                (PiercingMagic, Vulnerable),
            ],
        ),
        def(
            "blood_meat_husk",
            "Blood Meat Husk",
            "60 + 20d8",
            Stats::new(13, 6, 16, 3, 6, 5),
            &[
                (Poison, Immune),
                (PoisonMagic, Immune),
                (Fire, Vulnerable),
                (FireMagic, Vulnerable),
                (Piercing, Vulnerable),
                (PiercingMagic, Vulnerable),
            ],
        ),
    ]
}
