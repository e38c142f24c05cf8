//! Creatures and the damage/heal resolution pipeline
//!
//! A creature aggregates ability scores, hit points, a resistance table and
//! a liveness flag. Damage resolution runs: resistance lookup, multiplier
//! and flat modifier, shield absorption, hit-point mutation, death or
//! heal redirection.

pub mod hit_points;
pub mod resistances;
pub mod stats;

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::error::{EngineError, Result};

pub use hit_points::{DamageOutcome, HealOutcome, HitPoints};
pub use resistances::{DamageType, ResistMode, Resistance, ResistanceTable};
pub use stats::{Ability, Stats};

/// Unique identifier for creatures (process-local, not persisted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CreatureId(pub Uuid);

impl CreatureId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CreatureId {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle to a creature.
///
/// There is exactly one logical creature per combatant; a team and the
/// battle's turn order hold handles to the same instance, never copies.
/// The engine is single-threaded, so plain `Rc<RefCell<_>>` is the whole
/// sharing story.
pub type CreatureRef = Rc<RefCell<Creature>>;

/// One combatant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Creature {
    #[serde(skip)]
    pub id: CreatureId,
    pub name: String,
    #[serde(default = "default_alive")]
    pub alive: bool,
    #[serde(default)]
    pub hp: HitPoints,
    #[serde(default)]
    pub stats: Stats,
    #[serde(default)]
    pub resistances: ResistanceTable,
}

fn default_alive() -> bool {
    true
}

/// Full account of one damage resolution, for callers that display results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DamageReport {
    pub target: String,
    pub damage_type: DamageType,
    pub initial_amount: i32,
    pub final_amount: i32,
    pub resist_multiplier: f32,
    pub resist_flat: i32,
    pub absorbed_by_shield: i32,
    pub hp_lost: i32,
    pub remaining_hp: i32,
    pub remaining_shield: i32,
    pub healed_instead: bool,
    pub heal_amount: i32,
    pub dead: bool,
}

/// Account of one heal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealReport {
    pub target: String,
    pub healed_amount: i32,
    pub remaining_hp: i32,
}

impl Creature {
    /// A creature with all-default parts: 1 hp, scores of 10, no resistances.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_parts(
            name,
            HitPoints::default(),
            Stats::default(),
            ResistanceTable::default(),
            true,
        )
    }

    pub fn with_parts(
        name: impl Into<String>,
        hp: HitPoints,
        stats: Stats,
        resistances: ResistanceTable,
        alive: bool,
    ) -> Self {
        Self { id: CreatureId::new(), name: name.into(), alive, hp, stats, resistances }
    }

    /// Wrap into the shared handle used by teams and battles.
    pub fn into_ref(self) -> CreatureRef {
        Rc::new(RefCell::new(self))
    }

    /// Resolve damage against this creature.
    ///
    /// A `Heal` resistance redirects the whole hit into healing (reported
    /// multiplier -1, no hit-point damage). Otherwise the multiplier is
    /// applied (resistant halves round down), the flat modifier is added
    /// only when some damage got through, the shield absorbs first, and
    /// `current` reaching 0 kills the creature.
    pub fn damage(&mut self, amount: i32, damage_type: DamageType) -> DamageReport {
        let amount = amount.max(0);
        let resistance = self.resistances.get(damage_type);
        let (multiplier, flat) = self.resistances.resolve(damage_type);

        let mut report = DamageReport {
            target: self.name.clone(),
            damage_type,
            initial_amount: amount,
            final_amount: 0,
            resist_multiplier: multiplier,
            resist_flat: flat,
            absorbed_by_shield: 0,
            hp_lost: 0,
            remaining_hp: self.hp.current(),
            remaining_shield: self.hp.shield(),
            healed_instead: false,
            heal_amount: 0,
            dead: !self.alive,
        };

        if resistance.mode == ResistMode::Heal {
            let heal = self.heal(amount + flat);
            report.healed_instead = true;
            report.heal_amount = heal.healed_amount;
            report.remaining_hp = heal.remaining_hp;
            return report;
        }

        let mut effective = match resistance.mode {
            ResistMode::Normal => amount,
            ResistMode::Resistant => amount / 2,
            ResistMode::Vulnerable => amount * 2,
            ResistMode::Immune => 0,
            ResistMode::Heal => unreachable!("heal redirect returns above"),
        };
        // Flat modifier only once some damage got through: immune stays at
        // exactly zero whatever the modifier says.
        if effective != 0 {
            effective += flat;
        }
        report.final_amount = effective.max(0);

        let outcome = self.hp.damage(effective);
        report.absorbed_by_shield = outcome.absorbed_by_shield;
        report.hp_lost = outcome.hp_lost;
        report.remaining_hp = outcome.remaining_hp;
        report.remaining_shield = outcome.remaining_shield;

        if self.hp.current() == 0 {
            self.die();
            report.dead = true;
        }

        report
    }

    /// Heal the creature. Dead creatures report 0 healed and stay down.
    pub fn heal(&mut self, amount: i32) -> HealReport {
        if self.alive {
            let outcome = self.hp.heal(amount);
            HealReport {
                target: self.name.clone(),
                healed_amount: outcome.healed_amount,
                remaining_hp: outcome.remaining_hp,
            }
        } else {
            tracing::debug!(name = %self.name, "healing a dead creature has no effect");
            HealReport { target: self.name.clone(), healed_amount: 0, remaining_hp: self.hp.current() }
        }
    }

    /// Kill outright: clears the liveness flag and zeroes current hit points.
    pub fn die(&mut self) {
        if self.alive {
            tracing::debug!(name = %self.name, "died");
        }
        self.alive = false;
        self.hp.set_current(0);
    }

    /// Bring the creature back at 1 hit point, whatever it was at before.
    ///
    /// Fails with `InvalidState` when the temporary ceiling is 0, since
    /// current could not be raised to 1 without breaking it; raise the
    /// ceiling first.
    pub fn resurrect(&mut self) -> Result<()> {
        if self.hp.temporary() == 0 {
            return Err(EngineError::InvalidState(format!(
                "cannot resurrect {}: temporary hit-point ceiling is 0",
                self.name
            )));
        }
        self.alive = true;
        self.hp.set_current(1);
        Ok(())
    }

    /// Temporary-ceiling and max adjustments only apply to the living.
    pub fn change_temporary(&mut self, delta: i32) {
        if self.alive {
            self.hp.change_temporary(delta);
        }
    }

    pub fn change_max(&mut self, delta: i32) {
        if self.alive {
            self.hp.change_max(delta);
        }
    }

    pub fn set_current(&mut self, value: i32) {
        self.hp.set_current(value);
    }

    pub fn set_max(&mut self, value: i32) {
        self.hp.set_max(value);
    }

    pub fn set_temporary(&mut self, value: i32) {
        self.hp.set_temporary(value);
    }

    pub fn stat(&self, ability: Ability) -> i32 {
        self.stats.get(ability)
    }

    pub fn modifier(&self, ability: Ability) -> i32 {
        self.stats.modifier(ability)
    }

    /// String-keyed stat access for callers holding raw text.
    pub fn stat_named(&self, name: &str) -> Result<i32> {
        Ok(self.stats.get(name.parse::<Ability>()?))
    }

    pub fn modifier_named(&self, name: &str) -> Result<i32> {
        Ok(self.stats.modifier(name.parse::<Ability>()?))
    }

    pub fn resistance(&self, damage_type: DamageType) -> Resistance {
        self.resistances.get(damage_type)
    }

    pub fn set_resistance(&mut self, damage_type: DamageType, mode: ResistMode, flat_modifier: i32) {
        self.resistances.set(damage_type, mode, flat_modifier);
    }

    pub fn set_resistance_named(
        &mut self,
        damage_type: &str,
        mode: &str,
        flat_modifier: i32,
    ) -> Result<()> {
        self.resistances.set_named(damage_type, mode, flat_modifier)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}
