//! Hit-point bookkeeping: max, current, temporary ceiling and shield
//!
//! Mutation goes through the operations below, never direct field writes,
//! so `0 <= current <= temporary` holds after every call. Negative amounts
//! are treated as zero.

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::dice::{DiceFormula, EntropySource};

/// Hit-point counters for one creature.
///
/// `temporary` is a ceiling on `current` distinct from `max` (buffs can
/// raise it past `max`, drains can pull it below). `shield` is a damage
/// buffer consumed before hit points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HpRecord", into = "HpRecord")]
pub struct HitPoints {
    max: i32,
    current: i32,
    temporary: i32,
    shield: i32,
}

impl Default for HitPoints {
    fn default() -> Self {
        Self::new(1, 1, 0, 0)
    }
}

/// What a single `damage` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DamageOutcome {
    pub initial_damage: i32,
    pub absorbed_by_shield: i32,
    pub hp_lost: i32,
    pub remaining_shield: i32,
    pub remaining_hp: i32,
    pub dead: bool,
}

/// What a single `heal` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealOutcome {
    pub healed_amount: i32,
    pub remaining_hp: i32,
}

impl HitPoints {
    /// A `temporary` of 0 means "no separate ceiling" and defaults to `max`.
    pub fn new(max: i32, current: i32, temporary: i32, shield: i32) -> Self {
        let max = max.max(0);
        let temporary = if temporary == 0 { max } else { temporary.max(0) };
        Self {
            max,
            current: current.clamp(0, temporary),
            temporary,
            shield: shield.max(0),
        }
    }

    /// Full health: max = current = total, no shield or separate ceiling.
    pub fn full(total: i32) -> Self {
        Self::new(total, total, 0, 0)
    }

    /// Roll a dice formula (e.g. `"9 + 3d8"`) for max and current.
    pub fn rolled(
        formula: &str,
        temporary: i32,
        shield: i32,
        rng: &mut dyn EntropySource,
    ) -> Result<Self> {
        let total = formula.parse::<DiceFormula>()?.roll(rng);
        Ok(Self::new(total, total, temporary, shield))
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn temporary(&self) -> i32 {
        self.temporary
    }

    pub fn shield(&self) -> i32 {
        self.shield
    }

    /// Apply damage: the shield absorbs first, the remainder comes off
    /// `current`, floor-clamped at 0. `dead` is set iff `current` reaches
    /// exactly 0 in this call.
    pub fn damage(&mut self, amount: i32) -> DamageOutcome {
        let mut damage = amount.max(0);
        let mut outcome = DamageOutcome {
            initial_damage: damage,
            absorbed_by_shield: 0,
            hp_lost: 0,
            remaining_shield: self.shield,
            remaining_hp: self.current,
            dead: false,
        };

        if self.shield > 0 {
            let absorbed = damage.min(self.shield);
            self.shield -= absorbed;
            damage -= absorbed;
            outcome.absorbed_by_shield = absorbed;
            outcome.remaining_shield = self.shield;
        }

        if damage > 0 {
            let before = self.current;
            self.current = (self.current - damage).max(0);
            outcome.hp_lost = before - self.current;
            outcome.remaining_hp = self.current;
            if self.current == 0 {
                outcome.dead = true;
            }
        }

        outcome
    }

    /// Restore hit points, capped at `max` (and never past the temporary
    /// ceiling). Healing never lowers `current`; the outcome reports the
    /// actual delta, 0 when already full.
    pub fn heal(&mut self, amount: i32) -> HealOutcome {
        let amount = amount.max(0);
        let before = self.current;
        let ceiling = self.max.min(self.temporary);
        self.current = (self.current + amount).min(ceiling).max(before);
        HealOutcome {
            healed_amount: self.current - before,
            remaining_hp: self.current,
        }
    }

    /// Shift the temporary ceiling. A raise lets `current` rise by the same
    /// amount (capped at the new ceiling); a drop clamps `current` down to it.
    pub fn change_temporary(&mut self, delta: i32) {
        self.temporary = (self.temporary + delta).max(0);
        if delta > 0 {
            self.current = (self.current + delta).min(self.temporary);
        } else {
            self.current = self.current.min(self.temporary);
        }
    }

    /// Shift `max` and `temporary` together, reconciling `current` the same
    /// way `change_temporary` does.
    pub fn change_max(&mut self, delta: i32) {
        self.max = (self.max + delta).max(0);
        self.temporary = (self.temporary + delta).max(0);
        if delta > 0 {
            self.current = (self.current + delta).min(self.temporary);
        } else {
            self.current = self.current.min(self.temporary);
        }
    }

    pub fn set_current(&mut self, value: i32) {
        self.current = value.clamp(0, self.temporary);
    }

    /// Sets `max` and resets the temporary ceiling to match.
    pub fn set_max(&mut self, value: i32) {
        self.max = value.max(0);
        self.temporary = self.max;
        self.current = self.current.min(self.temporary);
    }

    pub fn set_temporary(&mut self, value: i32) {
        self.temporary = value.max(0);
        self.current = self.current.min(self.temporary);
    }
}

/// Wire format: `{"max_hp", "real_hp", "temp_hp", "shield"}`. Reading goes
/// back through the constructor so raw records pick up the same clamping
/// and temp-defaults-to-max rules as fresh values.
#[derive(Serialize, Deserialize)]
#[serde(default)]
struct HpRecord {
    max_hp: i32,
    real_hp: i32,
    temp_hp: i32,
    shield: i32,
}

impl Default for HpRecord {
    fn default() -> Self {
        Self { max_hp: 1, real_hp: 1, temp_hp: 0, shield: 0 }
    }
}

impl From<HpRecord> for HitPoints {
    fn from(record: HpRecord) -> Self {
        Self::new(record.max_hp, record.real_hp, record.temp_hp, record.shield)
    }
}

impl From<HitPoints> for HpRecord {
    fn from(hp: HitPoints) -> Self {
        Self {
            max_hp: hp.max,
            real_hp: hp.current,
            temp_hp: hp.temporary,
            shield: hp.shield,
        }
    }
}

impl std::fmt::Display for HitPoints {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}hp (+{} temp, {} shield)",
            self.current, self.max, self.temporary, self.shield
        )
    }
}
