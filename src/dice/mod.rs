//! Dice rolling and the hit-point formula mini-language
//!
//! All randomness in the engine flows through [`EntropySource`] so callers
//! can inject a seeded generator and replay a battle exactly.

use std::str::FromStr;

use rand::{Rng, RngCore};

use crate::core::error::{EngineError, Result};

/// Supplies uniform random values for dice rolls and sort tie-breaking.
pub trait EntropySource {
    /// Uniform integer in `[low, high]`, both ends inclusive.
    fn uniform_int(&mut self, low: i32, high: i32) -> i32;

    /// Uniform value in `[0, 1)`, consumed once per entry per turn-order sort.
    fn tie_break(&mut self) -> f64;
}

impl<R: RngCore> EntropySource for R {
    fn uniform_int(&mut self, low: i32, high: i32) -> i32 {
        self.gen_range(low..=high)
    }

    fn tie_break(&mut self) -> f64 {
        self.gen()
    }
}

/// Standard d20 check roll, used for every unassisted initiative roll.
pub fn roll_d20(rng: &mut dyn EntropySource) -> i32 {
    rng.uniform_int(1, 20)
}

/// A group of identical dice, e.g. the `6d8` in `"18 + 6d8"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceGroup {
    pub count: u32,
    pub sides: u32,
}

/// Parsed hit-point formula: a flat base plus any number of dice groups.
///
/// Accepts strings like `"18 + 6d8"`, `"3d10 + 12"` or `"8d8"`, with terms
/// joined by `+` in any order. Whitespace is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiceFormula {
    pub base: i32,
    pub dice: Vec<DiceGroup>,
}

impl DiceFormula {
    /// Roll the formula: base + `count` independent rolls of each group.
    pub fn roll(&self, rng: &mut dyn EntropySource) -> i32 {
        let mut total = self.base;
        for group in &self.dice {
            for _ in 0..group.count {
                total += rng.uniform_int(1, group.sides as i32);
            }
        }
        total
    }

    /// Smallest total the formula can roll.
    pub fn min_total(&self) -> i32 {
        self.base + self.dice.iter().map(|g| g.count as i32).sum::<i32>()
    }

    /// Largest total the formula can roll.
    pub fn max_total(&self) -> i32 {
        self.base + self.dice.iter().map(|g| (g.count * g.sides) as i32).sum::<i32>()
    }
}

impl FromStr for DiceFormula {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let compact: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        if compact.is_empty() {
            return Err(EngineError::InvalidFormula(s.to_string()));
        }

        let mut base = 0i32;
        let mut dice = Vec::new();
        for term in compact.split('+') {
            if let Some((count, sides)) = term.split_once('d') {
                let count: u32 = count
                    .parse()
                    .map_err(|_| EngineError::InvalidFormula(s.to_string()))?;
                let sides: u32 = sides
                    .parse()
                    .map_err(|_| EngineError::InvalidFormula(s.to_string()))?;
                if count == 0 || sides == 0 {
                    return Err(EngineError::InvalidFormula(s.to_string()));
                }
                dice.push(DiceGroup { count, sides });
            } else {
                let value: i32 = term
                    .parse()
                    .map_err(|_| EngineError::InvalidFormula(s.to_string()))?;
                base += value;
            }
        }

        Ok(Self { base, dice })
    }
}
