//! Initiative scheduling and the battle turn loop
//!
//! A battle moves through two states: staging (collecting creatures, no
//! turn order) and active (turn order live, irreversible). `set_initiative`
//! is the one-way transition. Creatures joining an active battle roll on
//! the spot and the whole order is re-sorted.

pub mod roster;

use std::rc::Rc;

use ordered_float::OrderedFloat;

use crate::core::error::{EngineError, Result};
use crate::creature::{Ability, CreatureRef};
use crate::dice::{roll_d20, EntropySource};

pub use roster::Team;

/// How an initiative roll is obtained for a joining creature: rolled
/// against the injected entropy source, or supplied by the caller (e.g.
/// typed in at the table). The DEX modifier is added either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollSource {
    Random,
    Supplied(i32),
}

impl RollSource {
    fn resolve(self, rng: &mut dyn EntropySource) -> i32 {
        match self {
            RollSource::Random => roll_d20(rng),
            RollSource::Supplied(roll) => roll,
        }
    }
}

/// One slot in the turn order.
#[derive(Debug, Clone)]
pub struct TurnEntry {
    pub creature: CreatureRef,
    pub initiative: i32,
}

/// The active creature for one turn.
#[derive(Debug, Clone)]
pub struct Turn {
    pub round: u32,
    pub creature: CreatureRef,
    pub initiative: i32,
}

/// Initiative scheduler: owns the turn order, round counter and active-turn
/// cursor for one battle.
#[derive(Debug, Default)]
pub struct Battle {
    teams: Vec<Team>,
    turn_order: Vec<TurnEntry>,
    round: u32,
    cursor: usize,
    pending: Vec<CreatureRef>,
    started: bool,
    active_index: Option<usize>,
}

impl Battle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a team. Mid-battle, every member immediately rolls and
    /// joins the live turn order.
    pub fn add_team(&mut self, team: Team, rng: &mut dyn EntropySource) {
        if self.started {
            for member in team.iter() {
                self.insert_live(Rc::clone(member), RollSource::Random, rng);
            }
        }
        self.teams.push(team);
    }

    /// Add a single creature: staged while the battle has not started,
    /// otherwise inserted into the live order with `source`.
    pub fn add_creature(
        &mut self,
        creature: CreatureRef,
        source: RollSource,
        rng: &mut dyn EntropySource,
    ) {
        if self.started {
            self.insert_live(creature, source, rng);
        } else {
            tracing::info!(name = %creature.borrow().name, "staged for battle start");
            self.pending.push(creature);
        }
    }

    /// Every known creature (team members plus staged singles) paired with
    /// a placeholder initiative of 0, ready for a caller collecting manual
    /// rolls to feed into `set_initiative`.
    pub fn initiative_list(&self) -> Vec<(CreatureRef, i32)> {
        let mut all = Vec::new();
        for team in &self.teams {
            for member in team.iter() {
                all.push((Rc::clone(member), 0));
            }
        }
        for creature in &self.pending {
            all.push((Rc::clone(creature), 0));
        }
        all
    }

    /// Finalize initiative and start the battle. For each entry the
    /// initiative is `(entry roll if use_manual, else d20) + DEX modifier`.
    ///
    /// Irreversible; calling again on an active battle returns
    /// `AlreadyStarted` and changes nothing.
    pub fn set_initiative(
        &mut self,
        entries: &[(CreatureRef, i32)],
        use_manual: bool,
        rng: &mut dyn EntropySource,
    ) -> Result<()> {
        if self.started {
            return Err(EngineError::AlreadyStarted);
        }

        self.turn_order.clear();
        self.round = 0;
        self.cursor = 0;
        self.active_index = None;
        self.started = true;
        // Entries are expected to cover the staged creatures (see
        // `initiative_list`), so the pending set just empties here.
        self.pending.clear();

        for (creature, roll) in entries {
            let base = if use_manual { *roll } else { roll_d20(rng) };
            let initiative = base + creature.borrow().modifier(Ability::Dex);
            self.turn_order.push(TurnEntry { creature: Rc::clone(creature), initiative });
        }
        self.sort_turn_order(rng);
        tracing::info!(combatants = self.turn_order.len(), "initiative set, battle started");
        Ok(())
    }

    /// Late arrival: rolls (or accepts) initiative and re-sorts the order.
    pub fn add_creature_mid_battle(
        &mut self,
        creature: CreatureRef,
        source: RollSource,
        rng: &mut dyn EntropySource,
    ) {
        self.insert_live(creature, source, rng);
    }

    /// Late team arrival: every member rolls, then one re-sort.
    pub fn add_team_mid_battle(&mut self, team: Team, rng: &mut dyn EntropySource) {
        for member in team.iter() {
            let initiative = roll_d20(rng) + member.borrow().modifier(Ability::Dex);
            self.turn_order.push(TurnEntry { creature: Rc::clone(member), initiative });
        }
        self.teams.push(team);
        self.sort_turn_order(rng);
    }

    /// Advance to the next living creature's turn.
    ///
    /// Fails with `NoTurnOrder` before `set_initiative`. Dead creatures are
    /// skipped without consuming a turn. The round counter ticks whenever
    /// the scan touches the top of the order, before the aliveness check,
    /// so the first call reports round 1 and each full lap adds exactly 1.
    /// When a whole lap finds nobody alive the battle is over: `Ok(None)`,
    /// and no active index remains.
    pub fn next_turn(&mut self) -> Result<Option<Turn>> {
        if self.turn_order.is_empty() {
            return Err(EngineError::NoTurnOrder);
        }

        for _ in 0..self.turn_order.len() {
            let idx = self.cursor;
            let entry = self.turn_order[idx].clone();
            self.active_index = Some(idx);

            self.cursor += 1;
            if self.cursor >= self.turn_order.len() {
                self.cursor = 0;
            }

            if idx == 0 {
                self.round += 1;
            }

            if entry.creature.borrow().alive {
                return Ok(Some(Turn {
                    round: self.round,
                    creature: entry.creature,
                    initiative: entry.initiative,
                }));
            }
            tracing::debug!(name = %entry.creature.borrow().name, "dead, skipping turn");
        }

        tracing::info!("all creatures are dead, battle over");
        self.active_index = None;
        Ok(None)
    }

    pub fn turn_order(&self) -> &[TurnEntry] {
        &self.turn_order
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn has_started(&self) -> bool {
        self.started
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    fn insert_live(
        &mut self,
        creature: CreatureRef,
        source: RollSource,
        rng: &mut dyn EntropySource,
    ) {
        let initiative = source.resolve(rng) + creature.borrow().modifier(Ability::Dex);
        tracing::info!(name = %creature.borrow().name, initiative, "joined the turn order");
        self.turn_order.push(TurnEntry { creature, initiative });
        self.sort_turn_order(rng);
    }

    /// Descending by initiative, then DEX modifier, then a fresh random
    /// tie-break per invocation. Re-sorting may reorder exact ties; that is
    /// deliberate.
    fn sort_turn_order(&mut self, rng: &mut dyn EntropySource) {
        self.turn_order.sort_by_cached_key(|entry| {
            let dex = entry.creature.borrow().modifier(Ability::Dex);
            std::cmp::Reverse((entry.initiative, dex, OrderedFloat(rng.tie_break())))
        });
    }
}
