//! Named rosters of creatures
//!
//! A team owns membership; the battle owns turn ordering. Both hold shared
//! handles to the same creature instances.

use std::fs;
use std::path::Path;
use std::rc::Rc;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::error::Result;
use crate::creature::{Creature, CreatureRef};

/// A named ordered collection of creatures.
#[derive(Debug, Clone, Default)]
pub struct Team {
    pub name: String,
    members: Vec<CreatureRef>,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), members: Vec::new() }
    }

    pub fn with_members(name: impl Into<String>, members: Vec<CreatureRef>) -> Self {
        Self { name: name.into(), members }
    }

    pub fn add(&mut self, creature: CreatureRef) {
        self.members.push(creature);
    }

    /// Remove by handle identity. Returns whether anything was removed.
    pub fn remove(&mut self, creature: &CreatureRef) -> bool {
        let before = self.members.len();
        self.members.retain(|member| !Rc::ptr_eq(member, creature));
        self.members.len() != before
    }

    pub fn alive_members(&self) -> Vec<CreatureRef> {
        self.members
            .iter()
            .filter(|member| member.borrow().alive)
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CreatureRef> {
        self.members.iter()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
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

// Wire format: {"team_name": ..., "teammates": [...]} with the same key on
// both sides of the trip.
#[derive(Deserialize)]
struct TeamRecord {
    team_name: String,
    #[serde(default)]
    teammates: Vec<Creature>,
}

impl Serialize for Team {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let teammates: Vec<Creature> =
            self.members.iter().map(|member| member.borrow().clone()).collect();
        let mut state = serializer.serialize_struct("Team", 2)?;
        state.serialize_field("team_name", &self.name)?;
        state.serialize_field("teammates", &teammates)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for Team {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let record = TeamRecord::deserialize(deserializer)?;
        Ok(Team {
            name: record.team_name,
            members: record.teammates.into_iter().map(Creature::into_ref).collect(),
        })
    }
}
