//! Opponent roster as reconstructed from observed events

use crate::core::types::{Condition, Status};
use ahash::AHashMap;

/// One combatant, as far as it has been observed
#[derive(Debug, Clone, PartialEq)]
pub struct RosterMember {
    pub species: String,
    pub condition: Condition,
    pub active: bool,
    pub ability: Option<String>,
    pub item: Option<String>,
    /// Moves seen in use, in first-use order
    pub moves: Vec<String>,
    pub tera_type: Option<String>,
}

impl RosterMember {
    pub fn new(species: impl Into<String>) -> Self {
        Self {
            species: species.into(),
            condition: Condition::full(),
            active: false,
            ability: None,
            item: None,
            moves: Vec::new(),
            tera_type: None,
        }
    }

    pub fn fainted(&self) -> bool {
        self.condition.fainted
    }

    pub fn status(&self) -> Status {
        self.condition.status
    }

    pub fn hp_fraction(&self) -> f32 {
        self.condition.fraction()
    }

    pub(crate) fn reveal_move(&mut self, move_name: &str) {
        if !self.moves.iter().any(|m| m == move_name) {
            self.moves.push(move_name.to_string());
        }
    }
}

/// Members discovered so far, keyed by species
///
/// Entries are never removed; iteration follows first-sighting order.
#[derive(Debug, Clone, Default)]
pub struct BeliefState {
    members: Vec<RosterMember>,
    index: AHashMap<String, usize>,
}

impl BeliefState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, species: &str) -> Option<&RosterMember> {
        self.index.get(species).map(|&i| &self.members[i])
    }

    pub(crate) fn get_mut(&mut self, species: &str) -> Option<&mut RosterMember> {
        let i = *self.index.get(species)?;
        Some(&mut self.members[i])
    }

    /// Resolve or lazily create the entry for `species`
    pub(crate) fn entry(&mut self, species: &str) -> &mut RosterMember {
        let i = match self.index.get(species) {
            Some(&i) => i,
            None => {
                self.members.push(RosterMember::new(species));
                let i = self.members.len() - 1;
                self.index.insert(species.to_string(), i);
                i
            }
        };
        &mut self.members[i]
    }

    /// Mark `species` as the only active member
    pub(crate) fn set_active(&mut self, species: &str) {
        for member in &mut self.members {
            member.active = member.species == species;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RosterMember> {
        self.members.iter()
    }

    pub fn active(&self) -> Option<&RosterMember> {
        self.members.iter().find(|m| m.active)
    }

    pub fn active_count(&self) -> usize {
        self.members.iter().filter(|m| m.active).count()
    }

    pub(crate) fn clear(&mut self) {
        self.members.clear();
        self.index.clear();
    }
}
