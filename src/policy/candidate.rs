//! Legal options offered to a policy for one slot

use crate::core::types::Condition;
use crate::dex::{Dex, MoveData};
use crate::protocol::request::{MoveSlot, SidePokemon};

/// A usable move of the acting combatant
#[derive(Debug, Clone)]
pub struct MoveCandidate {
    /// 1-based index in the request's move list
    pub index: usize,
    pub name: String,
    pub pp: Option<u32>,
    pub maxpp: Option<u32>,
    /// Static data, absent when the oracle does not know the move
    pub data: Option<MoveData>,
}

impl MoveCandidate {
    pub fn from_slot(index: usize, slot: &MoveSlot, dex: &dyn Dex) -> Self {
        let data = dex
            .move_data(&slot.name)
            .or_else(|| dex.move_data(&slot.id))
            .cloned();
        Self {
            index,
            name: slot.name.clone(),
            pp: slot.pp,
            maxpp: slot.maxpp,
            data,
        }
    }
}

/// A bench member that may be switched in
#[derive(Debug, Clone)]
pub struct SwitchCandidate {
    /// 1-based roster position
    pub slot: usize,
    pub species: String,
    pub condition: Condition,
}

impl SwitchCandidate {
    pub fn from_pokemon(slot: usize, pokemon: &SidePokemon) -> Self {
        Self {
            slot,
            species: pokemon.species().to_string(),
            condition: pokemon.parsed_condition(),
        }
    }

    pub fn hp_fraction(&self) -> f32 {
        self.condition.fraction()
    }

    pub fn has_status(&self) -> bool {
        !self.condition.status.is_none()
    }
}

/// A candidate paired with its score
#[derive(Debug, Clone, Copy)]
pub struct Ranked<'a, T> {
    pub candidate: &'a T,
    pub score: f32,
}
