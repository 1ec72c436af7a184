//! Static game data oracle
//!
//! The agent never mutates game data; it only asks for species typing and move
//! attributes. [`StaticDex`] is a JSON-backed implementation, hosts with their
//! own data source implement [`Dex`] directly.

use crate::core::de::{non_empty_string, truthy};
use crate::core::error::{AgentError, Result};
use crate::core::types::to_id;
use ahash::AHashMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpeciesData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

/// Declared accuracy of a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "RawAccuracy")]
pub enum Accuracy {
    /// Never misses (`accuracy: true` in the data)
    #[default]
    Always,
    Percent(u32),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAccuracy {
    Flag(bool),
    Percent(u32),
}

impl From<RawAccuracy> for Accuracy {
    fn from(raw: RawAccuracy) -> Self {
        match raw {
            RawAccuracy::Flag(_) => Accuracy::Always,
            RawAccuracy::Percent(p) => Accuracy::Percent(p),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveData {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub move_type: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub base_power: u32,
    #[serde(default)]
    pub accuracy: Accuracy,
    #[serde(default)]
    pub priority: i8,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub status: Option<String>,
    #[serde(default)]
    pub boosts: Option<AHashMap<String, i8>>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub volatile_status: Option<String>,
    #[serde(default)]
    pub heal: Option<[u32; 2]>,
    #[serde(default)]
    pub drain: Option<[u32; 2]>,
    #[serde(default, deserialize_with = "truthy")]
    pub ohko: bool,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub short_desc: String,
}

impl MoveData {
    /// Inflicts a status, changes stat stages, or applies a volatile effect
    pub fn has_secondary_effect(&self) -> bool {
        self.status.is_some() || self.boosts.is_some() || self.volatile_status.is_some()
    }

    pub fn restores_hp(&self) -> bool {
        self.heal.is_some() || self.drain.is_some()
    }

    /// Raises the user's own stats (self-targeted) or its atk/spa/spe
    pub fn is_setup(&self) -> bool {
        let Some(boosts) = &self.boosts else {
            return false;
        };
        if self.target == "self" {
            return true;
        }
        ["atk", "spa", "spe"]
            .iter()
            .any(|stat| boosts.get(*stat).copied().unwrap_or(0) > 0)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AbilityData {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemData {
    #[serde(default)]
    pub name: String,
}

/// Read-only lookups into static game data
///
/// Names are matched by Showdown id, so `"Thunder Bolt"` and `"thunderbolt"`
/// resolve to the same entry.
pub trait Dex: Send + Sync {
    fn species(&self, name: &str) -> Option<&SpeciesData>;
    fn move_data(&self, name: &str) -> Option<&MoveData>;
    fn ability(&self, name: &str) -> Option<&AbilityData>;
    fn item(&self, name: &str) -> Option<&ItemData>;
}

/// In-memory data tables, usually loaded from a JSON export
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaticDex {
    #[serde(default)]
    species: AHashMap<String, SpeciesData>,
    #[serde(default)]
    moves: AHashMap<String, MoveData>,
    #[serde(default)]
    abilities: AHashMap<String, AbilityData>,
    #[serde(default)]
    items: AHashMap<String, ItemData>,
}

impl StaticDex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document with `species`, `moves`, `abilities` and `items` tables
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: StaticDex = serde_json::from_str(json)?;
        Ok(raw.normalized())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| AgentError::Data(format!("Failed to read dex {:?}: {}", path, e)))?;
        Self::from_json(&contents)
    }

    /// Re-key every table by id and fill in missing display names
    fn normalized(self) -> Self {
        fn rekey<T>(
            table: AHashMap<String, T>,
            name_of: impl Fn(&mut T) -> &mut String,
        ) -> AHashMap<String, T> {
            table
                .into_iter()
                .map(|(key, mut value)| {
                    let name = name_of(&mut value);
                    if name.is_empty() {
                        *name = key.clone();
                    }
                    (to_id(&key), value)
                })
                .collect()
        }

        Self {
            species: rekey(self.species, |s| &mut s.name),
            moves: rekey(self.moves, |m| &mut m.name),
            abilities: rekey(self.abilities, |a| &mut a.name),
            items: rekey(self.items, |i| &mut i.name),
        }
    }

    pub fn with_species(mut self, name: &str, types: &[&str]) -> Self {
        self.species.insert(
            to_id(name),
            SpeciesData {
                name: name.to_string(),
                types: types.iter().map(|t| t.to_string()).collect(),
            },
        );
        self
    }

    pub fn with_move(mut self, mut data: MoveData) -> Self {
        let id = to_id(&data.name);
        if data.name.is_empty() {
            data.name = id.clone();
        }
        self.moves.insert(id, data);
        self
    }

    pub fn with_ability(mut self, name: &str) -> Self {
        self.abilities.insert(
            to_id(name),
            AbilityData {
                name: name.to_string(),
            },
        );
        self
    }

    pub fn with_item(mut self, name: &str) -> Self {
        self.items.insert(
            to_id(name),
            ItemData {
                name: name.to_string(),
            },
        );
        self
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }
}

impl Dex for StaticDex {
    fn species(&self, name: &str) -> Option<&SpeciesData> {
        self.species.get(&to_id(name))
    }

    fn move_data(&self, name: &str) -> Option<&MoveData> {
        self.moves.get(&to_id(name))
    }

    fn ability(&self, name: &str) -> Option<&AbilityData> {
        self.abilities.get(&to_id(name))
    }

    fn item(&self, name: &str) -> Option<&ItemData> {
        self.items.get(&to_id(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEX_JSON: &str = r#"{
        "species": {"Pikachu": {"types": ["Electric"]}},
        "moves": {
            "thunderbolt": {"name": "Thunderbolt", "type": "Electric", "basePower": 90, "accuracy": 100},
            "swordsdance": {"name": "Swords Dance", "type": "Normal", "basePower": 0, "accuracy": true,
                            "boosts": {"atk": 2}, "target": "self"},
            "sheercold": {"name": "Sheer Cold", "type": "Ice", "basePower": 0, "accuracy": 30, "ohko": "Ice"},
            "growl": {"name": "Growl", "type": "Normal", "accuracy": 100, "boosts": {"atk": -1}, "target": "allAdjacentFoes"}
        },
        "items": {"lightball": {"name": "Light Ball"}}
    }"#;

    #[test]
    fn test_load_and_lookup_by_id() {
        let dex = StaticDex::from_json(DEX_JSON).unwrap();
        let bolt = dex.move_data("Thunder Bolt").unwrap();
        assert_eq!(bolt.base_power, 90);
        assert_eq!(bolt.accuracy, Accuracy::Percent(100));
        assert_eq!(dex.species("pikachu").unwrap().types, vec!["Electric"]);
        assert_eq!(dex.species("pikachu").unwrap().name, "Pikachu");
        assert_eq!(dex.item("Light Ball").unwrap().name, "Light Ball");
        assert!(dex.ability("static").is_none());
    }

    #[test]
    fn test_move_flags() {
        let dex = StaticDex::from_json(DEX_JSON).unwrap();
        let sd = dex.move_data("swordsdance").unwrap();
        assert_eq!(sd.accuracy, Accuracy::Always);
        assert!(sd.is_setup());
        assert!(sd.has_secondary_effect());

        assert!(dex.move_data("sheercold").unwrap().ohko);
        assert!(!dex.move_data("growl").unwrap().is_setup());
        assert!(!dex.move_data("thunderbolt").unwrap().has_secondary_effect());
    }

    #[test]
    fn test_builder_helpers() {
        let dex = StaticDex::new().with_species("Snorlax", &["Normal"]).with_move(MoveData {
            name: "Rest".into(),
            heal: Some([1, 1]),
            ..Default::default()
        });
        assert!(dex.move_data("rest").unwrap().restores_hp());
        assert_eq!(dex.move_count(), 1);
    }

    #[test]
    fn test_shipped_dex_loads() {
        let dex = StaticDex::from_json(include_str!("../../data/dex.json")).unwrap();
        assert!(dex.move_data("Dragon Dance").unwrap().is_setup());
        assert!(dex.move_data("gigadrain").unwrap().restores_hp());
        assert_eq!(dex.move_data("extremespeed").unwrap().priority, 2);
        assert_eq!(dex.species("Garchomp").unwrap().types, vec!["Dragon", "Ground"]);
    }
}
