//! Localized display names
//!
//! A read-only `category × canonical name -> localized string` table. Names
//! without an entry pass through unchanged, so an empty table is an identity
//! mapping.

use crate::core::error::{AgentError, Result};
use ahash::AHashMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Pokemon,
    Moves,
    Items,
    Abilities,
    Status,
    Types,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Translations {
    #[serde(default)]
    pokemon: AHashMap<String, String>,
    #[serde(default)]
    moves: AHashMap<String, String>,
    #[serde(default)]
    items: AHashMap<String, String>,
    #[serde(default)]
    abilities: AHashMap<String, String>,
    #[serde(default)]
    status: AHashMap<String, String>,
    #[serde(default)]
    types: AHashMap<String, String>,
}

impl Translations {
    /// Identity table
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            AgentError::Data(format!("Failed to read translations {:?}: {}", path, e))
        })?;
        Self::from_json(&contents)
    }

    fn table(&self, category: Category) -> &AHashMap<String, String> {
        match category {
            Category::Pokemon => &self.pokemon,
            Category::Moves => &self.moves,
            Category::Items => &self.items,
            Category::Abilities => &self.abilities,
            Category::Status => &self.status,
            Category::Types => &self.types,
        }
    }

    pub fn translate<'a>(&'a self, category: Category, name: &'a str) -> &'a str {
        self.table(category)
            .get(name)
            .map(String::as_str)
            .unwrap_or(name)
    }

    pub fn insert(&mut self, category: Category, name: &str, localized: &str) {
        let table = match category {
            Category::Pokemon => &mut self.pokemon,
            Category::Moves => &mut self.moves,
            Category::Items => &mut self.items,
            Category::Abilities => &mut self.abilities,
            Category::Status => &mut self.status,
            Category::Types => &mut self.types,
        };
        table.insert(name.to_string(), localized.to_string());
    }

    /// Total number of entries across all categories
    pub fn len(&self) -> usize {
        [
            Category::Pokemon,
            Category::Moves,
            Category::Items,
            Category::Abilities,
            Category::Status,
            Category::Types,
        ]
        .iter()
        .map(|c| self.table(*c).len())
        .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_entries_pass_through() {
        let table = Translations::empty();
        assert_eq!(table.translate(Category::Moves, "Thunderbolt"), "Thunderbolt");
        assert!(table.is_empty());
    }

    #[test]
    fn test_loaded_entries() {
        let table = Translations::from_json(
            r#"{"pokemon": {"Pikachu": "皮卡丘"}, "status": {"brn": "灼伤"}}"#,
        )
        .unwrap();
        assert_eq!(table.translate(Category::Pokemon, "Pikachu"), "皮卡丘");
        assert_eq!(table.translate(Category::Status, "brn"), "灼伤");
        assert_eq!(table.translate(Category::Moves, "Pikachu"), "Pikachu");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_insert() {
        let mut table = Translations::empty();
        table.insert(Category::Items, "Leftovers", "Restes");
        assert_eq!(table.translate(Category::Items, "Leftovers"), "Restes");
    }

    #[test]
    fn test_shipped_table_keyed_by_name() {
        let table = Translations::from_json(include_str!("../../data/translations.json")).unwrap();
        assert_eq!(table.translate(Category::Items, "Light Ball"), "电气球");
        assert_eq!(table.translate(Category::Abilities, "Static"), "静电");
    }
}
