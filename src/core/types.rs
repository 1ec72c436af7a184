//! Core type definitions shared by the tracker, policy and protocol layers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the participants in a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SideId {
    P1,
    P2,
    P3,
    P4,
}

impl SideId {
    /// The side sitting across from this one
    pub fn opponent(self) -> Self {
        match self {
            SideId::P1 => SideId::P2,
            SideId::P2 => SideId::P1,
            SideId::P3 => SideId::P4,
            SideId::P4 => SideId::P3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SideId::P1 => "p1",
            SideId::P2 => "p2",
            SideId::P3 => "p3",
            SideId::P4 => "p4",
        }
    }
}

impl fmt::Display for SideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SideId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept both "p1" and position-qualified forms like "p1a"
        match s.get(..2) {
            Some("p1") => Ok(SideId::P1),
            Some("p2") => Ok(SideId::P2),
            Some("p3") => Ok(SideId::P3),
            Some("p4") => Ok(SideId::P4),
            _ => Err(format!("Unknown side: {}", s)),
        }
    }
}

/// Non-volatile status condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    None,
    Poison,
    BadlyPoisoned,
    Burn,
    Paralysis,
    Sleep,
    Freeze,
}

impl Status {
    /// Parse the protocol's three-letter status code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "psn" => Some(Status::Poison),
            "tox" => Some(Status::BadlyPoisoned),
            "brn" => Some(Status::Burn),
            "par" => Some(Status::Paralysis),
            "slp" => Some(Status::Sleep),
            "frz" => Some(Status::Freeze),
            _ => None,
        }
    }

    pub fn code(self) -> Option<&'static str> {
        match self {
            Status::None => None,
            Status::Poison => Some("psn"),
            Status::BadlyPoisoned => Some("tox"),
            Status::Burn => Some("brn"),
            Status::Paralysis => Some("par"),
            Status::Sleep => Some("slp"),
            Status::Freeze => Some("frz"),
        }
    }

    /// English label, used when the translation table has no entry
    pub fn label(self) -> &'static str {
        match self {
            Status::None => "healthy",
            Status::Poison => "poisoned",
            Status::BadlyPoisoned => "badly poisoned",
            Status::Burn => "burned",
            Status::Paralysis => "paralyzed",
            Status::Sleep => "asleep",
            Status::Freeze => "frozen",
        }
    }

    pub fn is_none(self) -> bool {
        self == Status::None
    }
}

/// HP assumed for an opponent whose max HP is not disclosed
pub const NOMINAL_MAX_HP: u32 = 100;

/// Parsed HP condition string, e.g. `"40/100 brn"` or `"0 fnt"`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Condition {
    pub hp: u32,
    /// Max HP, absent when the payload only gave a bare number
    pub max: Option<u32>,
    pub status: Status,
    pub fainted: bool,
}

impl Condition {
    pub fn full() -> Self {
        Self {
            hp: NOMINAL_MAX_HP,
            max: Some(NOMINAL_MAX_HP),
            status: Status::None,
            fainted: false,
        }
    }

    /// Parse a condition string as sent by the protocol
    ///
    /// Returns None when the HP part is not numeric.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split_whitespace();
        let hp_part = parts.next()?;

        let (hp, max) = match hp_part.split_once('/') {
            Some((cur, max)) => (cur.parse().ok()?, Some(max.parse().ok()?)),
            None => (hp_part.parse().ok()?, None),
        };

        let mut status = Status::None;
        let mut fainted = false;
        for token in parts {
            if token == "fnt" {
                fainted = true;
            } else if let Some(s) = Status::from_code(token) {
                status = s;
            }
        }

        Some(Self {
            hp,
            max,
            status,
            fainted: fainted || hp == 0,
        })
    }

    /// HP as a fraction of max (nominal max when unknown)
    pub fn fraction(&self) -> f32 {
        if self.fainted {
            return 0.0;
        }
        let max = self.max.unwrap_or(NOMINAL_MAX_HP);
        if max == 0 {
            return 0.0;
        }
        (self.hp as f32 / max as f32).clamp(0.0, 1.0)
    }

    pub fn percent(&self) -> u32 {
        (self.fraction() * 100.0).round() as u32
    }
}

/// Stat-stage changes of an active combatant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatStages {
    pub atk: i8,
    pub def: i8,
    pub spa: i8,
    pub spd: i8,
    pub spe: i8,
    pub accuracy: i8,
    pub evasion: i8,
}

impl StatStages {
    fn slot_mut(&mut self, stat: &str) -> Option<&mut i8> {
        match stat {
            "atk" => Some(&mut self.atk),
            "def" => Some(&mut self.def),
            "spa" => Some(&mut self.spa),
            "spd" => Some(&mut self.spd),
            "spe" => Some(&mut self.spe),
            "accuracy" => Some(&mut self.accuracy),
            "evasion" => Some(&mut self.evasion),
            _ => None,
        }
    }

    /// Apply a relative change, clamped to the legal -6..=6 range
    pub fn apply(&mut self, stat: &str, delta: i8) {
        if let Some(slot) = self.slot_mut(stat) {
            *slot = slot.saturating_add(delta).clamp(-6, 6);
        }
    }

    pub fn set(&mut self, stat: &str, value: i8) {
        if let Some(slot) = self.slot_mut(stat) {
            *slot = value.clamp(-6, 6);
        }
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }

    /// Non-zero stages as (name, value) pairs in display order
    pub fn changes(&self) -> Vec<(&'static str, i8)> {
        [
            ("atk", self.atk),
            ("def", self.def),
            ("spa", self.spa),
            ("spd", self.spd),
            ("spe", self.spe),
            ("accuracy", self.accuracy),
            ("evasion", self.evasion),
        ]
        .into_iter()
        .filter(|(_, v)| *v != 0)
        .collect()
    }
}

/// Normalize a display name to a Showdown id ("Thunder Bolt" -> "thunderbolt")
pub fn to_id(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
