//! Inbound protocol lines
//!
//! Each line is pipe-delimited; the first field names the event kind. Only the
//! kinds the agent reacts to get a typed variant, everything else becomes
//! [`ProtocolEvent::Other`].

use crate::core::types::{Condition, SideId, Status};

/// A combatant reference such as `p1a: Pikachu`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub side: SideId,
    /// Active position, 0 for `a`; absent for bench references like `p1: Mew`
    pub position: Option<usize>,
    /// Display name after the colon (nickname or species)
    pub name: String,
}

impl Ident {
    pub fn parse(raw: &str) -> Option<Self> {
        let (position, name) = raw.split_once(": ")?;
        let position = position.trim();
        let side = position.parse().ok()?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let slot = position
            .chars()
            .nth(2)
            .filter(char::is_ascii_lowercase)
            .map(|c| (c as u8 - b'a') as usize);
        Some(Self {
            side,
            position: slot,
            name: name.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolEvent {
    /// `switch`, `drag` and `replace` lines
    SwitchIn {
        ident: Ident,
        species: String,
        condition: Option<Condition>,
    },
    Damage {
        ident: Ident,
        condition: Option<Condition>,
    },
    Heal {
        ident: Ident,
        condition: Option<Condition>,
    },
    Status {
        ident: Ident,
        status: Status,
    },
    CureStatus {
        ident: Ident,
    },
    Faint {
        ident: Ident,
    },
    Move {
        ident: Ident,
        move_name: String,
    },
    Ability {
        ident: Ident,
        ability: String,
    },
    Item {
        ident: Ident,
        item: String,
    },
    EndItem {
        ident: Ident,
    },
    Terastallize {
        ident: Ident,
        tera_type: String,
    },
    /// `-boost` / `-unboost`, with the sign already applied
    Boost {
        ident: Ident,
        stat: String,
        amount: i8,
    },
    SetBoost {
        ident: Ident,
        stat: String,
        value: i8,
    },
    ClearBoost {
        ident: Ident,
    },
    ClearAllBoost,
    Turn(u32),
    Win(String),
    Tie,
    /// Raw JSON payload of a `|request|` line
    Request(String),
    Error(String),
    Other,
}

impl ProtocolEvent {
    /// Parse one protocol line
    ///
    /// Lines that are not pipe-delimited or lack required fields parse as
    /// [`ProtocolEvent::Other`].
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        let Some(rest) = line.strip_prefix('|') else {
            return ProtocolEvent::Other;
        };

        // The request payload is JSON and may itself contain pipes
        if let Some(payload) = rest.strip_prefix("request|") {
            return ProtocolEvent::Request(payload.to_string());
        }

        let fields: Vec<&str> = rest.split('|').collect();
        let kind = fields[0];
        let field = |i: usize| fields.get(i).copied().unwrap_or("");
        let ident = || Ident::parse(field(1));

        let parsed = match kind {
            "switch" | "drag" | "replace" => ident().map(|ident| {
                let species = field(2).split(',').next().unwrap_or("").trim();
                let species = if species.is_empty() {
                    ident.name.clone()
                } else {
                    species.to_string()
                };
                ProtocolEvent::SwitchIn {
                    ident,
                    species,
                    condition: Condition::parse(field(3)),
                }
            }),
            "-damage" => ident().map(|ident| ProtocolEvent::Damage {
                ident,
                condition: Condition::parse(field(2)),
            }),
            "-heal" => ident().map(|ident| ProtocolEvent::Heal {
                ident,
                condition: Condition::parse(field(2)),
            }),
            "-status" => ident().and_then(|ident| {
                Status::from_code(field(2)).map(|status| ProtocolEvent::Status { ident, status })
            }),
            "-curestatus" => ident().map(|ident| ProtocolEvent::CureStatus { ident }),
            "faint" => ident().map(|ident| ProtocolEvent::Faint { ident }),
            "move" => ident().and_then(|ident| {
                non_empty(field(2)).map(|move_name| ProtocolEvent::Move { ident, move_name })
            }),
            "-ability" => ident().and_then(|ident| {
                non_empty(field(2)).map(|ability| ProtocolEvent::Ability { ident, ability })
            }),
            "-item" => ident().and_then(|ident| {
                non_empty(field(2)).map(|item| ProtocolEvent::Item { ident, item })
            }),
            "-enditem" => ident().map(|ident| ProtocolEvent::EndItem { ident }),
            "-terastallize" => ident().and_then(|ident| {
                non_empty(field(2)).map(|tera_type| ProtocolEvent::Terastallize { ident, tera_type })
            }),
            "-boost" | "-unboost" => ident().and_then(|ident| {
                let amount: i8 = field(3).trim().parse().ok()?;
                let amount = if kind == "-unboost" {
                    amount.saturating_neg()
                } else {
                    amount
                };
                non_empty(field(2)).map(|stat| ProtocolEvent::Boost {
                    ident,
                    stat,
                    amount,
                })
            }),
            "-setboost" => ident().and_then(|ident| {
                let value: i8 = field(3).trim().parse().ok()?;
                non_empty(field(2)).map(|stat| ProtocolEvent::SetBoost { ident, stat, value })
            }),
            "-clearboost" => ident().map(|ident| ProtocolEvent::ClearBoost { ident }),
            "-clearallboost" => Some(ProtocolEvent::ClearAllBoost),
            "turn" => field(1).trim().parse().ok().map(ProtocolEvent::Turn),
            "win" => Some(ProtocolEvent::Win(field(1).to_string())),
            "tie" => Some(ProtocolEvent::Tie),
            "error" => Some(ProtocolEvent::Error(fields[1..].join("|"))),
            _ => None,
        };

        parsed.unwrap_or(ProtocolEvent::Other)
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}
