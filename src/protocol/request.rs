//! Choice requests carried by `|request|<json>` lines

use crate::core::de::{flag_or_string, non_empty_string, truthy};
use crate::core::error::{AgentError, Result};
use crate::core::types::{Condition, SideId, Status};
use serde::Deserialize;

/// One move entry of an active slot
#[derive(Debug, Clone, Deserialize)]
pub struct MoveSlot {
    #[serde(rename = "move")]
    pub name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub pp: Option<u32>,
    #[serde(default)]
    pub maxpp: Option<u32>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default, deserialize_with = "truthy")]
    pub disabled: bool,
}

/// Per-slot options for an `Active` request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSlot {
    #[serde(default)]
    pub moves: Vec<MoveSlot>,
    #[serde(default, deserialize_with = "truthy")]
    pub trapped: bool,
    /// Tera type when the special transform is available this turn
    #[serde(default, deserialize_with = "flag_or_string")]
    pub can_terastallize: Option<String>,
}

impl ActiveSlot {
    pub fn can_transform(&self) -> bool {
        self.can_terastallize.is_some()
    }
}

/// A roster member as reported in the request's `side.pokemon`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidePokemon {
    pub ident: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub moves: Vec<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub base_ability: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub ability: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub item: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub tera_type: Option<String>,
    #[serde(default, deserialize_with = "truthy")]
    pub commanding: bool,
}

impl SidePokemon {
    /// Species name from the details field, falling back to the ident
    pub fn species(&self) -> &str {
        let from_details = self.details.split(',').next().unwrap_or("").trim();
        if !from_details.is_empty() {
            return from_details;
        }
        self.ident
            .split_once(": ")
            .map(|(_, name)| name.trim())
            .unwrap_or(self.ident.as_str())
    }

    pub fn parsed_condition(&self) -> Condition {
        self.condition
            .as_deref()
            .and_then(Condition::parse)
            .unwrap_or_else(Condition::full)
    }

    pub fn is_fainted(&self) -> bool {
        self.parsed_condition().fainted
    }

    pub fn hp_fraction(&self) -> f32 {
        self.parsed_condition().fraction()
    }

    pub fn status(&self) -> Status {
        self.parsed_condition().status
    }

    /// The ability to show: the current one if known, else the base one
    pub fn known_ability(&self) -> Option<&str> {
        self.ability.as_deref().or(self.base_ability.as_deref())
    }

    /// Eligible as a replacement: on the bench and still standing
    pub fn can_switch_in(&self) -> bool {
        !self.active && !self.is_fainted()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SideInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: Option<SideId>,
    #[serde(default)]
    pub pokemon: Vec<SidePokemon>,
}

/// What a request asks of the agent
#[derive(Debug, Clone)]
pub enum ChoiceRequest {
    /// No action due
    Wait,
    /// One flag per battling slot, true where a replacement is required
    ForceSwitch(Vec<bool>),
    /// Pre-battle ordering
    TeamPreview,
    /// Per-slot move and switch options
    Active(Vec<ActiveSlot>),
}

impl ChoiceRequest {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ChoiceRequest::Wait => "wait",
            ChoiceRequest::ForceSwitch(_) => "force-switch",
            ChoiceRequest::TeamPreview => "team-preview",
            ChoiceRequest::Active(_) => "active",
        }
    }
}

/// A decoded request: the choice plus the own-side roster snapshot
#[derive(Debug, Clone)]
pub struct Request {
    pub choice: ChoiceRequest,
    pub side: SideInfo,
    pub rqid: Option<u64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRequest {
    #[serde(default, deserialize_with = "truthy")]
    wait: bool,
    #[serde(default)]
    force_switch: Option<Vec<bool>>,
    #[serde(default, deserialize_with = "truthy")]
    team_preview: bool,
    #[serde(default)]
    active: Option<Vec<ActiveSlot>>,
    #[serde(default)]
    side: SideInfo,
    #[serde(default)]
    rqid: Option<u64>,
}

impl Request {
    /// Decode a `|request|` JSON payload
    pub fn parse(json: &str) -> Result<Self> {
        let raw: RawRequest = serde_json::from_str(json)
            .map_err(|e| AgentError::MalformedRequest(e.to_string()))?;

        let choice = if raw.wait {
            ChoiceRequest::Wait
        } else if let Some(flags) = raw.force_switch {
            ChoiceRequest::ForceSwitch(flags)
        } else if raw.team_preview {
            ChoiceRequest::TeamPreview
        } else if let Some(active) = raw.active {
            ChoiceRequest::Active(active)
        } else {
            return Err(AgentError::MalformedRequest(
                "request carries no wait, forceSwitch, teamPreview or active field".into(),
            ));
        };

        Ok(Self {
            choice,
            side: raw.side,
            rqid: raw.rqid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTIVE_JSON: &str = r#"{
        "active": [{
            "moves": [
                {"move": "Thunderbolt", "id": "thunderbolt", "pp": 24, "maxpp": 24, "target": "normal", "disabled": false},
                {"move": "Volt Tackle", "id": "volttackle", "pp": 0, "maxpp": 24, "target": "normal", "disabled": true}
            ],
            "canTerastallize": "Electric",
            "maybeTrapped": true
        }],
        "side": {
            "name": "Bot", "id": "p2",
            "pokemon": [
                {"ident": "p2: Pikachu", "details": "Pikachu, L50, M", "condition": "120/140", "active": true,
                 "moves": ["thunderbolt", "volttackle"], "baseAbility": "static", "item": "lightball", "teraType": "Electric"},
                {"ident": "p2: Snorlax", "details": "Snorlax, L50", "condition": "0 fnt", "active": false,
                 "moves": ["bodyslam"], "baseAbility": "thickfat", "item": "", "reviving": false}
            ]
        },
        "rqid": 4
    }"#;

    #[test]
    fn test_parse_active_request() {
        let request = Request::parse(ACTIVE_JSON).unwrap();
        let ChoiceRequest::Active(slots) = &request.choice else {
            panic!("expected active request");
        };
        assert_eq!(slots.len(), 1);
        assert!(slots[0].moves[1].disabled);
        assert!(slots[0].can_transform());
        assert_eq!(request.rqid, Some(4));
        assert_eq!(request.side.id, Some(SideId::P2));

        let snorlax = &request.side.pokemon[1];
        assert!(snorlax.is_fainted());
        assert!(snorlax.item.is_none());
        assert!(!snorlax.can_switch_in());
        assert_eq!(request.side.pokemon[0].species(), "Pikachu");
    }

    #[test]
    fn test_wait_takes_precedence() {
        let request = Request::parse(r#"{"wait": true, "side": {"pokemon": []}}"#).unwrap();
        assert!(matches!(request.choice, ChoiceRequest::Wait));
    }

    #[test]
    fn test_force_switch_flags() {
        let request =
            Request::parse(r#"{"forceSwitch": [true, false], "side": {"pokemon": []}}"#).unwrap();
        match request.choice {
            ChoiceRequest::ForceSwitch(flags) => assert_eq!(flags, vec![true, false]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_malformed_request() {
        assert!(matches!(
            Request::parse("{not json"),
            Err(AgentError::MalformedRequest(_))
        ));
        assert!(matches!(
            Request::parse(r#"{"side": {"pokemon": []}}"#),
            Err(AgentError::MalformedRequest(_))
        ));
    }
}
