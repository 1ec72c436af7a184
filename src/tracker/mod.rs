//! Observation tracker
//!
//! Folds protocol events into a belief state about the opponent's roster. The
//! tracker only records what an event asserts: it never guesses items,
//! abilities or moves that have not been shown.

mod belief;

pub use belief::{BeliefState, RosterMember};

use crate::core::types::{SideId, StatStages, Status};
use crate::protocol::event::{Ident, ProtocolEvent};
use ahash::AHashMap;

pub struct ObservationTracker {
    opponent: SideId,
    belief: BeliefState,
    /// Display name -> species, learned from switch lines
    aliases: AHashMap<String, String>,
    /// Own stat stages, indexed by active position
    own_stages: Vec<StatStages>,
}

impl ObservationTracker {
    pub fn new(opponent: SideId) -> Self {
        Self {
            opponent,
            belief: BeliefState::new(),
            aliases: AHashMap::new(),
            own_stages: Vec::new(),
        }
    }

    pub fn opponent(&self) -> SideId {
        self.opponent
    }

    /// Retarget the tracker at a different opponent side
    ///
    /// Anything collected for the previous side is discarded.
    pub fn set_opponent(&mut self, opponent: SideId) {
        if opponent == self.opponent {
            return;
        }
        tracing::warn!(
            from = %self.opponent,
            to = %opponent,
            "Opponent side changed, discarding {} tracked members",
            self.belief.len()
        );
        self.opponent = opponent;
        self.belief.clear();
        self.aliases.clear();
        self.own_stages.clear();
    }

    pub fn current_belief(&self) -> &BeliefState {
        &self.belief
    }

    /// Own stat stages per active position; positions never boosted may be absent
    pub fn own_stages(&self) -> &[StatStages] {
        &self.own_stages
    }

    /// Stat stages of our own combatant at `position`
    pub fn own_stages_at(&self, position: usize) -> StatStages {
        self.own_stages.get(position).copied().unwrap_or_default()
    }

    fn own_stages_mut(&mut self, ident: &Ident) -> &mut StatStages {
        let position = ident.position.unwrap_or(0);
        if self.own_stages.len() <= position {
            self.own_stages.resize(position + 1, StatStages::default());
        }
        &mut self.own_stages[position]
    }

    fn is_opponent(&self, ident: &Ident) -> bool {
        ident.side == self.opponent
    }

    fn is_own(&self, ident: &Ident) -> bool {
        ident.side == self.opponent.opponent()
    }

    /// Tracked entry for an opponent ident, if it has been seen
    fn member_mut(&mut self, ident: &Ident) -> Option<&mut RosterMember> {
        if !self.is_opponent(ident) {
            return None;
        }
        let species = self
            .aliases
            .get(&ident.name)
            .cloned()
            .unwrap_or_else(|| ident.name.clone());
        self.belief.get_mut(&species)
    }

    /// Apply one event
    pub fn observe(&mut self, event: &ProtocolEvent) {
        match event {
            ProtocolEvent::SwitchIn {
                ident,
                species,
                condition,
            } => {
                if self.is_opponent(ident) {
                    self.aliases.insert(ident.name.clone(), species.clone());
                    let member = self.belief.entry(species);
                    if let Some(condition) = condition {
                        member.condition = *condition;
                    }
                    self.belief.set_active(species);
                    tracing::debug!(species = %species, "Opponent switched in");
                } else if self.is_own(ident) {
                    *self.own_stages_mut(ident) = StatStages::default();
                }
            }
            ProtocolEvent::Damage { ident, condition } | ProtocolEvent::Heal { ident, condition } => {
                if let (Some(member), Some(condition)) = (self.member_mut(ident), condition) {
                    member.condition = *condition;
                }
            }
            ProtocolEvent::Status { ident, status } => {
                if let Some(member) = self.member_mut(ident) {
                    member.condition.status = *status;
                }
            }
            ProtocolEvent::CureStatus { ident } => {
                if let Some(member) = self.member_mut(ident) {
                    member.condition.status = Status::None;
                }
            }
            ProtocolEvent::Faint { ident } => {
                if let Some(member) = self.member_mut(ident) {
                    member.condition.fainted = true;
                    member.condition.hp = 0;
                }
            }
            ProtocolEvent::Move { ident, move_name } => {
                if let Some(member) = self.member_mut(ident) {
                    member.reveal_move(move_name);
                }
            }
            ProtocolEvent::Ability { ident, ability } => {
                if let Some(member) = self.member_mut(ident) {
                    member.ability = Some(ability.clone());
                }
            }
            ProtocolEvent::Item { ident, item } => {
                if let Some(member) = self.member_mut(ident) {
                    member.item = Some(item.clone());
                }
            }
            ProtocolEvent::EndItem { ident } => {
                if let Some(member) = self.member_mut(ident) {
                    member.item = None;
                }
            }
            ProtocolEvent::Terastallize { ident, tera_type } => {
                if let Some(member) = self.member_mut(ident) {
                    member.tera_type = Some(tera_type.clone());
                }
            }
            ProtocolEvent::Boost {
                ident,
                stat,
                amount,
            } => {
                if self.is_own(ident) {
                    self.own_stages_mut(ident).apply(stat, *amount);
                }
            }
            ProtocolEvent::SetBoost { ident, stat, value } => {
                if self.is_own(ident) {
                    self.own_stages_mut(ident).set(stat, *value);
                }
            }
            ProtocolEvent::ClearBoost { ident } => {
                if self.is_own(ident) {
                    *self.own_stages_mut(ident) = StatStages::default();
                }
            }
            ProtocolEvent::ClearAllBoost => {
                self.own_stages.clear();
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(tracker: &mut ObservationTracker, lines: &[&str]) {
        for line in lines {
            tracker.observe(&ProtocolEvent::parse(line));
        }
    }

    #[test]
    fn test_switch_creates_and_activates() {
        let mut tracker = ObservationTracker::new(SideId::P1);
        feed(
            &mut tracker,
            &[
                "|switch|p1a: Pikachu|Pikachu, L50, M|100/100",
                "|switch|p1a: Snorlax|Snorlax, L50|90/100",
            ],
        );
        let belief = tracker.current_belief();
        assert_eq!(belief.len(), 2);
        assert_eq!(belief.active_count(), 1);
        assert_eq!(belief.active().unwrap().species, "Snorlax");
        assert!(!belief.get("Pikachu").unwrap().active);
    }

    #[test]
    fn test_damage_to_fainted() {
        let mut tracker = ObservationTracker::new(SideId::P1);
        feed(
            &mut tracker,
            &[
                "|switch|p1a: Pikachu|Pikachu, L50|40/100 brn",
                "|-damage|p1a: Pikachu|0 fnt",
            ],
        );
        let pikachu = tracker.current_belief().get("Pikachu").unwrap();
        assert!(pikachu.fainted());
        assert_eq!(pikachu.hp_fraction(), 0.0);
    }

    #[test]
    fn test_unseen_species_is_noop() {
        let mut tracker = ObservationTracker::new(SideId::P1);
        feed(
            &mut tracker,
            &[
                "|-damage|p1a: Ghost|50/100",
                "|-status|p1a: Ghost|par",
                "|-heal|p1a: Ghost|70/100",
            ],
        );
        assert!(tracker.current_belief().is_empty());
    }

    #[test]
    fn test_own_side_events_ignored_for_belief() {
        let mut tracker = ObservationTracker::new(SideId::P1);
        feed(&mut tracker, &["|switch|p2a: Garchomp|Garchomp, L50|100/100"]);
        assert!(tracker.current_belief().is_empty());
    }

    #[test]
    fn test_status_and_cure() {
        let mut tracker = ObservationTracker::new(SideId::P1);
        feed(
            &mut tracker,
            &[
                "|switch|p1a: Pikachu|Pikachu, L50|100/100",
                "|-status|p1a: Pikachu|par",
            ],
        );
        assert_eq!(
            tracker.current_belief().get("Pikachu").unwrap().status(),
            Status::Paralysis
        );
        feed(&mut tracker, &["|-curestatus|p1a: Pikachu|par|[msg]"]);
        assert_eq!(
            tracker.current_belief().get("Pikachu").unwrap().status(),
            Status::None
        );
    }

    #[test]
    fn test_nickname_resolves_to_species() {
        let mut tracker = ObservationTracker::new(SideId::P1);
        feed(
            &mut tracker,
            &[
                "|switch|p1a: Sparky|Pikachu, L50|100/100",
                "|-damage|p1a: Sparky|55/100",
                "|move|p1a: Sparky|Thunderbolt|p2a: Gyarados",
                "|-item|p1a: Sparky|Light Ball",
                "|-terastallize|p1a: Sparky|Electric",
            ],
        );
        let pikachu = tracker.current_belief().get("Pikachu").unwrap();
        assert_eq!(pikachu.condition.hp, 55);
        assert_eq!(pikachu.moves, vec!["Thunderbolt"]);
        assert_eq!(pikachu.item.as_deref(), Some("Light Ball"));
        assert_eq!(pikachu.tera_type.as_deref(), Some("Electric"));
    }

    #[test]
    fn test_faint_event_marks_member() {
        let mut tracker = ObservationTracker::new(SideId::P1);
        feed(
            &mut tracker,
            &["|switch|p1a: Mew|Mew|100/100", "|faint|p1a: Mew"],
        );
        assert!(tracker.current_belief().get("Mew").unwrap().fainted());
        assert_eq!(tracker.current_belief().len(), 1);
    }

    #[test]
    fn test_own_stat_stages() {
        let mut tracker = ObservationTracker::new(SideId::P1);
        feed(
            &mut tracker,
            &[
                "|switch|p2a: Garchomp|Garchomp, L50|100/100",
                "|-boost|p2a: Garchomp|atk|2",
                "|-unboost|p2a: Garchomp|spe|1",
                "|-boost|p1a: Pikachu|spa|2",
            ],
        );
        assert_eq!(tracker.own_stages_at(0).atk, 2);
        assert_eq!(tracker.own_stages_at(0).spe, -1);
        assert_eq!(tracker.own_stages_at(0).spa, 0);

        feed(&mut tracker, &["|switch|p2a: Pikachu|Pikachu, L50|100/100"]);
        assert!(tracker.own_stages_at(0).is_neutral());
    }

    #[test]
    fn test_own_stages_kept_per_position() {
        let mut tracker = ObservationTracker::new(SideId::P1);
        feed(
            &mut tracker,
            &[
                "|switch|p2a: Garchomp|Garchomp, L50|100/100",
                "|-boost|p2a: Garchomp|atk|2",
                "|switch|p2b: Mew|Mew, L50|100/100",
                "|-boost|p2b: Mew|spa|1",
            ],
        );
        assert_eq!(tracker.own_stages_at(0).atk, 2);
        assert_eq!(tracker.own_stages_at(0).spa, 0);
        assert_eq!(tracker.own_stages_at(1).spa, 1);
        assert_eq!(tracker.own_stages_at(1).atk, 0);

        feed(&mut tracker, &["|switch|p2b: Eevee|Eevee, L50|100/100"]);
        assert_eq!(tracker.own_stages_at(0).atk, 2);
        assert!(tracker.own_stages_at(1).is_neutral());

        feed(&mut tracker, &["|-clearallboost"]);
        assert!(tracker.own_stages_at(0).is_neutral());
        assert!(tracker.own_stages_at(3).is_neutral());
    }

    #[test]
    fn test_retarget_discards_belief() {
        let mut tracker = ObservationTracker::new(SideId::P1);
        feed(&mut tracker, &["|switch|p1a: Mew|Mew|100/100"]);
        tracker.set_opponent(SideId::P2);
        assert!(tracker.current_belief().is_empty());
        assert_eq!(tracker.opponent(), SideId::P2);
    }
}
