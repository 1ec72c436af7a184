//! Local decision policies
//!
//! A policy ranks the legal moves and switches of one slot without any
//! external help. The synthesizer falls back to it whenever advice is
//! missing or unusable.

pub mod candidate;
pub mod legacy;
pub mod scorer;

pub use candidate::{MoveCandidate, Ranked, SwitchCandidate};
pub use legacy::LegacyScan;
pub use scorer::{HeuristicScorer, ScoreWeights};

use crate::core::config::{PolicyConfig, SwitchPolicy};

/// Ranking seam between the synthesizer and a scoring strategy
pub trait Policy: Send {
    /// Moves ordered best first; ties keep request order
    fn rank_moves<'a>(&self, moves: &'a [MoveCandidate], actor_hp: f32)
        -> Vec<Ranked<'a, MoveCandidate>>;

    /// Switch targets ordered best first; ties keep roster order
    fn rank_switches<'a>(&self, switches: &'a [SwitchCandidate]) -> Vec<Ranked<'a, SwitchCandidate>>;

    /// Move to actually use; may deviate from the top ranking when exploring
    fn pick_move<'a>(&mut self, moves: &'a [MoveCandidate], actor_hp: f32) -> Option<&'a MoveCandidate> {
        self.rank_moves(moves, actor_hp).first().map(|r| r.candidate)
    }

    fn pick_switch<'a>(&self, switches: &'a [SwitchCandidate]) -> Option<&'a SwitchCandidate> {
        self.rank_switches(switches).first().map(|r| r.candidate)
    }
}

/// Build the policy selected by configuration
pub fn from_config(config: &PolicyConfig) -> Box<dyn Policy> {
    let scorer = HeuristicScorer::new(config.weights.clone()).with_exploration(&config.exploration);
    match config.switch_policy {
        SwitchPolicy::Scored => Box::new(scorer),
        SwitchPolicy::LegacyScan => Box::new(LegacyScan::new(scorer)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Condition;

    fn bench(slot: usize, condition: &str) -> SwitchCandidate {
        SwitchCandidate {
            slot,
            species: format!("Mon{}", slot),
            condition: Condition::parse(condition).unwrap(),
        }
    }

    #[test]
    fn test_from_config_selects_switch_policy() {
        // Scored prefers the healthy statused member, legacy refuses statused ones
        let switches = vec![bench(2, "10/100"), bench(3, "100/100 par")];

        let scored = from_config(&PolicyConfig::default());
        assert_eq!(scored.pick_switch(&switches).unwrap().slot, 3);

        let legacy = from_config(&PolicyConfig {
            switch_policy: SwitchPolicy::LegacyScan,
            ..Default::default()
        });
        assert_eq!(legacy.pick_switch(&switches).unwrap().slot, 2);
    }
}
