//! Linear switch scan kept for parity with older agents
//!
//! Moves are ranked exactly like [`HeuristicScorer`]. Switches use a single
//! pass: the first candidate starts as best and is replaced only by a later
//! one with strictly higher HP and no status.

use crate::policy::candidate::{MoveCandidate, Ranked, SwitchCandidate};
use crate::policy::scorer::HeuristicScorer;
use crate::policy::Policy;

pub struct LegacyScan {
    scorer: HeuristicScorer,
}

impl LegacyScan {
    pub fn new(scorer: HeuristicScorer) -> Self {
        Self { scorer }
    }

    fn best_index(switches: &[SwitchCandidate]) -> Option<usize> {
        let mut best = 0;
        for (i, candidate) in switches.iter().enumerate().skip(1) {
            if candidate.hp_fraction() > switches[best].hp_fraction() && !candidate.has_status() {
                best = i;
            }
        }
        (!switches.is_empty()).then_some(best)
    }
}

impl Policy for LegacyScan {
    fn rank_moves<'a>(
        &self,
        moves: &'a [MoveCandidate],
        actor_hp: f32,
    ) -> Vec<Ranked<'a, MoveCandidate>> {
        self.scorer.rank_moves(moves, actor_hp)
    }

    /// Scan winner first, remaining candidates in roster order
    fn rank_switches<'a>(&self, switches: &'a [SwitchCandidate]) -> Vec<Ranked<'a, SwitchCandidate>> {
        let Some(best) = Self::best_index(switches) else {
            return Vec::new();
        };
        let mut ranked = Vec::with_capacity(switches.len());
        ranked.push(Ranked {
            candidate: &switches[best],
            score: self.scorer.score_switch(&switches[best]),
        });
        ranked.extend(
            switches
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != best)
                .map(|(_, c)| Ranked {
                    candidate: c,
                    score: self.scorer.score_switch(c),
                }),
        );
        ranked
    }

    fn pick_move<'a>(&mut self, moves: &'a [MoveCandidate], actor_hp: f32) -> Option<&'a MoveCandidate> {
        self.scorer.pick_move(moves, actor_hp)
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
    fn test_first_candidate_kept_when_others_statused() {
        let scan = LegacyScan::new(HeuristicScorer::default());
        let switches = vec![bench(2, "30/100"), bench(3, "90/100 psn"), bench(4, "100/100 slp")];
        assert_eq!(scan.pick_switch(&switches).unwrap().slot, 2);
    }

    #[test]
    fn test_requires_strictly_higher_hp() {
        let scan = LegacyScan::new(HeuristicScorer::default());
        let switches = vec![bench(2, "60/100"), bench(3, "60/100"), bench(5, "80/100")];
        let order: Vec<usize> = scan
            .rank_switches(&switches)
            .iter()
            .map(|r| r.candidate.slot)
            .collect();
        assert_eq!(order, vec![5, 2, 3]);
    }

    #[test]
    fn test_statused_first_candidate_can_win() {
        let scan = LegacyScan::new(HeuristicScorer::default());
        let switches = vec![bench(2, "100/100 brn"), bench(3, "50/100")];
        assert_eq!(scan.pick_switch(&switches).unwrap().slot, 2);
        assert!(scan.pick_switch(&[]).is_none());
    }
}
