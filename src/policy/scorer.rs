//! Heuristic move and switch scoring
//!
//! Scores are only meaningful relative to each other within one request.

use crate::core::config::ExplorationConfig;
use crate::dex::{Accuracy, MoveData};
use crate::policy::candidate::{MoveCandidate, Ranked, SwitchCandidate};
use crate::policy::Policy;
use ordered_float::OrderedFloat;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Weights for the move and switch heuristics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Flat bonus for status, stat-stage and volatile effects
    pub effect_bonus: f32,
    /// Points per positive priority tier
    pub priority_weight: f32,
    /// Fixed score for one-hit-knockout moves
    pub ohko_score: f32,
    /// Healing/draining bonus below the low-HP threshold
    pub heal_bonus_low_hp: f32,
    /// Healing/draining bonus otherwise
    pub heal_bonus: f32,
    pub low_hp_threshold: f32,
    /// Setup bonus while HP is above the healthy threshold
    pub setup_bonus: f32,
    pub healthy_threshold: f32,
    pub switch_base: f32,
    pub switch_hp_weight: f32,
    pub switch_status_penalty: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            effect_bonus: 50.0,
            priority_weight: 20.0,
            ohko_score: 30.0,
            heal_bonus_low_hp: 80.0,
            heal_bonus: 30.0,
            low_hp_threshold: 0.5,
            setup_bonus: 60.0,
            healthy_threshold: 0.7,
            switch_base: 50.0,
            switch_hp_weight: 30.0,
            switch_status_penalty: 20.0,
        }
    }
}

/// Occasional sampling among the top-k moves
struct Explorer {
    probability: f64,
    top_k: usize,
    rng: ChaCha8Rng,
}

impl Explorer {
    fn from_config(config: &ExplorationConfig) -> Option<Self> {
        if !config.enabled || config.probability <= 0.0 {
            return None;
        }
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Some(Self {
            probability: config.probability,
            top_k: config.top_k.max(1),
            rng,
        })
    }

    /// Index into a ranking of `len` entries
    fn pick(&mut self, len: usize) -> usize {
        if len > 1 && self.rng.gen::<f64>() < self.probability {
            self.rng.gen_range(0..self.top_k.min(len))
        } else {
            0
        }
    }
}

pub struct HeuristicScorer {
    weights: ScoreWeights,
    explorer: Option<Explorer>,
}

impl Default for HeuristicScorer {
    fn default() -> Self {
        Self::new(ScoreWeights::default())
    }
}

impl HeuristicScorer {
    /// Deterministic scorer with exploration disabled
    pub fn new(weights: ScoreWeights) -> Self {
        Self {
            weights,
            explorer: None,
        }
    }

    pub fn with_exploration(mut self, config: &ExplorationConfig) -> Self {
        self.explorer = Explorer::from_config(config);
        self
    }

    /// Score one move for an actor at `actor_hp` (fraction of max)
    pub fn score_move(&self, candidate: &MoveCandidate, actor_hp: f32) -> f32 {
        match &candidate.data {
            Some(data) => score_move_data(&self.weights, data, actor_hp),
            None => 0.0,
        }
    }

    pub fn score_switch(&self, candidate: &SwitchCandidate) -> f32 {
        let w = &self.weights;
        let mut score = w.switch_base + candidate.hp_fraction() * w.switch_hp_weight;
        if candidate.has_status() {
            score -= w.switch_status_penalty;
        }
        score
    }
}

pub(crate) fn score_move_data(w: &ScoreWeights, data: &MoveData, actor_hp: f32) -> f32 {
    let mut score = data.base_power as f32;

    if data.has_secondary_effect() {
        score += w.effect_bonus;
    }

    if data.priority > 0 {
        score += data.priority as f32 * w.priority_weight;
    }

    if let Accuracy::Percent(acc) = data.accuracy {
        if acc < 100 {
            score *= acc as f32 / 100.0;
        }
    }

    if data.ohko {
        score = w.ohko_score;
    }

    if data.restores_hp() {
        score += if actor_hp < w.low_hp_threshold {
            w.heal_bonus_low_hp
        } else {
            w.heal_bonus
        };
    }

    if data.is_setup() && actor_hp > w.healthy_threshold {
        score += w.setup_bonus;
    }

    score
}

/// Stable descending sort: equal scores keep input order
pub(crate) fn rank_by_score<'a, T>(
    candidates: &'a [T],
    score: impl Fn(&T) -> f32,
) -> Vec<Ranked<'a, T>> {
    let mut ranked: Vec<Ranked<'a, T>> = candidates
        .iter()
        .map(|c| Ranked {
            candidate: c,
            score: score(c),
        })
        .collect();
    ranked.sort_by_key(|r| Reverse(OrderedFloat(r.score)));
    ranked
}

impl Policy for HeuristicScorer {
    fn rank_moves<'a>(
        &self,
        moves: &'a [MoveCandidate],
        actor_hp: f32,
    ) -> Vec<Ranked<'a, MoveCandidate>> {
        rank_by_score(moves, |m| self.score_move(m, actor_hp))
    }

    fn rank_switches<'a>(&self, switches: &'a [SwitchCandidate]) -> Vec<Ranked<'a, SwitchCandidate>> {
        rank_by_score(switches, |s| self.score_switch(s))
    }

    fn pick_move<'a>(
        &mut self,
        moves: &'a [MoveCandidate],
        actor_hp: f32,
    ) -> Option<&'a MoveCandidate> {
        let ranked = self.rank_moves(moves, actor_hp);
        let i = match self.explorer.as_mut() {
            Some(explorer) => explorer.pick(ranked.len()),
            None => 0,
        };
        ranked.get(i).map(|r| r.candidate)
    }
}
