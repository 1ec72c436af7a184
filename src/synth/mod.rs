//! Choice synthesizer
//!
//! Turns one choice request into the ordered per-slot action batch. Each slot
//! that needs a decision is offered to the advisory client first and falls
//! back to the local policy whenever the advisory answer is missing.

use crate::advisory::{AdvisoryClient, ChatBackend, DecisionContext};
use crate::core::error::{AgentError, Result};
use crate::core::types::StatStages;
use crate::dex::Dex;
use crate::policy::{MoveCandidate, Policy, SwitchCandidate};
use crate::protocol::{Action, ActiveSlot, ChoiceRequest, Request, SideInfo};
use crate::tracker::BeliefState;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthState {
    Idle,
    /// A request is being answered
    Resolving { rqid: Option<u64> },
}

/// Read-only inputs shared by every slot of one request
struct Snapshot<'a> {
    side: &'a SideInfo,
    belief: &'a BeliefState,
    /// Own stat stages by active position
    stages: &'a [StatStages],
}

impl Snapshot<'_> {
    fn stages_at(&self, slot: usize) -> StatStages {
        self.stages.get(slot).copied().unwrap_or_default()
    }
}

pub struct ChoiceSynthesizer<B> {
    policy: Box<dyn Policy>,
    advisory: AdvisoryClient<B>,
    dex: Arc<dyn Dex>,
    state: SynthState,
}

impl<B: ChatBackend> ChoiceSynthesizer<B> {
    pub fn new(policy: Box<dyn Policy>, advisory: AdvisoryClient<B>, dex: Arc<dyn Dex>) -> Self {
        Self {
            policy,
            advisory,
            dex,
            state: SynthState::Idle,
        }
    }

    pub fn state(&self) -> SynthState {
        self.state
    }

    pub fn advisory(&self) -> &AdvisoryClient<B> {
        &self.advisory
    }

    /// Forget a decision that was abandoned mid-flight
    pub fn abandon(&mut self) {
        self.state = SynthState::Idle;
    }

    /// Build the action batch for `request`
    ///
    /// `Ok(None)` means nothing is due (`Wait`). The batch is all or nothing:
    /// an error for any slot fails the whole request.
    pub async fn synthesize(
        &mut self,
        request: &Request,
        belief: &BeliefState,
        stages: &[StatStages],
    ) -> Result<Option<Vec<Action>>> {
        self.state = SynthState::Resolving { rqid: request.rqid };
        let snapshot = Snapshot {
            side: &request.side,
            belief,
            stages,
        };
        let result = match &request.choice {
            ChoiceRequest::Wait => Ok(None),
            ChoiceRequest::TeamPreview => Ok(Some(vec![Action::UseDefault])),
            ChoiceRequest::ForceSwitch(flags) => self.force_switch(flags, &snapshot).await.map(Some),
            ChoiceRequest::Active(slots) => self.active(slots, &snapshot).await.map(Some),
        };
        self.state = SynthState::Idle;
        result
    }

    /// Bench members eligible to come in, minus targets already taken
    fn switch_candidates(side: &SideInfo, taken: &[usize]) -> Vec<SwitchCandidate> {
        side.pokemon
            .iter()
            .enumerate()
            .filter(|(_, p)| p.can_switch_in())
            .map(|(i, p)| SwitchCandidate::from_pokemon(i + 1, p))
            .filter(|c| !taken.contains(&c.slot))
            .collect()
    }

    async fn force_switch(&mut self, flags: &[bool], snap: &Snapshot<'_>) -> Result<Vec<Action>> {
        let mut actions = Vec::with_capacity(flags.len());
        let mut taken = Vec::new();

        for (i, &flagged) in flags.iter().enumerate() {
            if !flagged {
                actions.push(Action::Pass);
                continue;
            }
            let switches = Self::switch_candidates(snap.side, &taken);
            if switches.is_empty() {
                debug!(slot = i, "No replacement available");
                actions.push(Action::Pass);
                continue;
            }

            let stages = snap.stages_at(i);
            let ctx = DecisionContext {
                side: snap.side,
                actor: snap.side.pokemon.get(i),
                stages: &stages,
                can_transform: false,
                forced: true,
                moves: &[],
                switches: &switches,
                opponent: snap.belief,
            };
            let action = match self.advisory.decide(&ctx).await {
                Some(action) => action,
                None => match self.policy.pick_switch(&switches) {
                    Some(choice) => Action::SwitchTo { slot: choice.slot },
                    None => Action::Pass,
                },
            };
            if let Action::SwitchTo { slot } = action {
                taken.push(slot);
            }
            actions.push(action);
        }
        Ok(actions)
    }

    async fn active(&mut self, slots: &[ActiveSlot], snap: &Snapshot<'_>) -> Result<Vec<Action>> {
        if slots.is_empty() {
            return Err(AgentError::Synthesis("active request lists no slots".into()));
        }
        let mut actions = Vec::with_capacity(slots.len());
        let mut taken = Vec::new();

        for (i, slot) in slots.iter().enumerate() {
            let actor = snap.side.pokemon.get(i).ok_or_else(|| {
                AgentError::Synthesis(format!("no roster entry for active slot {}", i + 1))
            })?;
            if actor.is_fainted() || actor.commanding {
                actions.push(Action::Pass);
                continue;
            }

            let moves: Vec<MoveCandidate> = slot
                .moves
                .iter()
                .enumerate()
                .filter(|(_, m)| !m.disabled)
                .map(|(j, m)| MoveCandidate::from_slot(j + 1, m, self.dex.as_ref()))
                .collect();
            let switches = if slot.trapped {
                Vec::new()
            } else {
                Self::switch_candidates(snap.side, &taken)
            };
            if moves.is_empty() && switches.is_empty() {
                actions.push(Action::Pass);
                continue;
            }

            let stages = snap.stages_at(i);
            let ctx = DecisionContext {
                side: snap.side,
                actor: Some(actor),
                stages: &stages,
                can_transform: slot.can_transform(),
                forced: false,
                moves: &moves,
                switches: &switches,
                opponent: snap.belief,
            };
            let action = match self.advisory.decide(&ctx).await {
                Some(action) => action,
                None => self.fallback(&moves, &switches, actor.hp_fraction()),
            };
            if let Action::SwitchTo { slot } = action {
                taken.push(slot);
            }
            actions.push(action);
        }
        Ok(actions)
    }

    /// Local decision: best move, else best switch
    fn fallback(&mut self, moves: &[MoveCandidate], switches: &[SwitchCandidate], actor_hp: f32) -> Action {
        if let Some(choice) = self.policy.pick_move(moves, actor_hp) {
            return Action::use_move(choice.index);
        }
        match self.policy.pick_switch(switches) {
            Some(choice) => Action::SwitchTo { slot: choice.slot },
            None => Action::Pass,
        }
    }
}
