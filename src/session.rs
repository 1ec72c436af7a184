//! One battle from the agent's point of view
//!
//! A session owns the tracker, the synthesizer (and through it the advisory
//! memory) for exactly one battle. Lines go in one at a time; at most one
//! submission comes out per request. Nothing here is fatal: malformed input is
//! logged and dropped, a failed synthesis becomes `default`.

use crate::advisory::{AdvisoryClient, ChatBackend, HttpChatBackend};
use crate::core::config::AgentConfig;
use crate::core::types::SideId;
use crate::dex::{Dex, Translations};
use crate::policy;
use crate::protocol::{format_choice, Action, ProtocolEvent, Request, Submission};
use crate::synth::ChoiceSynthesizer;
use crate::tracker::ObservationTracker;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// How the battle ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Won(String),
    Tie,
}

pub struct BattleSession<B> {
    id: Uuid,
    own_side: SideId,
    tracker: ObservationTracker,
    synth: ChoiceSynthesizer<B>,
    keyword: String,
    /// Last actionable request, kept for invalid-choice recovery
    pending: Option<Request>,
    latest_rqid: Option<u64>,
    turn: u32,
    outcome: Option<Outcome>,
}

impl BattleSession<HttpChatBackend> {
    /// Session wired from configuration, with the HTTP advisory backend
    pub fn from_config(
        config: &AgentConfig,
        dex: Arc<dyn Dex>,
        translations: Arc<Translations>,
    ) -> Self {
        let advisory = AdvisoryClient::from_config(&config.advisory, dex.clone(), translations);
        let synth = ChoiceSynthesizer::new(policy::from_config(&config.policy), advisory, dex);
        Self::new(config, synth)
    }
}

impl<B: ChatBackend> BattleSession<B> {
    pub fn new(config: &AgentConfig, synth: ChoiceSynthesizer<B>) -> Self {
        let own_side = config.battle.own_side;
        let id = Uuid::new_v4();
        info!(session = %id, side = %own_side, "Battle session created");
        Self {
            id,
            own_side,
            tracker: ObservationTracker::new(own_side.opponent()),
            synth,
            keyword: config.advisory.transform_keyword.clone(),
            pending: None,
            latest_rqid: None,
            turn: 0,
            outcome: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn own_side(&self) -> SideId {
        self.own_side
    }

    pub fn tracker(&self) -> &ObservationTracker {
        &self.tracker
    }

    pub fn synthesizer(&self) -> &ChoiceSynthesizer<B> {
        &self.synth
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Feed one protocol line
    ///
    /// Returns the submission owed for it, if any. Lines after the end of the
    /// battle are ignored.
    pub async fn handle_line(&mut self, line: &str) -> Option<Submission> {
        if self.is_finished() {
            return None;
        }
        let event = ProtocolEvent::parse(line);
        match event {
            ProtocolEvent::Request(json) => self.handle_request(&json).await,
            ProtocolEvent::Error(message) => self.handle_error(&message),
            ProtocolEvent::Turn(turn) => {
                self.turn = turn;
                debug!(session = %self.id, turn, "Turn started");
                None
            }
            ProtocolEvent::Win(winner) => {
                info!(session = %self.id, winner = %winner, "Battle finished");
                self.finish(Outcome::Won(winner));
                None
            }
            ProtocolEvent::Tie => {
                info!(session = %self.id, "Battle finished in a tie");
                self.finish(Outcome::Tie);
                None
            }
            other => {
                self.tracker.observe(&other);
                None
            }
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        self.outcome = Some(outcome);
        self.pending = None;
        self.synth.abandon();
    }

    async fn handle_request(&mut self, json: &str) -> Option<Submission> {
        let request = match Request::parse(json) {
            Ok(request) => request,
            Err(e) => {
                warn!(session = %self.id, "Dropping request: {}", e);
                return None;
            }
        };

        if let Some(side) = request.side.id {
            if side != self.own_side {
                info!(session = %self.id, from = %self.own_side, to = %side, "Own side reassigned by request");
                self.own_side = side;
                self.tracker.set_opponent(side.opponent());
            }
        }

        if let (Some(rqid), Some(latest)) = (request.rqid, self.latest_rqid) {
            if rqid < latest {
                debug!(session = %self.id, rqid, latest, "Ignoring stale request");
                return None;
            }
        }
        if request.rqid.is_some() {
            self.latest_rqid = request.rqid;
        }

        debug!(
            session = %self.id,
            kind = request.choice.kind_name(),
            rqid = ?request.rqid,
            "Request received"
        );

        let result = self
            .synth
            .synthesize(
                &request,
                self.tracker.current_belief(),
                self.tracker.own_stages(),
            )
            .await;

        let line = match result {
            Ok(None) => return None,
            Ok(Some(actions)) => format_choice(&actions, &self.keyword),
            Err(e) => {
                warn!(session = %self.id, "Synthesis failed, submitting default: {}", e);
                Action::UseDefault.directive(&self.keyword)
            }
        };
        info!(session = %self.id, turn = self.turn, choice = %line, "Submitting choice");
        let rqid = request.rqid;
        self.pending = Some(request);
        Some(Submission { rqid, line })
    }

    fn handle_error(&mut self, message: &str) -> Option<Submission> {
        if message.starts_with("[Unavailable choice]") {
            debug!(session = %self.id, "{}", message);
            return None;
        }
        if message.starts_with("[Invalid choice]") {
            let pending = self.pending.as_ref()?;
            warn!(session = %self.id, "Choice rejected, falling back to default: {}", message);
            return Some(Submission {
                rqid: pending.rqid,
                line: Action::UseDefault.directive(&self.keyword),
            });
        }
        warn!(session = %self.id, "Protocol error: {}", message);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dex::StaticDex;

    fn session() -> BattleSession<HttpChatBackend> {
        let mut config = AgentConfig::default();
        config.advisory.enabled = false;
        BattleSession::from_config(
            &config,
            Arc::new(StaticDex::new()),
            Arc::new(Translations::empty()),
        )
    }

    const MOVE_REQUEST: &str = r#"|request|{"active":[{"moves":[{"move":"Tackle","id":"tackle"}]}],"side":{"id":"p2","pokemon":[{"ident":"p2a: Eevee","details":"Eevee","condition":"100/100","active":true}]},"rqid":4}"#;

    #[tokio::test]
    async fn test_request_produces_submission() {
        let mut session = session();
        let submission = session.handle_line(MOVE_REQUEST).await.unwrap();
        assert_eq!(submission.line, "move 1");
        assert_eq!(submission.rqid, Some(4));
    }

    #[tokio::test]
    async fn test_malformed_request_is_dropped() {
        let mut session = session();
        assert!(session.handle_line("|request|{not json").await.is_none());
        assert!(session.handle_line(r#"|request|{"side":{}}"#).await.is_none());
        assert!(session.handle_line("|error|[Invalid choice] nope").await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_choice_resubmits_default() {
        let mut session = session();
        session.handle_line(MOVE_REQUEST).await;
        assert!(session
            .handle_line("|error|[Unavailable choice] Can't move")
            .await
            .is_none());
        let recovery = session
            .handle_line("|error|[Invalid choice] Can't move: Eevee's Tackle is disabled")
            .await
            .unwrap();
        assert_eq!(recovery.line, "default");
        assert_eq!(recovery.rqid, Some(4));
    }

    #[tokio::test]
    async fn test_stale_request_ignored() {
        let mut session = session();
        session.handle_line(MOVE_REQUEST).await;
        let older = MOVE_REQUEST.replace("\"rqid\":4", "\"rqid\":2");
        assert!(session.handle_line(&older).await.is_none());
    }

    #[tokio::test]
    async fn test_synthesis_error_becomes_default() {
        let mut session = session();
        let line = r#"|request|{"active":[{"moves":[{"move":"Tackle","id":"tackle"}]}],"side":{"pokemon":[]}}"#;
        assert_eq!(session.handle_line(line).await.unwrap().line, "default");
    }

    #[tokio::test]
    async fn test_win_ends_session() {
        let mut session = session();
        session.handle_line("|turn|3").await;
        assert_eq!(session.turn(), 3);
        session.handle_line("|win|Bot").await;
        assert_eq!(session.outcome(), Some(&Outcome::Won("Bot".into())));
        assert!(session.handle_line(MOVE_REQUEST).await.is_none());
    }

    #[tokio::test]
    async fn test_side_from_request_retargets_tracker() {
        let mut config = AgentConfig::default();
        config.advisory.enabled = false;
        config.battle.own_side = SideId::P1;
        let mut session = BattleSession::from_config(
            &config,
            Arc::new(StaticDex::new()),
            Arc::new(Translations::empty()),
        );
        assert_eq!(session.tracker().opponent(), SideId::P2);
        session.handle_line(MOVE_REQUEST).await;
        assert_eq!(session.own_side(), SideId::P2);
        assert_eq!(session.tracker().opponent(), SideId::P1);
    }
}
