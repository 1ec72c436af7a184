//! Advisory client: asks a chat service for a decision, never fails outward

use crate::advisory::backend::{ChatBackend, ChatMessage, HttpChatBackend};
use crate::advisory::memory::ConversationMemory;
use crate::advisory::prompt::{system_prompt, DecisionContext, PromptBuilder};
use crate::advisory::reply::parse_reply;
use crate::core::config::AdvisoryConfig;
use crate::dex::{Dex, Translations};
use crate::protocol::Action;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct AdvisoryClient<B> {
    /// None when no credential is configured
    backend: Option<B>,
    memory: ConversationMemory,
    system_prompt: String,
    keyword: String,
    timeout: Duration,
    dex: Arc<dyn Dex>,
    translations: Arc<Translations>,
}

impl AdvisoryClient<HttpChatBackend> {
    /// HTTP-backed client; disabled when turned off or the credential is missing
    pub fn from_config(
        config: &AdvisoryConfig,
        dex: Arc<dyn Dex>,
        translations: Arc<Translations>,
    ) -> Self {
        let backend = if config.enabled {
            match HttpChatBackend::from_config(config) {
                Ok(backend) => {
                    info!(model = %config.model, url = %config.api_url, "Advisory service enabled");
                    Some(backend)
                }
                Err(e) => {
                    warn!("Advisory service disabled: {}", e);
                    None
                }
            }
        } else {
            info!("Advisory service disabled by configuration");
            None
        };
        Self::new(backend, config, dex, translations)
    }
}

impl<B: ChatBackend> AdvisoryClient<B> {
    pub fn new(
        backend: Option<B>,
        config: &AdvisoryConfig,
        dex: Arc<dyn Dex>,
        translations: Arc<Translations>,
    ) -> Self {
        Self {
            backend,
            memory: ConversationMemory::new(config.memory_exchanges),
            system_prompt: system_prompt(&config.transform_keyword),
            keyword: config.transform_keyword.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            dex,
            translations,
        }
    }

    /// Client that always defers to the local policy
    pub fn disabled(config: &AdvisoryConfig, dex: Arc<dyn Dex>, translations: Arc<Translations>) -> Self {
        Self::new(None, config, dex, translations)
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Ask for an action for one slot
    ///
    /// Returns None when disabled, on transport failure or timeout, and when
    /// the reply does not name one of the offered options. Only a completed
    /// round trip is remembered.
    pub async fn decide(&mut self, ctx: &DecisionContext<'_>) -> Option<Action> {
        let backend = self.backend.as_ref()?;

        let prompt =
            PromptBuilder::new(self.dex.as_ref(), &self.translations, &self.keyword).build(ctx);
        let mut messages = Vec::with_capacity(self.memory.len() + 2);
        messages.push(ChatMessage::system(self.system_prompt.as_str()));
        messages.extend(self.memory.messages().cloned());
        messages.push(ChatMessage::user(prompt.as_str()));

        let reply = match tokio::time::timeout(self.timeout, backend.complete(&messages)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                debug!(error = %e, "Advisory call failed");
                return None;
            }
            Err(_) => {
                debug!(timeout_secs = self.timeout.as_secs(), "Advisory call timed out");
                return None;
            }
        };

        self.memory.record(&prompt, &reply);

        let action = parse_reply(
            &reply,
            &self.keyword,
            ctx.moves,
            ctx.switches,
            ctx.can_transform,
        );
        match &action {
            Some(action) => debug!(reply = %reply.trim(), %action, "Advisory decision"),
            None => debug!(reply = %reply.trim(), "Advisory reply rejected"),
        }
        action
    }
}
