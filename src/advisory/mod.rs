//! Advisory tier
//!
//! Renders a decision point as a prompt, sends it to a chat-completion
//! service with a short replayed history, and turns the free-text reply into
//! an [`Action`](crate::protocol::Action). Every failure degrades to `None` so
//! the caller can fall back to the local policy.

pub mod backend;
pub mod client;
pub mod memory;
pub mod prompt;
pub mod reply;

pub use backend::{ApiFormat, ChatBackend, ChatMessage, HttpChatBackend, Role};
pub use client::AdvisoryClient;
pub use memory::ConversationMemory;
pub use prompt::{DecisionContext, PromptBuilder};
pub use reply::{parse_directive, parse_reply, Directive};
