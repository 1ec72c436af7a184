//! Showdown Agent - decision engine for a Showdown battle bot
//!
//! Tracks the opponent from the battle log, answers choice requests with a
//! heuristic policy, and optionally defers to an LLM advisor.

pub mod advisory;
pub mod core;
pub mod dex;
pub mod policy;
pub mod protocol;
pub mod session;
pub mod synth;
pub mod tracker;
