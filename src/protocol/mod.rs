//! Line protocol: inbound events and requests, outbound directives

pub mod action;
pub mod event;
pub mod request;

pub use action::{format_choice, Action, Submission, DEFAULT_TRANSFORM_KEYWORD};
pub use event::{Ident, ProtocolEvent};
pub use request::{ActiveSlot, ChoiceRequest, MoveSlot, Request, SideInfo, SidePokemon};
