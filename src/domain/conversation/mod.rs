//! Conversation domain module.
//!
//! Transport-free building blocks of a wizard: what a round displays, the
//! per-round state, how raw input is matched, and how windows are stacked.

mod matcher;
mod navigation;
mod policy;
mod prompt;
mod state;

pub use matcher::{MatchOutcome, ResponseMatcher};
pub use navigation::{BackStack, ControllerStatus};
pub use policy::{BypassRule, MatchMode, MatchPolicy, BACK_OPTION, CANCEL_KEYWORD};
pub use prompt::{
    ButtonStyle, Control, MenuChoice, OutgoingMessage, PromptContent, RichContent, RichField,
};
pub use state::{ConversationState, RoundNote};
