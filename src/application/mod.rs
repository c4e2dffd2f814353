//! Application layer - Listeners, wizards and the engine facade.
//!
//! This layer drives the domain through the ports: listeners turn inbound
//! interactions into round results, wizards sequence rounds into windows.

pub mod engine;
pub mod errors;
pub mod listener;
pub mod registry;
pub mod wizard;

pub use engine::ConversationEngine;
pub use errors::ConversationError;
pub use listener::{
    ButtonModality, InputListener, InputModality, ListenerKind, MenuModality, ReactionModality,
    TextModality,
};
pub use registry::{ActiveGuard, ConversationRegistry};
pub use wizard::{
    Answer, ConversationController, ConversationSummary, EndReason, Flow, Question, Reply,
    Transition, Wizard, WizardOptions,
};
