//! Wizards: multi-window conversations written as sequential code.
//!
//! A [`Flow`] names its windows with a typed enum and shows them one at a
//! time through a [`Wizard`]. The [`ConversationController`] runs the flow,
//! keeps the back-stack and closes the conversation when it ends.

mod controller;
mod flow;
mod session;

pub use controller::{ConversationController, ConversationSummary};
pub use flow::{Flow, Transition};
pub use session::{
    Answer, EndReason, Question, Reply, Wizard, WizardOptions, DEFAULT_ENDED_NOTICE,
};
