//! The capability set listener variants plug into the shared round lifecycle.

use crate::application::errors::ConversationError;
use crate::domain::conversation::{ConversationState, MatchPolicy, OutgoingMessage, RoundNote};
use crate::domain::foundation::ConversationId;
use crate::ports::{InteractionEvent, InteractionKind, InteractionPayload};

/// Identity of one round, used to namespace control ids.
///
/// Controls rendered in an earlier round carry a different round number, so
/// a stale click on an old render never matches the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundScope {
    pub conversation: ConversationId,
    pub round: u64,
}

impl RoundScope {
    fn prefix(&self) -> String {
        format!("cw:{}:{}:", self.conversation.short(), self.round)
    }

    /// Control id for `suffix` in this round.
    pub fn control_id(&self, suffix: impl std::fmt::Display) -> String {
        format!("{}{}", self.prefix(), suffix)
    }

    /// Suffix of a control id issued by this round, if it was.
    pub fn suffix<'a>(&self, control_id: &'a str) -> Option<&'a str> {
        control_id.strip_prefix(&self.prefix())
    }

    /// Option index encoded in a control id of this round.
    pub fn option_index(&self, control_id: &str) -> Option<usize> {
        self.suffix(control_id)?.parse().ok()
    }
}

/// Raw input pulled out of an event, before matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInput {
    pub value: String,
    pub note: Option<RoundNote>,
}

impl RawInput {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            note: None,
        }
    }

    pub fn noted(value: impl Into<String>, note: RoundNote) -> Self {
        Self {
            value: value.into(),
            note: Some(note),
        }
    }
}

/// How the user is offered a way to cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelAffordance {
    /// A cancel button appended to the controls.
    Button,
    /// A reaction added after the option reactions.
    Reaction(String),
    /// A footer line pointing at the cancel keyword.
    Hint,
}

/// What distinguishes one listener variant from another.
///
/// The lifecycle (send, subscribe, wait, tear down) is shared; a variant
/// only decides how options are shown and which events carry answers.
pub trait InputModality: Send + Sync {
    /// Short variant name for logs and errors.
    fn name(&self) -> &'static str;

    /// Rejects option sets this variant cannot present.
    fn validate(&self, _state: &ConversationState) -> Result<(), ConversationError> {
        Ok(())
    }

    /// Builds the message for this round, without the cancel affordance.
    fn render(
        &self,
        state: &ConversationState,
        scope: &RoundScope,
        policy: &MatchPolicy,
    ) -> OutgoingMessage;

    /// Reactions to add once the message is on screen.
    fn reactions(&self, _state: &ConversationState, _policy: &MatchPolicy) -> Vec<String> {
        Vec::new()
    }

    /// Event kinds that may carry a response. One subscription per kind.
    fn response_kinds(&self) -> &'static [InteractionKind];

    /// Pulls raw input out of an event, or `None` if it does not belong to
    /// this round.
    fn extract(
        &self,
        event: &InteractionEvent,
        state: &ConversationState,
        scope: &RoundScope,
        policy: &MatchPolicy,
    ) -> Option<RawInput>;

    /// Whether anyone in the channel may answer when the policy is silent.
    fn accepts_anyone_by_default(&self) -> bool {
        false
    }

    /// Whether the platform echoes what the bot adds while rendering (its
    /// own reactions) back as interaction events. Such variants need the bot
    /// user on the context before anyone but the owner may answer.
    fn echoes_decorations(&self) -> bool {
        false
    }

    fn cancel_affordance(&self) -> CancelAffordance {
        CancelAffordance::Button
    }
}

/// Text typed into the channel, ignoring the cancel keyword (it has its own
/// subscription).
pub(crate) fn typed_input(event: &InteractionEvent, policy: &MatchPolicy) -> Option<RawInput> {
    match &event.payload {
        InteractionPayload::Message { text, .. } if !policy.is_cancel(text) => {
            Some(RawInput::noted(text.clone(), RoundNote::Typed))
        }
        _ => None,
    }
}

/// Option text addressed by a control id of this round.
pub(crate) fn option_for_control(
    control_id: &str,
    state: &ConversationState,
    scope: &RoundScope,
) -> Option<String> {
    let index = scope.option_index(control_id)?;
    state.options().get(index).cloned()
}
