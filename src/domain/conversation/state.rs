//! One prompt/response round.
//!
//! A `ConversationState` is created fresh by the controller for every window
//! invocation, handed to a listener for exactly one round, and discarded
//! once the controller has read the outcome.

use serde::{Deserialize, Serialize};

use super::prompt::PromptContent;
use crate::domain::foundation::{UserId, ValidationError};

/// Annotation a listener attaches to the round it resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundNote {
    ReactionAdded,
    ReactionRemoved,
    /// Response is the URL of an uploaded attachment.
    Attachment,
    /// Response was typed rather than clicked or selected.
    Typed,
    TimedOut,
    Cancelled,
}

/// The contract exchanged between controller and listener for one round.
#[derive(Debug, Clone)]
pub struct ConversationState {
    prompt: PromptContent,
    options: Vec<String>,
    ended: bool,
    response: Option<String>,
    responder: Option<UserId>,
    notes: Vec<RoundNote>,
}

impl ConversationState {
    /// Creates a round with the given prompt and option set.
    pub fn new(prompt: impl Into<PromptContent>, options: Vec<String>) -> Self {
        Self {
            prompt: prompt.into(),
            options,
            ended: false,
            response: None,
            responder: None,
            notes: Vec::new(),
        }
    }

    /// Appends the back option unless it is already present.
    pub fn with_back_option(mut self, back_option: &str) -> Self {
        if !self.has_option(back_option) {
            self.options.push(back_option.to_string());
        }
        self
    }

    pub fn prompt(&self) -> &PromptContent {
        &self.prompt
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }

    pub fn responder(&self) -> Option<&UserId> {
        self.responder.as_ref()
    }

    pub fn notes(&self) -> &[RoundNote] {
        &self.notes
    }

    pub fn has_note(&self, note: &RoundNote) -> bool {
        self.notes.contains(note)
    }

    /// Case-insensitive membership test against the option set.
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o.eq_ignore_ascii_case(option))
    }

    /// Marks the round as ended. Irreversible.
    pub fn end(&mut self) {
        self.ended = true;
    }

    /// Records the accepted response. Write-once: a second call, or a call
    /// after the round ended, is rejected and leaves the state untouched.
    pub fn record_response(
        &mut self,
        response: impl Into<String>,
        responder: UserId,
    ) -> Result<(), ValidationError> {
        if self.ended {
            return Err(ValidationError::invalid_format(
                "response",
                "round already ended",
            ));
        }
        if self.response.is_some() {
            return Err(ValidationError::invalid_format(
                "response",
                "response already recorded",
            ));
        }
        self.response = Some(response.into());
        self.responder = Some(responder);
        Ok(())
    }

    pub fn add_note(&mut self, note: RoundNote) {
        if !self.notes.contains(&note) {
            self.notes.push(note);
        }
    }

    /// True once the round has either a response or has ended.
    pub fn is_resolved(&self) -> bool {
        self.ended || self.response.is_some()
    }
}
