//! The handle flow code uses to talk to the user.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::flow::Transition;
use crate::application::errors::ConversationError;
use crate::application::listener::InputListener;
use crate::domain::conversation::{
    ControllerStatus, ConversationState, PromptContent, RoundNote,
};
use crate::domain::foundation::{ConversationId, StateMachine, UserId};
use crate::ports::ConversationContext;

/// Default text shown in place of the prompt once a conversation ends.
pub const DEFAULT_ENDED_NOTICE: &str = "This conversation has ended.";

/// Controller settings that are not part of the match policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardOptions {
    /// Replaces the live prompt when the conversation ends.
    pub ended_notice: PromptContent,
    /// Delete the live prompt on end instead of showing the notice.
    pub delete_on_end: bool,
    /// Most windows remembered for going back.
    pub max_back_stack: usize,
}

impl Default for WizardOptions {
    fn default() -> Self {
        Self {
            ended_notice: PromptContent::text(DEFAULT_ENDED_NOTICE),
            delete_on_end: false,
            max_back_stack: 32,
        }
    }
}

/// Why a conversation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The flow finished or called `end`.
    Completed,
    /// The user used the cancel affordance or keyword.
    Cancelled,
    /// Nobody answered in time.
    TimedOut,
    /// The flow returned an error.
    Failed,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EndReason::Completed => "completed",
            EndReason::Cancelled => "cancelled",
            EndReason::TimedOut => "timed_out",
            EndReason::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// A prompt plus its option set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub prompt: PromptContent,
    pub options: Vec<String>,
    /// Append the back option when there is a window to go back to.
    pub append_back: bool,
}

impl Question {
    pub fn new(prompt: impl Into<PromptContent>, options: Vec<String>) -> Self {
        Self {
            prompt: prompt.into(),
            options,
            append_back: true,
        }
    }

    /// Freeform question with no options.
    pub fn open(prompt: impl Into<PromptContent>) -> Self {
        Self::new(prompt, Vec::new())
    }

    pub fn without_back(mut self) -> Self {
        self.append_back = false;
        self
    }
}

impl From<&str> for Question {
    fn from(prompt: &str) -> Self {
        Question::open(prompt)
    }
}

/// An accepted response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub value: String,
    pub responder: UserId,
    pub notes: Vec<RoundNote>,
}

impl Answer {
    pub fn has_note(&self, note: &RoundNote) -> bool {
        self.notes.contains(note)
    }
}

/// Result of asking a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Answer(Answer),
    /// The user picked the back option.
    Back,
    /// The conversation ended while waiting; the live prompt is already
    /// replaced by the ended notice.
    Ended(EndReason),
}

/// Flow-facing side of a conversation: owns the listener and the
/// conversation's lifecycle status.
pub struct Wizard {
    listener: InputListener,
    options: WizardOptions,
    status: ControllerStatus,
    end_reason: Option<EndReason>,
    depth: usize,
}

impl Wizard {
    pub fn new(listener: InputListener, options: WizardOptions) -> Self {
        Self {
            listener,
            options,
            status: ControllerStatus::Idle,
            end_reason: None,
            depth: 0,
        }
    }

    pub fn conversation_id(&self) -> ConversationId {
        self.listener.conversation_id()
    }

    pub fn context(&self) -> &ConversationContext {
        self.listener.context()
    }

    pub fn listener(&self) -> &InputListener {
        &self.listener
    }

    pub fn options(&self) -> &WizardOptions {
        &self.options
    }

    pub fn status(&self) -> ControllerStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    /// Windows on the back-stack below the current one.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn set_depth(&mut self, depth: usize) {
        self.depth = depth;
    }

    pub(crate) fn activate(&mut self) -> Result<(), ConversationError> {
        self.status = self
            .status
            .transition_to(ControllerStatus::Active)
            .map_err(|_| ConversationError::Inactive)?;
        Ok(())
    }

    /// Prompts the user and waits for one round to resolve.
    ///
    /// The back option is appended when the question allows it and a
    /// previous window exists.
    ///
    /// # Errors
    ///
    /// `Inactive` once the conversation has ended, or the listener's error
    /// for a prompt it cannot render.
    pub async fn ask(&mut self, question: impl Into<Question>) -> Result<Reply, ConversationError> {
        if !self.status.is_active() {
            return Err(ConversationError::Inactive);
        }
        let question = question.into();
        let back = self.listener.policy().back_option.clone();

        let mut state = ConversationState::new(question.prompt, question.options);
        if question.append_back && self.depth > 0 {
            state = state.with_back_option(&back);
        }

        let state = match self.listener.prompt(state).await {
            Ok(state) => state,
            Err(e) => {
                self.close(EndReason::Failed, None).await;
                return Err(e);
            }
        };

        if state.is_ended() {
            let reason = if state.has_note(&RoundNote::TimedOut) {
                EndReason::TimedOut
            } else {
                EndReason::Cancelled
            };
            self.close(reason, None).await;
            return Ok(Reply::Ended(reason));
        }

        match (state.response(), state.responder()) {
            (Some(response), _)
                if self.listener.policy().is_back(response) && state.has_option(&back) =>
            {
                Ok(Reply::Back)
            }
            (Some(response), Some(responder)) => Ok(Reply::Answer(Answer {
                value: response.to_string(),
                responder: responder.clone(),
                notes: state.notes().to_vec(),
            })),
            _ => {
                self.close(EndReason::Cancelled, None).await;
                Ok(Reply::Ended(EndReason::Cancelled))
            }
        }
    }

    /// Asks `question` and maps the reply to a transition: back and ended
    /// replies are handled here, answers go to `consumer`.
    pub async fn with_response<W, F>(
        &mut self,
        question: impl Into<Question> + Send,
        consumer: F,
    ) -> Result<Transition<W>, ConversationError>
    where
        W: Send,
        F: FnOnce(Answer) -> Transition<W> + Send,
    {
        match self.ask(question).await? {
            Reply::Answer(answer) => Ok(consumer(answer)),
            Reply::Back => Ok(Transition::Back),
            Reply::Ended(_) => Ok(Transition::End),
        }
    }

    /// Ends the conversation and replaces the live prompt with the ended
    /// notice (or deletes it). Calling it again does nothing.
    pub async fn end(&mut self) {
        self.close(EndReason::Completed, None).await;
    }

    /// Like [`end`](Self::end), with a custom closing message.
    pub async fn end_with_notice(&mut self, notice: impl Into<PromptContent>) {
        self.close(EndReason::Completed, Some(notice.into())).await;
    }

    pub(crate) async fn close(&mut self, reason: EndReason, notice: Option<PromptContent>) {
        match self.status.transition_to(ControllerStatus::Ended) {
            Ok(status) => self.status = status,
            Err(_) => return,
        }
        self.end_reason = Some(reason);

        let notice = notice.unwrap_or_else(|| self.options.ended_notice.clone());
        self.listener
            .close(&notice, self.options.delete_on_end)
            .await;

        tracing::info!(
            conversation_id = %self.conversation_id(),
            reason = %reason,
            rounds = self.listener.rounds(),
            "Conversation ended"
        );
    }
}
