//! The round lifecycle shared by every listener variant.
//!
//! One call to [`InputListener::prompt`] is one round:
//!
//! 1. render the prompt and send it (or edit the live message)
//! 2. subscribe response handlers, the cancel affordance and the cancel keyword
//! 3. wait for the first accepted response, a cancellation, or the timeout
//! 4. dispose every subscription of the round, then hand the state back
//!
//! Transport failures are logged and never abort a round.

use std::sync::Arc;
use tokio::time::Instant;

use super::handlers::{CancelHandler, ResponseHandler};
use super::modality::{CancelAffordance, InputModality, RoundScope};
use super::slot::{RoundOutcome, RoundSlot};
use crate::application::errors::ConversationError;
use crate::domain::conversation::{
    ButtonStyle, Control, ConversationState, MatchPolicy, OutgoingMessage, PromptContent,
    RoundNote,
};
use crate::domain::foundation::{ConversationId, DomainError, MessageId};
use crate::ports::{
    ConversationContext, DisplayGateway, InteractionBus, InteractionEvent, InteractionFilter,
    InteractionHandler, InteractionKind, InteractionPayload, MessageHandle, Subscription,
};

/// Most controls a platform message row can hold.
pub const MAX_CONTROLS_PER_ROW: usize = 5;

/// Most control rows a platform message can hold.
pub const MAX_CONTROL_ROWS: usize = 5;

const CANCEL_SUFFIX: &str = "cancel";
const CANCEL_LABEL: &str = "Cancel";

/// Coordinates one prompt/response round at a time for a conversation.
///
/// Owns the "currently displayed prompt" of its conversation: the first
/// round sends a message, later rounds edit it in place.
pub struct InputListener {
    modality: Arc<dyn InputModality>,
    display: Arc<dyn DisplayGateway>,
    bus: Arc<dyn InteractionBus>,
    context: ConversationContext,
    policy: Arc<MatchPolicy>,
    conversation: ConversationId,
    live: Option<MessageHandle>,
    rounds: u64,
    acknowledged: bool,
    has_reactions: bool,
}

impl InputListener {
    pub fn new(
        modality: Arc<dyn InputModality>,
        display: Arc<dyn DisplayGateway>,
        bus: Arc<dyn InteractionBus>,
        context: ConversationContext,
        policy: MatchPolicy,
    ) -> Self {
        Self {
            modality,
            display,
            bus,
            context,
            policy: Arc::new(policy),
            conversation: ConversationId::new(),
            live: None,
            rounds: 0,
            acknowledged: false,
            has_reactions: false,
        }
    }

    pub fn with_conversation_id(mut self, conversation: ConversationId) -> Self {
        self.conversation = conversation;
        self
    }

    pub fn conversation_id(&self) -> ConversationId {
        self.conversation
    }

    /// Variant name (`button`, `menu`, `reaction`, `text`).
    pub fn kind(&self) -> &'static str {
        self.modality.name()
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    /// The message currently showing this conversation's prompt.
    pub fn live_message(&self) -> Option<&MessageHandle> {
        self.live.as_ref()
    }

    /// Rounds run so far.
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    /// Runs one round and returns the resolved state.
    ///
    /// The returned state either carries a response or is ended (cancelled
    /// or timed out). An already-ended state is returned untouched.
    ///
    /// # Errors
    ///
    /// Returns `ConversationError` only when the prompt itself is unusable
    /// for this variant (e.g. too many options), or when a variant that
    /// accepts anyone runs without the bot user on the context. Transport failures are
    /// logged and the round carries on.
    pub async fn prompt(
        &mut self,
        mut state: ConversationState,
    ) -> Result<ConversationState, ConversationError> {
        if state.is_ended() {
            return Ok(state);
        }
        self.modality.validate(&state)?;
        if self.modality.echoes_decorations()
            && self.context.bot.is_none()
            && self
                .policy
                .allows_anyone(self.modality.accepts_anyone_by_default())
        {
            return Err(ConversationError::MissingBotUser {
                listener: self.modality.name(),
            });
        }

        self.rounds += 1;
        let scope = RoundScope {
            conversation: self.conversation,
            round: self.rounds,
        };

        self.acknowledge().await;
        let message = self.compose(&state, &scope);
        self.show(&message).await;
        self.decorate(&state).await;

        let (slot, rx) = RoundSlot::new();
        let mut subscriptions = SubscriptionSet::new(self.modality.name());
        self.subscribe_round(&mut subscriptions, &state, &scope, &slot);

        let started = Instant::now();
        let outcome = tokio::time::timeout(self.policy.timeout, rx).await;
        slot.close();
        let disposed = subscriptions.dispose_all();
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(RoundOutcome::Accepted {
                response,
                responder,
                note,
            })) => {
                tracing::debug!(
                    conversation_id = %self.conversation,
                    listener = self.modality.name(),
                    round = scope.round,
                    outcome = "accepted",
                    elapsed_ms,
                    disposed,
                    "Round resolved"
                );
                if let Some(note) = note {
                    state.add_note(note);
                }
                state.record_response(response, responder)?;
            }
            Ok(Ok(RoundOutcome::Cancelled { by })) => {
                tracing::debug!(
                    conversation_id = %self.conversation,
                    listener = self.modality.name(),
                    round = scope.round,
                    outcome = "cancelled",
                    cancelled_by = %by,
                    elapsed_ms,
                    disposed,
                    "Round resolved"
                );
                state.add_note(RoundNote::Cancelled);
                state.end();
            }
            Ok(Err(_)) => {
                tracing::warn!(
                    conversation_id = %self.conversation,
                    round = scope.round,
                    "Round slot closed without an outcome"
                );
                state.end();
            }
            Err(_) => {
                tracing::debug!(
                    conversation_id = %self.conversation,
                    listener = self.modality.name(),
                    round = scope.round,
                    outcome = "timed_out",
                    elapsed_ms,
                    disposed,
                    "Round resolved"
                );
                state.add_note(RoundNote::TimedOut);
                state.end();
            }
        }
        Ok(state)
    }

    /// Replaces the live prompt with a terminal notice, or deletes it.
    ///
    /// Later rounds, if any, start a fresh message.
    pub async fn close(&mut self, notice: &PromptContent, delete: bool) {
        let Some(handle) = self.live.take() else {
            return;
        };
        if self.has_reactions {
            self.has_reactions = false;
            if let Err(e) = self.display.clear_reactions(&handle).await {
                self.transport_warning("clear reactions", &e);
            }
        }
        let result = if delete {
            self.display.delete(&handle).await
        } else {
            self.display
                .edit(&handle, &OutgoingMessage::plain(notice.clone()))
                .await
                .map(|_| ())
        };
        if let Err(e) = result {
            self.transport_warning(if delete { "delete prompt" } else { "show ended notice" }, &e);
        }
    }

    async fn acknowledge(&mut self) {
        if self.acknowledged {
            return;
        }
        self.acknowledged = true;
        if let Some(token) = &self.context.deferred {
            if let Err(e) = self.display.acknowledge(token).await {
                self.transport_warning("acknowledge interaction", &e);
            }
        }
    }

    fn compose(&self, state: &ConversationState, scope: &RoundScope) -> OutgoingMessage {
        let mut message = self.modality.render(state, scope, &self.policy);
        if self.policy.show_cancel {
            match self.modality.cancel_affordance() {
                CancelAffordance::Button => {
                    attach_cancel_button(&mut message, scope.control_id(CANCEL_SUFFIX));
                }
                CancelAffordance::Hint => {
                    message.content = message
                        .content
                        .with_footer(format!("Type `{}` to cancel.", self.policy.cancel_keyword));
                }
                CancelAffordance::Reaction(_) => {}
            }
        }
        message
    }

    async fn show(&mut self, message: &OutgoingMessage) {
        match self.live.clone() {
            Some(handle) => match self.display.edit(&handle, message).await {
                Ok(updated) => self.live = Some(updated),
                Err(e) => self.transport_warning("edit prompt", &e),
            },
            None => match self.display.send(&self.context.channel, message).await {
                Ok(sent) => self.live = Some(sent),
                Err(e) => self.transport_warning("send prompt", &e),
            },
        }
    }

    async fn decorate(&mut self, state: &ConversationState) {
        let Some(handle) = self.live.clone() else {
            return;
        };
        if self.has_reactions {
            self.has_reactions = false;
            if let Err(e) = self.display.clear_reactions(&handle).await {
                self.transport_warning("clear reactions", &e);
            }
        }

        let mut reactions = self.modality.reactions(state, &self.policy);
        if self.policy.show_cancel {
            if let CancelAffordance::Reaction(emoji) = self.modality.cancel_affordance() {
                reactions.push(emoji);
            }
        }
        for emoji in reactions {
            match self.display.add_reaction(&handle, &emoji).await {
                Ok(()) => self.has_reactions = true,
                Err(e) => self.transport_warning("add reaction", &e),
            }
        }
    }

    fn subscribe_round(
        &self,
        subscriptions: &mut SubscriptionSet,
        state: &ConversationState,
        scope: &RoundScope,
        slot: &Arc<RoundSlot>,
    ) {
        let target = self.live.as_ref().map(|h| h.message.clone());
        let responders = Audience {
            context: self.context.clone(),
            anyone: self
                .policy
                .allows_anyone(self.modality.accepts_anyone_by_default()),
            target,
        };
        let owner_only = Audience {
            anyone: false,
            ..responders.clone()
        };

        let responder: Arc<dyn InteractionHandler> = Arc::new(ResponseHandler {
            modality: Arc::clone(&self.modality),
            snapshot: Arc::new(state.clone()),
            scope: *scope,
            policy: Arc::clone(&self.policy),
            slot: Arc::clone(slot),
        });
        for &kind in self.modality.response_kinds() {
            let audience = responders.clone();
            let filter: InteractionFilter = Arc::new(move |e: &InteractionEvent| audience.admits(e));
            subscriptions.register(
                kind,
                self.bus.subscribe(kind, filter, Arc::clone(&responder)),
            );
        }

        let canceller: Arc<dyn InteractionHandler> = Arc::new(CancelHandler {
            slot: Arc::clone(slot),
        });
        if self.policy.show_cancel {
            match self.modality.cancel_affordance() {
                CancelAffordance::Button => {
                    let audience = owner_only.clone();
                    let cancel_id = scope.control_id(CANCEL_SUFFIX);
                    let filter: InteractionFilter = Arc::new(move |e: &InteractionEvent| {
                        audience.admits(e)
                            && matches!(&e.payload, InteractionPayload::Control { control_id } if *control_id == cancel_id)
                    });
                    subscriptions.register(
                        InteractionKind::ControlActivated,
                        self.bus.subscribe(
                            InteractionKind::ControlActivated,
                            filter,
                            Arc::clone(&canceller),
                        ),
                    );
                }
                CancelAffordance::Reaction(emoji) => {
                    let audience = owner_only.clone();
                    let filter: InteractionFilter = Arc::new(move |e: &InteractionEvent| {
                        audience.admits(e)
                            && matches!(&e.payload, InteractionPayload::Reaction { emoji: used } if *used == emoji)
                    });
                    subscriptions.register(
                        InteractionKind::ReactionAdded,
                        self.bus.subscribe(
                            InteractionKind::ReactionAdded,
                            filter,
                            Arc::clone(&canceller),
                        ),
                    );
                }
                CancelAffordance::Hint => {}
            }
        }

        let audience = owner_only;
        let policy = Arc::clone(&self.policy);
        let filter: InteractionFilter = Arc::new(move |e: &InteractionEvent| {
            audience.admits(e) && e.text().is_some_and(|text| policy.is_cancel(text))
        });
        subscriptions.register(
            InteractionKind::MessageSent,
            self.bus
                .subscribe(InteractionKind::MessageSent, filter, canceller),
        );
    }

    fn transport_warning(&self, action: &str, error: &DomainError) {
        tracing::warn!(
            conversation_id = %self.conversation,
            listener = self.modality.name(),
            "Failed to {}: {}",
            action,
            error
        );
    }
}

/// Who may drive a round, and which message their clicks must target.
#[derive(Clone)]
struct Audience {
    context: ConversationContext,
    anyone: bool,
    target: Option<MessageId>,
}

impl Audience {
    fn admits(&self, event: &InteractionEvent) -> bool {
        if event.channel != self.context.channel || self.context.is_bot(&event.user) {
            return false;
        }
        if !self.anyone && !self.context.is_owner(&event.user) {
            return false;
        }
        match event.kind {
            InteractionKind::MessageSent => true,
            _ => self.target.is_some() && event.message == self.target,
        }
    }
}

/// Subscriptions registered by one round.
///
/// `dispose_all` consumes the set; dropping it early (e.g. the waiting task
/// was aborted) disposes whatever is left, so each subscription is disposed
/// exactly once either way.
struct SubscriptionSet {
    listener: &'static str,
    live: Vec<Box<dyn Subscription>>,
}

impl SubscriptionSet {
    fn new(listener: &'static str) -> Self {
        Self {
            listener,
            live: Vec::new(),
        }
    }

    fn register(
        &mut self,
        kind: InteractionKind,
        result: Result<Box<dyn Subscription>, DomainError>,
    ) {
        match result {
            Ok(subscription) => self.live.push(subscription),
            Err(e) => {
                tracing::warn!(listener = self.listener, %kind, "Failed to subscribe: {}", e);
            }
        }
    }

    fn dispose_all(mut self) -> usize {
        let count = self.live.len();
        for subscription in self.live.drain(..) {
            subscription.dispose();
        }
        count
    }
}

impl Drop for SubscriptionSet {
    fn drop(&mut self) {
        for subscription in self.live.drain(..) {
            subscription.dispose();
        }
    }
}

/// Puts a cancel button on the last button row, or a new row if there is
/// room. Menus always sit alone in their row.
fn attach_cancel_button(message: &mut OutgoingMessage, id: String) {
    let button = Control::Button {
        id,
        label: CANCEL_LABEL.to_string(),
        style: ButtonStyle::Danger,
    };
    let row_count = message.rows.len();
    match message.rows.last_mut() {
        Some(row)
            if row.len() < MAX_CONTROLS_PER_ROW
                && row.iter().all(|c| matches!(c, Control::Button { .. })) =>
        {
            row.push(button)
        }
        _ if row_count < MAX_CONTROL_ROWS => message.rows.push(vec![button]),
        _ => tracing::debug!("No room for a cancel button; the cancel keyword still works"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::listener::test_support::Harness;
    use crate::application::listener::{ButtonModality, TextModality};
    use crate::adapters::DisplayCall;
    use crate::domain::conversation::MatchMode;
    use crate::ports::InteractionToken;
    use std::time::Duration;

    fn opts(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    mod timeout {
        use super::*;

        #[tokio::test]
        async fn round_without_events_ends_after_timeout() {
            let harness = Harness::new();
            let mut listener = harness.listener(
                Arc::new(TextModality),
                MatchPolicy::default().with_timeout(Duration::from_millis(50)),
            );

            let started = std::time::Instant::now();
            let state = listener
                .prompt(ConversationState::new("Anyone there?", vec![]))
                .await
                .unwrap();

            assert!(state.is_ended());
            assert_eq!(state.response(), None);
            assert!(state.has_note(&RoundNote::TimedOut));
            assert!(started.elapsed() < Duration::from_secs(2));
        }

        #[tokio::test]
        async fn timed_out_round_disposes_every_subscription() {
            let harness = Harness::new();
            let mut listener = harness.listener(
                Arc::new(ButtonModality),
                MatchPolicy::default().with_timeout(Duration::from_millis(20)),
            );

            listener
                .prompt(ConversationState::new("Pick", opts(&["a", "b", "c"])))
                .await
                .unwrap();

            assert_eq!(harness.bus.registered_count(), 4);
            assert_eq!(harness.bus.disposed_count(), 4);
            assert_eq!(harness.bus.active_count(), 0);
        }
    }

    mod cancellation {
        use super::*;

        #[tokio::test]
        async fn cancel_keyword_ends_round() {
            let harness = Harness::new();
            let listener = harness.listener(Arc::new(TextModality), MatchPolicy::default());
            let round = harness.spawn_round(listener, ConversationState::new("Name?", vec![]));

            harness.bus.wait_for_active(2).await;
            harness.owner_says("END").await;

            let (_, state) = round.await.unwrap();
            assert!(state.is_ended());
            assert_eq!(state.response(), None);
            assert!(state.has_note(&RoundNote::Cancelled));
        }

        #[tokio::test]
        async fn cancel_button_ends_round() {
            let harness = Harness::new();
            let listener = harness.listener(Arc::new(ButtonModality), MatchPolicy::default());
            let round = harness.spawn_round(
                listener,
                ConversationState::new("Pick", opts(&["a", "b", "c"])),
            );

            harness.bus.wait_for_active(4).await;
            let rendered = harness.display.last_rendered().unwrap();
            let cancel_id = rendered
                .rows
                .iter()
                .flatten()
                .find_map(|c| match c {
                    Control::Button { id, label, .. } if label == "Cancel" => Some(id.clone()),
                    _ => None,
                })
                .unwrap();
            harness.owner_clicks(&cancel_id).await;

            let (_, state) = round.await.unwrap();
            assert!(state.is_ended());
            assert_eq!(harness.bus.disposed_count(), 4);
        }

        #[tokio::test]
        async fn others_cannot_cancel() {
            let harness = Harness::new();
            let listener = harness.listener(
                Arc::new(TextModality),
                MatchPolicy::default()
                    .with_all_responders(true)
                    .with_timeout(Duration::from_millis(200)),
            );
            let round = harness.spawn_round(listener, ConversationState::new("Name?", vec![]));

            harness.bus.wait_for_active(2).await;
            harness.stranger_says("end").await;

            let (_, state) = round.await.unwrap();
            // The stranger's "end" is neither a cancellation nor an answer.
            assert!(state.has_note(&RoundNote::TimedOut));
        }

        #[tokio::test]
        async fn no_affordance_when_cancel_disabled() {
            let harness = Harness::new();
            let listener = harness.listener(
                Arc::new(ButtonModality),
                MatchPolicy::default().with_cancel(false),
            );
            let round = harness.spawn_round(
                listener,
                ConversationState::new("Pick", opts(&["a", "b", "c"])),
            );

            // responses: control + text, plus the keyword subscription
            harness.bus.wait_for_active(3).await;
            let rendered = harness.display.last_rendered().unwrap();
            assert_eq!(rendered.control_count(), 3);
            harness.owner_says("b").await;

            let (_, state) = round.await.unwrap();
            assert_eq!(state.response(), Some("b"));
        }
    }

    mod responses {
        use super::*;

        #[tokio::test]
        async fn rejected_input_keeps_round_open() {
            let harness = Harness::new();
            let listener = harness.listener(Arc::new(ButtonModality), MatchPolicy::default());
            let round = harness.spawn_round(
                listener,
                ConversationState::new("Pick", opts(&["one", "two", "three"])),
            );

            harness.bus.wait_for_active(4).await;
            harness.owner_says("four").await;
            harness.owner_says("Two").await;

            let (_, state) = round.await.unwrap();
            assert_eq!(state.response(), Some("two"));
            assert_eq!(state.responder(), Some(&harness.owner()));
            assert!(state.has_note(&RoundNote::Typed));
        }

        #[tokio::test]
        async fn other_users_ignored_by_default() {
            let harness = Harness::new();
            let listener = harness.listener(
                Arc::new(TextModality),
                MatchPolicy::default().with_timeout(Duration::from_millis(200)),
            );
            let round = harness.spawn_round(listener, ConversationState::new("Name?", vec![]));

            harness.bus.wait_for_active(2).await;
            harness.stranger_says("Mallory").await;

            let (_, state) = round.await.unwrap();
            assert!(state.is_ended());
            assert_eq!(state.response(), None);
        }

        #[tokio::test]
        async fn all_responders_records_actual_responder() {
            let harness = Harness::new();
            let listener = harness.listener(
                Arc::new(TextModality),
                MatchPolicy::default().with_all_responders(true),
            );
            let round = harness.spawn_round(listener, ConversationState::new("Name?", vec![]));

            harness.bus.wait_for_active(2).await;
            harness.stranger_says("Mallory").await;

            let (_, state) = round.await.unwrap();
            assert_eq!(state.response(), Some("Mallory"));
            assert_eq!(state.responder(), Some(&harness.stranger()));
        }

        #[tokio::test]
        async fn first_of_concurrent_events_wins() {
            let harness = Harness::new();
            let listener = harness.listener(
                Arc::new(ButtonModality),
                MatchPolicy::default().with_mode(MatchMode::Strict),
            );
            let round = harness.spawn_round(
                listener,
                ConversationState::new("Pick", opts(&["one", "two", "three"])),
            );

            harness.bus.wait_for_active(4).await;
            let click_id = harness.control_id_for("two");
            let events = vec![
                harness.owner_click_event(&click_id),
                harness.owner_message_event("three"),
                harness.owner_message_event("one"),
            ];
            futures::future::join_all(events.into_iter().map(|e| {
                let bus = harness.bus.clone();
                tokio::spawn(async move { bus.publish(e).await })
            }))
            .await;

            let (_, state) = round.await.unwrap();
            let response = state.response().unwrap();
            assert!(["one", "two", "three"].contains(&response));
            assert_eq!(harness.bus.registered_count(), harness.bus.disposed_count());
        }

        #[tokio::test]
        async fn late_events_after_resolution_change_nothing() {
            let harness = Harness::new();
            let listener = harness.listener(Arc::new(TextModality), MatchPolicy::default());
            let round = harness.spawn_round(listener, ConversationState::new("Name?", vec![]));

            harness.bus.wait_for_active(2).await;
            harness.owner_says("Ada").await;
            let (_, state) = round.await.unwrap();

            assert_eq!(harness.owner_says("Grace").await, 0);
            assert_eq!(state.response(), Some("Ada"));
        }
    }

    mod subscriptions {
        use super::*;

        #[tokio::test]
        async fn failed_click_subscription_still_accepts_typed_answer() {
            let harness = Harness::new();
            harness
                .bus
                .fail_subscribes(InteractionKind::ControlActivated, true);
            let listener = harness.listener(Arc::new(ButtonModality), MatchPolicy::default());
            let round = harness.spawn_round(
                listener,
                ConversationState::new("Pick", opts(&["one", "two", "three"])),
            );

            // typed response + cancel keyword; clicks and the cancel button failed
            harness.bus.wait_for_registered(2).await;
            assert_eq!(harness.bus.active_of_kind(InteractionKind::ControlActivated), 0);
            harness.owner_says("Two").await;

            let (_, state) = round.await.unwrap();
            assert_eq!(state.response(), Some("two"));
            assert!(state.has_note(&RoundNote::Typed));
            assert_eq!(harness.bus.registered_count(), 2);
            assert_eq!(harness.bus.disposed_count(), 2);
            assert_eq!(harness.bus.active_count(), 0);
        }

        #[tokio::test]
        async fn round_with_no_subscriptions_still_times_out() {
            let harness = Harness::new();
            harness.bus.fail_subscribes(InteractionKind::MessageSent, true);
            let mut listener = harness.listener(
                Arc::new(TextModality),
                MatchPolicy::default().with_timeout(Duration::from_millis(20)),
            );

            let state = listener
                .prompt(ConversationState::new("Name?", vec![]))
                .await
                .unwrap();

            assert!(state.has_note(&RoundNote::TimedOut));
            assert_eq!(harness.bus.registered_count(), 0);
            assert_eq!(harness.bus.disposed_count(), 0);
        }
    }

    mod rendering {
        use super::*;

        #[tokio::test]
        async fn second_round_edits_live_message() {
            let harness = Harness::new();
            let listener = harness.listener(Arc::new(TextModality), MatchPolicy::default());

            let round = harness.spawn_round(listener, ConversationState::new("First?", vec![]));
            harness.bus.wait_for_active(2).await;
            harness.owner_says("1").await;
            let (listener, _) = round.await.unwrap();

            let round = harness.spawn_round(listener, ConversationState::new("Second?", vec![]));
            harness.bus.wait_for_active(2).await;
            harness.owner_says("2").await;
            let (listener, state) = round.await.unwrap();

            assert_eq!(state.response(), Some("2"));
            assert_eq!(harness.display.sent_count(), 1);
            assert_eq!(harness.display.edit_count(), 1);
            assert_eq!(listener.rounds(), 2);
        }

        #[tokio::test]
        async fn send_failure_does_not_abort_round() {
            let harness = Harness::new();
            harness.display.fail_sends(true);
            let listener = harness.listener(Arc::new(TextModality), MatchPolicy::default());
            let round = harness.spawn_round(listener, ConversationState::new("Name?", vec![]));

            harness.bus.wait_for_active(2).await;
            harness.owner_says("Ada").await;

            let (listener, state) = round.await.unwrap();
            assert_eq!(state.response(), Some("Ada"));
            assert!(listener.live_message().is_none());
        }

        #[tokio::test]
        async fn edit_failure_keeps_previous_message() {
            let harness = Harness::new();
            let listener = harness.listener(Arc::new(TextModality), MatchPolicy::default());
            let round = harness.spawn_round(listener, ConversationState::new("First?", vec![]));
            harness.bus.wait_for_active(2).await;
            harness.owner_says("1").await;
            let (listener, _) = round.await.unwrap();
            let first = listener.live_message().cloned();

            harness.display.fail_edits(true);
            let round = harness.spawn_round(listener, ConversationState::new("Second?", vec![]));
            harness.bus.wait_for_active(2).await;
            harness.owner_says("2").await;
            let (listener, state) = round.await.unwrap();

            assert_eq!(state.response(), Some("2"));
            assert_eq!(listener.live_message().cloned(), first);
        }

        #[tokio::test]
        async fn deferred_interaction_acknowledged_once() {
            let harness = Harness::with_context(|ctx| {
                ctx.with_deferred(InteractionToken::new("tok").unwrap())
            });
            let listener = harness.listener(
                Arc::new(TextModality),
                MatchPolicy::default().with_timeout(Duration::from_millis(10)),
            );
            let (mut listener, _) = harness
                .spawn_round(listener, ConversationState::new("a", vec![]))
                .await
                .unwrap();
            listener
                .prompt(ConversationState::new("b", vec![]))
                .await
                .unwrap();

            let acks = harness
                .display
                .calls()
                .into_iter()
                .filter(|c| matches!(c, DisplayCall::Acknowledged(_)))
                .count();
            assert_eq!(acks, 1);
            assert!(matches!(
                harness.display.calls().first(),
                Some(DisplayCall::Acknowledged(_))
            ));
        }

        #[tokio::test]
        async fn ended_state_is_returned_without_a_round() {
            let harness = Harness::new();
            let mut listener = harness.listener(Arc::new(TextModality), MatchPolicy::default());
            let mut state = ConversationState::new("x", vec![]);
            state.end();

            let state = listener.prompt(state).await.unwrap();
            assert!(state.is_ended());
            assert!(harness.display.calls().is_empty());
            assert_eq!(harness.bus.registered_count(), 0);
        }
    }

    mod closing {
        use super::*;

        #[tokio::test]
        async fn close_edits_to_notice() {
            let harness = Harness::new();
            let listener = harness.listener(
                Arc::new(TextModality),
                MatchPolicy::default().with_timeout(Duration::from_millis(10)),
            );
            let (mut listener, _) = harness
                .spawn_round(listener, ConversationState::new("a", vec![]))
                .await
                .unwrap();
            let handle = listener.live_message().cloned().unwrap();

            listener.close(&PromptContent::text("Ended."), false).await;

            assert_eq!(
                harness.display.live_message(&handle),
                Some(OutgoingMessage::plain(PromptContent::text("Ended.")))
            );
            assert!(listener.live_message().is_none());
        }

        #[tokio::test]
        async fn close_can_delete() {
            let harness = Harness::new();
            let listener = harness.listener(
                Arc::new(TextModality),
                MatchPolicy::default().with_timeout(Duration::from_millis(10)),
            );
            let (mut listener, _) = harness
                .spawn_round(listener, ConversationState::new("a", vec![]))
                .await
                .unwrap();
            let handle = listener.live_message().cloned().unwrap();

            listener.close(&PromptContent::text("Ended."), true).await;
            assert_eq!(harness.display.live_message(&handle), None);
        }

        #[tokio::test]
        async fn close_without_live_message_is_noop() {
            let harness = Harness::new();
            let mut listener = harness.listener(Arc::new(TextModality), MatchPolicy::default());
            listener.close(&PromptContent::text("Ended."), false).await;
            assert!(harness.display.calls().is_empty());
        }
    }

    #[test]
    fn cancel_button_joins_last_row_when_room() {
        let mut message = OutgoingMessage::plain(PromptContent::text("x")).with_row(vec![
            Control::Button {
                id: "a".into(),
                label: "a".into(),
                style: ButtonStyle::Primary,
            },
        ]);
        attach_cancel_button(&mut message, "c".into());
        assert_eq!(message.rows.len(), 1);
        assert_eq!(message.rows[0].len(), 2);
    }

    #[test]
    fn cancel_button_gets_own_row_after_menu() {
        let mut message = OutgoingMessage::plain(PromptContent::text("x")).with_row(vec![
            Control::Menu {
                id: "m".into(),
                placeholder: "Pick".into(),
                choices: vec![],
            },
        ]);
        attach_cancel_button(&mut message, "c".into());
        assert_eq!(message.rows.len(), 2);
        assert_eq!(message.rows[1][0].id(), "c");
    }

    #[test]
    fn cancel_button_dropped_when_message_full() {
        let full_row: Vec<Control> = (0..MAX_CONTROLS_PER_ROW)
            .map(|i| Control::Button {
                id: i.to_string(),
                label: i.to_string(),
                style: ButtonStyle::Primary,
            })
            .collect();
        let mut message = OutgoingMessage::plain(PromptContent::text("x"));
        for _ in 0..MAX_CONTROL_ROWS {
            message = message.with_row(full_row.clone());
        }
        attach_cancel_button(&mut message, "c".into());
        assert_eq!(message.control_count(), MAX_CONTROLS_PER_ROW * MAX_CONTROL_ROWS);
    }
}
