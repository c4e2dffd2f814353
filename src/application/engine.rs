//! Entry point for starting conversations.

use std::sync::Arc;

use super::errors::ConversationError;
use super::listener::{InputListener, ListenerKind};
use super::registry::ConversationRegistry;
use super::wizard::{ConversationController, ConversationSummary, Flow, WizardOptions};
use crate::config::EngineConfig;
use crate::domain::conversation::MatchPolicy;
use crate::domain::foundation::ConversationId;
use crate::ports::{ConversationContext, DisplayGateway, InteractionBus};

/// Builds listeners and controllers wired to one display and one bus.
///
/// # Example
///
/// ```ignore
/// let engine = ConversationEngine::from_config(&config, display, bus);
/// let summary = engine.run(ShopFlow::default(), ctx).await?;
/// ```
#[derive(Clone)]
pub struct ConversationEngine {
    display: Arc<dyn DisplayGateway>,
    bus: Arc<dyn InteractionBus>,
    registry: ConversationRegistry,
    kind: ListenerKind,
    policy: MatchPolicy,
    options: WizardOptions,
}

impl ConversationEngine {
    pub fn new(display: Arc<dyn DisplayGateway>, bus: Arc<dyn InteractionBus>) -> Self {
        Self {
            display,
            bus,
            registry: ConversationRegistry::new(),
            kind: ListenerKind::default(),
            policy: MatchPolicy::default(),
            options: WizardOptions::default(),
        }
    }

    pub fn from_config(
        config: &EngineConfig,
        display: Arc<dyn DisplayGateway>,
        bus: Arc<dyn InteractionBus>,
    ) -> Self {
        Self::new(display, bus)
            .with_listener_kind(config.listener.kind)
            .with_policy(config.match_policy())
            .with_options(config.wizard_options())
    }

    pub fn with_listener_kind(mut self, kind: ListenerKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_options(mut self, options: WizardOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &ConversationRegistry {
        &self.registry
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    /// A standalone listener for one-off questions outside a wizard.
    pub fn listener(&self, kind: ListenerKind, context: ConversationContext) -> InputListener {
        InputListener::for_kind(
            kind,
            Arc::clone(&self.display),
            Arc::clone(&self.bus),
            context,
            self.policy.clone(),
        )
    }

    /// Creates a controller for `flow` with the engine's default listener.
    ///
    /// # Errors
    ///
    /// `AlreadyActive` if the context's user already has a conversation in
    /// its channel.
    pub fn start<F: Flow>(
        &self,
        flow: F,
        context: ConversationContext,
    ) -> Result<ConversationController<F>, ConversationError> {
        self.start_with(flow, self.kind, context)
    }

    /// Like [`start`](Self::start), with an explicit listener variant.
    ///
    /// Reaction listeners that accept anyone need `context.bot` set, or
    /// their first round fails with `MissingBotUser`.
    pub fn start_with<F: Flow>(
        &self,
        flow: F,
        kind: ListenerKind,
        context: ConversationContext,
    ) -> Result<ConversationController<F>, ConversationError> {
        let conversation = ConversationId::new();
        let guard = self
            .registry
            .register(&context.owner, &context.channel, conversation)?;
        let listener = self.listener(kind, context).with_conversation_id(conversation);
        Ok(ConversationController::new(flow, listener, self.options.clone()).with_guard(guard))
    }

    /// Starts `flow` and runs it to the end.
    pub async fn run<F: Flow>(
        &self,
        flow: F,
        context: ConversationContext,
    ) -> Result<ConversationSummary, ConversationError> {
        self.start(flow, context)?.run().await
    }
}
