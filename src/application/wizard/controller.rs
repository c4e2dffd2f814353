//! Drives a [`Flow`] window by window.

use serde::Serialize;
use std::mem;

use super::flow::{Flow, Transition};
use super::session::{EndReason, Wizard, WizardOptions};
use crate::application::errors::ConversationError;
use crate::application::listener::InputListener;
use crate::application::registry::ActiveGuard;
use crate::domain::conversation::{BackStack, ControllerStatus};
use crate::domain::foundation::{ConversationId, Timestamp};

/// What a finished conversation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationSummary {
    pub conversation_id: ConversationId,
    pub flow: &'static str,
    pub reason: EndReason,
    /// Window invocations, counting replays after going back.
    pub windows_shown: u64,
    pub rounds: u64,
    pub started_at: Timestamp,
    pub ended_at: Timestamp,
}

impl ConversationSummary {
    /// Wall-clock time from start to end.
    pub fn duration_ms(&self) -> i64 {
        self.ended_at.duration_since(&self.started_at).num_milliseconds()
    }
}

/// Sequences the windows of one conversation.
///
/// Owns exactly one listener (through its [`Wizard`]) and the back-stack.
/// Window values carry their own arguments, so going back replays the
/// previous window exactly as it was first shown.
pub struct ConversationController<F: Flow> {
    flow: F,
    wizard: Wizard,
    history: BackStack<F::Window>,
    current: F::Window,
    windows_shown: u64,
    _guard: Option<ActiveGuard>,
}

impl<F: Flow> ConversationController<F> {
    pub fn new(flow: F, listener: InputListener, options: WizardOptions) -> Self {
        let current = flow.root();
        let history = BackStack::new(options.max_back_stack);
        Self {
            flow,
            wizard: Wizard::new(listener, options),
            history,
            current,
            windows_shown: 0,
            _guard: None,
        }
    }

    /// Holds a registry slot for as long as the controller lives.
    pub fn with_guard(mut self, guard: ActiveGuard) -> Self {
        self._guard = Some(guard);
        self
    }

    pub fn conversation_id(&self) -> ConversationId {
        self.wizard.conversation_id()
    }

    pub fn status(&self) -> ControllerStatus {
        self.wizard.status()
    }

    pub fn current(&self) -> &F::Window {
        &self.current
    }

    /// Windows that `go_back` can return to.
    pub fn depth(&self) -> usize {
        self.history.len()
    }

    /// Switches to `window`, remembering the current one for going back.
    pub fn next_window(&mut self, window: F::Window) {
        let previous = mem::replace(&mut self.current, window);
        if let Some(evicted) = self.history.push(previous) {
            tracing::debug!(
                conversation_id = %self.conversation_id(),
                window = ?evicted,
                "Back-stack full, dropped oldest window"
            );
        }
        self.wizard.set_depth(self.history.len());
    }

    /// Returns to the previous window. At the root, the root is shown again.
    pub fn go_back(&mut self) {
        self.current = match self.history.pop() {
            Some(previous) => previous,
            None => self.flow.root(),
        };
        self.wizard.set_depth(self.history.len());
    }

    /// Ends the conversation without running it further.
    pub async fn end(&mut self) {
        self.wizard.end().await;
    }

    /// Runs the flow from its root window until it ends.
    ///
    /// # Errors
    ///
    /// `Inactive` if the controller was already ended, or the first error a
    /// window returns. The conversation is closed in both cases.
    pub async fn run(mut self) -> Result<ConversationSummary, ConversationError> {
        self.wizard.activate()?;
        let started_at = Timestamp::now();
        tracing::info!(
            conversation_id = %self.conversation_id(),
            flow = self.flow.name(),
            owner = %self.wizard.context().owner,
            channel = %self.wizard.context().channel,
            "Conversation started"
        );

        while self.wizard.is_active() {
            self.windows_shown += 1;
            tracing::debug!(
                conversation_id = %self.conversation_id(),
                window = ?self.current,
                depth = self.history.len(),
                "Showing window"
            );

            let transition = match self.flow.show(self.current.clone(), &mut self.wizard).await {
                Ok(transition) => transition,
                Err(e) => {
                    tracing::warn!(
                        conversation_id = %self.conversation_id(),
                        flow = self.flow.name(),
                        window = ?self.current,
                        "Window failed: {}",
                        e
                    );
                    self.wizard.close(EndReason::Failed, None).await;
                    return Err(e);
                }
            };

            if !self.wizard.is_active() {
                break;
            }
            match transition {
                Transition::Next(window) => self.next_window(window),
                Transition::Back => self.go_back(),
                Transition::Stay => {}
                Transition::End => self.wizard.end().await,
            }
        }

        let summary = ConversationSummary {
            conversation_id: self.conversation_id(),
            flow: self.flow.name(),
            reason: self.wizard.end_reason().unwrap_or(EndReason::Completed),
            windows_shown: self.windows_shown,
            rounds: self.wizard.listener().rounds(),
            started_at,
            ended_at: Timestamp::now(),
        };
        tracing::debug!(
            conversation_id = %summary.conversation_id,
            reason = %summary.reason,
            duration_ms = summary.duration_ms(),
            "Conversation summary"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::listener::test_support::Harness;
    use crate::application::listener::ButtonModality;
    use crate::application::wizard::Question;
    use crate::domain::conversation::MatchPolicy;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Step {
        Start,
        Detail(u32),
    }

    /// Records visited windows; never prompts.
    struct Scripted {
        script: Vec<Transition<Step>>,
        visited: Arc<std::sync::Mutex<Vec<Step>>>,
    }

    #[async_trait]
    impl Flow for Scripted {
        type Window = Step;

        fn name(&self) -> &'static str {
            "scripted"
        }

        fn root(&self) -> Step {
            Step::Start
        }

        async fn show(
            &mut self,
            window: Step,
            _wizard: &mut Wizard,
        ) -> Result<Transition<Step>, ConversationError> {
            self.visited.lock().unwrap().push(window);
            if self.script.is_empty() {
                return Ok(Transition::End);
            }
            Ok(self.script.remove(0))
        }
    }

    fn controller(
        harness: &Harness,
        script: Vec<Transition<Step>>,
        options: WizardOptions,
    ) -> (ConversationController<Scripted>, Arc<std::sync::Mutex<Vec<Step>>>) {
        let visited = Arc::new(std::sync::Mutex::new(Vec::new()));
        let flow = Scripted {
            script,
            visited: visited.clone(),
        };
        let listener = harness.listener(Arc::new(ButtonModality), MatchPolicy::default());
        (ConversationController::new(flow, listener, options), visited)
    }

    mod navigation {
        use super::*;

        #[tokio::test]
        async fn back_replays_previous_window_with_its_arguments() {
            let harness = Harness::new();
            let (controller, visited) = controller(
                &harness,
                vec![
                    Transition::Next(Step::Detail(1)),
                    Transition::Next(Step::Detail(2)),
                    Transition::Back,
                    Transition::Back,
                    Transition::End,
                ],
                WizardOptions::default(),
            );

            let summary = controller.run().await.unwrap();

            assert_eq!(
                *visited.lock().unwrap(),
                vec![
                    Step::Start,
                    Step::Detail(1),
                    Step::Detail(2),
                    Step::Detail(1),
                    Step::Start
                ]
            );
            assert_eq!(summary.reason, EndReason::Completed);
            assert_eq!(summary.windows_shown, 5);
            assert!(summary.ended_at >= summary.started_at);
            assert!(summary.duration_ms() >= 0);
        }

        #[tokio::test]
        async fn back_at_root_shows_root_again() {
            let harness = Harness::new();
            let (controller, visited) = controller(
                &harness,
                vec![Transition::Back, Transition::End],
                WizardOptions::default(),
            );
            controller.run().await.unwrap();
            assert_eq!(*visited.lock().unwrap(), vec![Step::Start, Step::Start]);
        }

        #[tokio::test]
        async fn stay_repeats_current_window() {
            let harness = Harness::new();
            let (controller, visited) = controller(
                &harness,
                vec![Transition::Next(Step::Detail(7)), Transition::Stay],
                WizardOptions::default(),
            );
            controller.run().await.unwrap();
            assert_eq!(
                *visited.lock().unwrap(),
                vec![Step::Start, Step::Detail(7), Step::Detail(7)]
            );
        }

        #[test]
        fn back_stack_is_bounded() {
            let harness = Harness::new();
            let (mut controller, _) = controller(
                &harness,
                vec![],
                WizardOptions {
                    max_back_stack: 2,
                    ..WizardOptions::default()
                },
            );
            for i in 0..5 {
                controller.next_window(Step::Detail(i));
            }
            assert_eq!(controller.depth(), 2);
            controller.go_back();
            assert_eq!(controller.current(), &Step::Detail(3));
        }
    }

    mod lifecycle {
        use super::*;

        #[tokio::test]
        async fn ended_controller_cannot_run() {
            let harness = Harness::new();
            let (mut controller, visited) = controller(&harness, vec![], WizardOptions::default());
            controller.end().await;

            let err = controller.run().await.unwrap_err();
            assert!(matches!(err, ConversationError::Inactive));
            assert!(visited.lock().unwrap().is_empty());
        }

        #[tokio::test]
        async fn window_error_closes_and_propagates() {
            struct Failing;

            #[async_trait]
            impl Flow for Failing {
                type Window = ();

                fn name(&self) -> &'static str {
                    "failing"
                }

                fn root(&self) -> Self::Window {}

                async fn show(
                    &mut self,
                    _: (),
                    _: &mut Wizard,
                ) -> Result<Transition<()>, ConversationError> {
                    Err(ConversationError::InvalidPrompt {
                        listener: "button",
                        reason: "broken".into(),
                    })
                }
            }

            let harness = Harness::new();
            let listener = harness.listener(Arc::new(ButtonModality), MatchPolicy::default());
            let controller =
                ConversationController::new(Failing, listener, WizardOptions::default());

            let err = controller.run().await.unwrap_err();
            assert!(matches!(err, ConversationError::InvalidPrompt { .. }));
        }

        #[tokio::test]
        async fn timeout_inside_window_ends_run() {
            struct Asking;

            #[async_trait]
            impl Flow for Asking {
                type Window = u8;

                fn name(&self) -> &'static str {
                    "asking"
                }

                fn root(&self) -> u8 {
                    0
                }

                async fn show(
                    &mut self,
                    window: u8,
                    wizard: &mut Wizard,
                ) -> Result<Transition<u8>, ConversationError> {
                    wizard
                        .with_response(
                            Question::new("Pick", vec!["x".into(), "y".into()]),
                            move |_| Transition::Next(window + 1),
                        )
                        .await
                }
            }

            let harness = Harness::new();
            let listener = harness.listener(
                Arc::new(ButtonModality),
                MatchPolicy::default().with_timeout(Duration::from_millis(20)),
            );
            let summary = ConversationController::new(Asking, listener, WizardOptions::default())
                .run()
                .await
                .unwrap();

            assert_eq!(summary.reason, EndReason::TimedOut);
            assert_eq!(summary.rounds, 1);
            assert_eq!(harness.bus.active_count(), 0);
        }
    }
}
