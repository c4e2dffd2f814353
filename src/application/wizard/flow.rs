//! The trait a multi-window conversation implements.

use async_trait::async_trait;
use std::fmt::Debug;

use super::session::Wizard;
use crate::application::errors::ConversationError;

/// Where the controller goes after a window has been shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition<W> {
    /// Show another window; the current one is pushed onto the back-stack.
    Next(W),
    /// Return to the previous window with its original arguments.
    Back,
    /// Show the current window again.
    Stay,
    /// Finish the conversation.
    End,
}

/// A conversation made of typed windows.
///
/// `Window` is usually an enum with one variant per screen, carrying the
/// arguments that screen needs. `show` dispatches on it with an exhaustive
/// `match`, so an undefined window is a compile error rather than a runtime
/// lookup failure.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug, Clone)]
/// enum Shop { Menu, Buy { category: String } }
///
/// #[async_trait]
/// impl Flow for ShopFlow {
///     type Window = Shop;
///
///     fn name(&self) -> &'static str { "shop" }
///     fn root(&self) -> Shop { Shop::Menu }
///
///     async fn show(&mut self, window: Shop, wizard: &mut Wizard)
///         -> Result<Transition<Shop>, ConversationError>
///     {
///         match window {
///             Shop::Menu => wizard
///                 .with_response("What now?", options(&["buy", "sell"]), |answer| {
///                     Transition::Next(Shop::Buy { category: answer.value })
///                 })
///                 .await,
///             Shop::Buy { category } => { /* ... */ Ok(Transition::End) }
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Flow: Send {
    type Window: Clone + Debug + Send + Sync;

    /// Flow name for logs.
    fn name(&self) -> &'static str;

    /// The entry window.
    fn root(&self) -> Self::Window;

    /// Shows one window and returns where to go next.
    async fn show(
        &mut self,
        window: Self::Window,
        wizard: &mut Wizard,
    ) -> Result<Transition<Self::Window>, ConversationError>;
}
