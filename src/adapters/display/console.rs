//! Console display gateway used by the interactive demo.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::conversation::{Control, OutgoingMessage, PromptContent};
use crate::domain::foundation::{ChannelId, DomainError, MessageId};
use crate::ports::{DisplayGateway, InteractionToken, MessageHandle};

/// Prints prompts to stdout.
pub struct ConsoleDisplay {
    next_id: AtomicU64,
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
        }
    }

    /// Renders a message as terminal text.
    pub fn render(message: &OutgoingMessage) -> String {
        let mut out = match &message.content {
            PromptContent::Text { body } => body.clone(),
            PromptContent::Rich(rich) => {
                let mut text = format!("== {} ==\n{}", rich.title, rich.description);
                for field in &rich.fields {
                    text.push_str(&format!("\n  {}: {}", field.name, field.value));
                }
                if let Some(footer) = &rich.footer {
                    text.push_str(&format!("\n-- {}", footer));
                }
                text
            }
        };
        for row in &message.rows {
            let cells: Vec<String> = row
                .iter()
                .map(|control| match control {
                    Control::Button { label, .. } => format!("[{}]", label),
                    Control::Menu { choices, .. } => format!(
                        "<{}>",
                        choices
                            .iter()
                            .map(|c| c.label.as_str())
                            .collect::<Vec<_>>()
                            .join(" | ")
                    ),
                })
                .collect();
            out.push('\n');
            out.push_str(&cells.join(" "));
        }
        out
    }
}

impl Default for ConsoleDisplay {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DisplayGateway for ConsoleDisplay {
    async fn send(
        &self,
        channel: &ChannelId,
        message: &OutgoingMessage,
    ) -> Result<MessageHandle, DomainError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        println!("\n#{} {}", channel, Self::render(message));
        Ok(MessageHandle {
            channel: channel.clone(),
            message: MessageId::new(format!("console-{}", id))?,
        })
    }

    async fn edit(
        &self,
        handle: &MessageHandle,
        message: &OutgoingMessage,
    ) -> Result<MessageHandle, DomainError> {
        println!("\n#{} (updated) {}", handle.channel, Self::render(message));
        Ok(handle.clone())
    }

    async fn delete(&self, handle: &MessageHandle) -> Result<(), DomainError> {
        println!("\n#{} (message removed)", handle.channel);
        Ok(())
    }

    async fn add_reaction(&self, _handle: &MessageHandle, emoji: &str) -> Result<(), DomainError> {
        println!("  +{}", emoji);
        Ok(())
    }

    async fn clear_reactions(&self, _handle: &MessageHandle) -> Result<(), DomainError> {
        Ok(())
    }

    async fn acknowledge(&self, _token: &InteractionToken) -> Result<(), DomainError> {
        Ok(())
    }
}
