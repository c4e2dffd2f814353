//! Interactive demo: a small shop wizard in the terminal.
//!
//! Prompts are printed to stdout; every line typed on stdin is delivered to
//! the engine as a message in the `shop` channel. Type an option to pick it,
//! `back` to return to the previous screen, or `end` to cancel.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use chat_wizard::adapters::{ConsoleDisplay, InMemoryInteractionBus};
use chat_wizard::application::{
    ConversationEngine, ConversationError, Flow, Question, Reply, Transition, Wizard,
};
use chat_wizard::config::EngineConfig;
use chat_wizard::domain::conversation::PromptContent;
use chat_wizard::domain::foundation::{ChannelId, UserId};
use chat_wizard::ports::{ConversationContext, InteractionEvent};

const CATALOGUE: &[(&str, &[&str])] = &[
    ("fruit", &["apple", "pear", "lemon"]),
    ("tea", &["green", "black", "mint"]),
    ("bread", &["rye", "sourdough", "bagel"]),
];

fn options(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[derive(Debug, Clone)]
enum ShopWindow {
    Home,
    Category,
    Item { category: String },
    Quantity { item: String },
    Checkout,
}

#[derive(Default)]
struct ShopFlow {
    cart: Vec<(String, u32)>,
}

impl ShopFlow {
    fn receipt(&self) -> String {
        self.cart
            .iter()
            .map(|(item, quantity)| format!("{} x {}", quantity, item))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[async_trait]
impl Flow for ShopFlow {
    type Window = ShopWindow;

    fn name(&self) -> &'static str {
        "shop"
    }

    fn root(&self) -> ShopWindow {
        ShopWindow::Home
    }

    async fn show(
        &mut self,
        window: ShopWindow,
        wizard: &mut Wizard,
    ) -> Result<Transition<ShopWindow>, ConversationError> {
        match window {
            ShopWindow::Home => {
                let prompt = PromptContent::rich("Corner Shop", "What would you like to do?")
                    .with_field("Cart", format!("{} item(s)", self.cart.len()));
                wizard
                    .with_response(
                        Question::new(prompt, options(&["browse", "checkout"])),
                        |answer| {
                            if answer.value.eq_ignore_ascii_case("browse") {
                                Transition::Next(ShopWindow::Category)
                            } else {
                                Transition::Next(ShopWindow::Checkout)
                            }
                        },
                    )
                    .await
            }
            ShopWindow::Category => {
                let categories: Vec<String> =
                    CATALOGUE.iter().map(|(name, _)| name.to_string()).collect();
                wizard
                    .with_response(Question::new("Pick a category", categories), |answer| {
                        Transition::Next(ShopWindow::Item {
                            category: answer.value,
                        })
                    })
                    .await
            }
            ShopWindow::Item { category } => {
                let items = CATALOGUE
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(&category))
                    .map(|(_, items)| options(items))
                    .unwrap_or_default();
                wizard
                    .with_response(
                        Question::new(format!("Which {}?", category), items),
                        |answer| {
                            Transition::Next(ShopWindow::Quantity {
                                item: answer.value,
                            })
                        },
                    )
                    .await
            }
            ShopWindow::Quantity { item } => {
                match wizard
                    .ask(Question::open(format!("How many {}? (1-9)", item)))
                    .await?
                {
                    Reply::Answer(answer) => match answer.value.trim().parse::<u32>() {
                        Ok(quantity) if (1..=9).contains(&quantity) => {
                            self.cart.push((item, quantity));
                            Ok(Transition::Next(ShopWindow::Home))
                        }
                        _ => Ok(Transition::Stay),
                    },
                    Reply::Back => Ok(Transition::Back),
                    Reply::Ended(_) => Ok(Transition::End),
                }
            }
            ShopWindow::Checkout => {
                if self.cart.is_empty() {
                    wizard.end_with_notice("Nothing bought. See you soon!").await;
                    return Ok(Transition::End);
                }
                let prompt = PromptContent::rich("Checkout", "Ready to pay?")
                    .with_field("Cart", self.receipt());
                match wizard
                    .ask(Question::new(prompt, options(&["pay", "empty cart"])))
                    .await?
                {
                    Reply::Answer(answer) if answer.value.eq_ignore_ascii_case("pay") => {
                        let receipt = format!("Paid for {}. Thank you!", self.receipt());
                        wizard.end_with_notice(receipt).await;
                        Ok(Transition::End)
                    }
                    Reply::Answer(_) => {
                        self.cart.clear();
                        Ok(Transition::Next(ShopWindow::Home))
                    }
                    Reply::Back => Ok(Transition::Back),
                    Reply::Ended(_) => Ok(Transition::End),
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::load()?;
    config.validate()?;
    config.telemetry.init()?;

    let bus = InMemoryInteractionBus::new();
    let engine =
        ConversationEngine::from_config(&config, Arc::new(ConsoleDisplay::new()), Arc::new(bus.clone()));

    let user = UserId::new("you")?;
    let channel = ChannelId::new("shop")?;
    let context = ConversationContext::new(user.clone(), channel.clone())
        .with_bot_user(UserId::new("shopbot")?);

    let input = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let delivered = bus
                .publish(InteractionEvent::message_sent(
                    user.clone(),
                    channel.clone(),
                    line,
                ))
                .await;
            if delivered == 0 {
                tracing::debug!("Input arrived between rounds and was dropped");
            }
        }
    });

    let summary = engine.run(ShopFlow::default(), context).await?;
    input.abort();

    if config.telemetry.json {
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        println!(
            "\nConversation {} {} after {} window(s), {} round(s) and {} ms.",
            summary.conversation_id,
            summary.reason,
            summary.windows_shown,
            summary.rounds,
            summary.duration_ms()
        );
    }
    Ok(())
}
