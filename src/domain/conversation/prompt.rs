//! Outgoing prompt content and interactive controls.
//!
//! These are platform-neutral descriptions; the display gateway decides how
//! they look on the real chat service.

use serde::{Deserialize, Serialize};

/// What a round displays to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromptContent {
    /// Plain message text.
    Text { body: String },
    /// Titled rich content (an embed on most platforms).
    Rich(RichContent),
}

/// Titled rich content block.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RichContent {
    pub title: String,
    pub description: String,
    pub fields: Vec<RichField>,
    pub color: Option<u32>,
    pub footer: Option<String>,
}

/// A name/value pair shown inside rich content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl PromptContent {
    /// Creates plain text content.
    pub fn text(body: impl Into<String>) -> Self {
        PromptContent::Text { body: body.into() }
    }

    /// Creates rich content with a title and description.
    pub fn rich(title: impl Into<String>, description: impl Into<String>) -> Self {
        PromptContent::Rich(RichContent {
            title: title.into(),
            description: description.into(),
            ..Default::default()
        })
    }

    /// Adds a field; plain text gets it appended as a `name: value` line.
    pub fn with_field(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let (name, value) = (name.into(), value.into());
        match self {
            PromptContent::Text { body } => PromptContent::Text {
                body: format!("{}\n{}: {}", body, name, value),
            },
            PromptContent::Rich(mut rich) => {
                rich.fields.push(RichField {
                    name,
                    value,
                    inline: false,
                });
                PromptContent::Rich(rich)
            }
        }
    }

    /// Sets the rich accent colour; ignored for plain text.
    pub fn with_color(self, color: u32) -> Self {
        match self {
            PromptContent::Rich(mut rich) => {
                rich.color = Some(color);
                PromptContent::Rich(rich)
            }
            other => other,
        }
    }

    /// Adds a footer line below any existing footer; appended to the body
    /// for plain text.
    pub fn with_footer(self, footer: impl Into<String>) -> Self {
        let footer = footer.into();
        match self {
            PromptContent::Text { body } => PromptContent::Text {
                body: format!("{}\n\n{}", body, footer),
            },
            PromptContent::Rich(mut rich) => {
                rich.footer = Some(match rich.footer.take() {
                    Some(existing) if !existing.is_empty() => format!("{}\n{}", existing, footer),
                    _ => footer,
                });
                PromptContent::Rich(rich)
            }
        }
    }

    /// Lists the options inline, for listeners that render no controls.
    pub fn with_options_listed(self, options: &[String]) -> Self {
        if options.is_empty() {
            return self;
        }
        let listed = options
            .iter()
            .map(|o| format!("`{}`", o))
            .collect::<Vec<_>>()
            .join(", ");
        self.with_field("Options", listed)
    }

    /// True when there is nothing to show.
    pub fn is_blank(&self) -> bool {
        match self {
            PromptContent::Text { body } => body.trim().is_empty(),
            PromptContent::Rich(rich) => {
                rich.title.trim().is_empty()
                    && rich.description.trim().is_empty()
                    && rich.fields.is_empty()
            }
        }
    }
}

impl From<&str> for PromptContent {
    fn from(body: &str) -> Self {
        PromptContent::text(body)
    }
}

impl From<String> for PromptContent {
    fn from(body: String) -> Self {
        PromptContent::text(body)
    }
}

/// Visual weight of a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    Primary,
    Secondary,
    Danger,
}

/// One entry of a dropdown menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuChoice {
    pub label: String,
    pub value: String,
}

/// An interactive control attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Control {
    Button {
        id: String,
        label: String,
        style: ButtonStyle,
    },
    Menu {
        id: String,
        placeholder: String,
        choices: Vec<MenuChoice>,
    },
}

impl Control {
    /// Identifier echoed back by the platform when the control is used.
    pub fn id(&self) -> &str {
        match self {
            Control::Button { id, .. } | Control::Menu { id, .. } => id,
        }
    }
}

/// A complete message to send or edit: content plus rows of controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub content: PromptContent,
    pub rows: Vec<Vec<Control>>,
}

impl OutgoingMessage {
    /// A message with no controls.
    pub fn plain(content: PromptContent) -> Self {
        Self {
            content,
            rows: Vec::new(),
        }
    }

    /// Appends a row of controls, skipping empty rows.
    pub fn with_row(mut self, row: Vec<Control>) -> Self {
        if !row.is_empty() {
            self.rows.push(row);
        }
        self
    }

    /// Number of controls across all rows.
    pub fn control_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }
}
