use serde::Serialize;

/// Who should see an outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "player", rename_all = "snake_case")]
pub enum Audience {
    /// Everybody in the room.
    Room,
    /// A transient notice for a single player (e.g. a callback popup).
    Player(String),
}

/// One selectable answer, with the index the core expects back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceLabel {
    /// 0-based index sent back on selection.
    pub index: usize,
    /// Text shown on the button.
    pub label: String,
}

/// Abstract request to attach `n` labeled choices with stable indices; the
/// platform adapter turns it into buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceMarkup {
    /// Choices in display order.
    pub choices: Vec<ChoiceLabel>,
}

impl ChoiceMarkup {
    /// Label `choices` with their position.
    pub fn from_choices(choices: &[String]) -> Self {
        Self {
            choices: choices
                .iter()
                .enumerate()
                .map(|(index, label)| ChoiceLabel {
                    index,
                    label: label.clone(),
                })
                .collect(),
        }
    }
}

/// Rendered message handed to the notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    /// Recipient within the room.
    pub audience: Audience,
    /// Markdown text.
    pub text: String,
    /// Choices to attach, in multiple-choice rounds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<ChoiceMarkup>,
}

impl OutboundMessage {
    /// Message for the whole room.
    pub fn room(text: impl Into<String>) -> Self {
        Self {
            audience: Audience::Room,
            text: text.into(),
            choices: None,
        }
    }

    /// Transient notice for one player.
    pub fn player(player: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            audience: Audience::Player(player.into()),
            text: text.into(),
            choices: None,
        }
    }

    /// Attach choice buttons when `choices` is set.
    pub fn with_choices(mut self, choices: Option<&[String]>) -> Self {
        self.choices = choices.map(ChoiceMarkup::from_choices);
        self
    }
}
