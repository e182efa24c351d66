use thiserror::Error;

use crate::state::{RoomId, round::Submission};

/// Command starting a round, optionally followed by a category.
pub const START_COMMAND: &str = "/emoji";
/// Command stopping the open round.
pub const STOP_COMMAND: &str = "/emoji_stop";
/// Command showing the leaderboard.
pub const RANK_COMMAND: &str = "/emoji_rank";

/// What a player asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Start a round, optionally restricted to a category.
    Start {
        /// Requested category.
        category: Option<String>,
    },
    /// Stop the open round.
    Stop,
    /// Show the leaderboard.
    Leaderboard,
    /// Answer the open round.
    Guess(Submission),
}

/// Inbound event routed to the round controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Chat the event comes from.
    pub room: RoomId,
    /// Display name of the sender.
    pub player: String,
    /// Requested action.
    pub action: Action,
}

/// Reasons a console line cannot become an [`InboundEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The line has no room, player or payload.
    #[error("expected `<room> <player> <message>`")]
    MissingField,
    /// The payload is a slash command the game does not know.
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    /// A `#n` selection does not carry a positive number.
    #[error("invalid choice `{0}`: expected `#1`, `#2`, ...")]
    InvalidChoice(String),
}

impl InboundEvent {
    /// Parse a console line `<room> <player> <payload>`.
    ///
    /// The payload is one of the slash commands, `#n` to select the n-th
    /// offered choice (1-based, as displayed), or free text.
    pub fn parse_line(line: &str) -> Result<Self, ParseError> {
        let mut parts = line.trim().splitn(3, char::is_whitespace);
        let room = parts.next().filter(|s| !s.is_empty());
        let player = parts.next().filter(|s| !s.is_empty());
        let payload = parts.next().map(str::trim).filter(|s| !s.is_empty());
        let (Some(room), Some(player), Some(payload)) = (room, player, payload) else {
            return Err(ParseError::MissingField);
        };

        Ok(Self {
            room: room.to_string(),
            player: player.to_string(),
            action: parse_action(payload)?,
        })
    }
}

fn parse_action(payload: &str) -> Result<Action, ParseError> {
    if let Some(label) = payload.strip_prefix('#') {
        let index = label
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .ok_or_else(|| ParseError::InvalidChoice(payload.to_string()))?;
        return Ok(Action::Guess(Submission::Choice(index)));
    }

    if !payload.starts_with('/') {
        return Ok(Action::Guess(Submission::Text(payload.to_string())));
    }

    let mut words = payload.split_whitespace();
    let command = words.next().unwrap_or_default();
    // Group chats may suffix commands with the bot name (`/emoji@charade_bot`).
    let command = command.split('@').next().unwrap_or(command);
    match command {
        START_COMMAND => {
            let category = words.collect::<Vec<_>>().join(" ");
            Ok(Action::Start {
                category: (!category.is_empty()).then_some(category),
            })
        }
        STOP_COMMAND => Ok(Action::Stop),
        RANK_COMMAND => Ok(Action::Leaderboard),
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}
