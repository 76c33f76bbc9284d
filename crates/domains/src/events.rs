//! # Inbound Events
//!
//! Updates from the chat transport, validated at the boundary so the core
//! only ever sees one of three explicit shapes.

use std::str::FromStr;

use crate::models::{ChatId, VoterId};

/// Bot commands understood by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Start,
    Help,
    AllBooks,
    Already,
    Now,
    Vote,
    VoteResults,
}

impl Command {
    pub const ALL: [Command; 7] = [
        Command::Start,
        Command::Help,
        Command::AllBooks,
        Command::Already,
        Command::Now,
        Command::Vote,
        Command::VoteResults,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::AllBooks => "allbooks",
            Command::Already => "already",
            Command::Now => "now",
            Command::Vote => "vote",
            Command::VoteResults => "voteresults",
        }
    }
}

impl FromStr for Command {
    type Err = String;

    /// Accepts `/name`, `/name@botname` and trailing arguments.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let word = s
            .trim_start()
            .strip_prefix('/')
            .ok_or_else(|| format!("`{s}` is not a command"))?
            .split_whitespace()
            .next()
            .unwrap_or_default();
        let name = word.split('@').next().unwrap_or_default();
        Command::ALL
            .into_iter()
            .find(|command| command.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| format!("unknown command `/{name}`"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Command {
        chat_id: ChatId,
        user_id: VoterId,
        command: Command,
    },
    /// A press on an inline keyboard button carrying `data`.
    CallbackQuery {
        chat_id: ChatId,
        user_id: VoterId,
        data: String,
    },
    /// Any non-command text; treated as a ballot submission.
    FreeText {
        chat_id: ChatId,
        user_id: VoterId,
        text: String,
    },
}

impl InboundEvent {
    /// Classifies a text message. Unknown `/commands` yield `None` and are
    /// never treated as ballots.
    pub fn from_message(chat_id: ChatId, user_id: VoterId, text: &str) -> Option<Self> {
        if text.trim_start().starts_with('/') {
            return text.parse().ok().map(|command| InboundEvent::Command {
                chat_id,
                user_id,
                command,
            });
        }
        Some(InboundEvent::FreeText {
            chat_id,
            user_id,
            text: text.to_string(),
        })
    }

    pub fn chat_id(&self) -> ChatId {
        match self {
            InboundEvent::Command { chat_id, .. }
            | InboundEvent::CallbackQuery { chat_id, .. }
            | InboundEvent::FreeText { chat_id, .. } => *chat_id,
        }
    }

    pub fn user_id(&self) -> VoterId {
        match self {
            InboundEvent::Command { user_id, .. }
            | InboundEvent::CallbackQuery { user_id, .. }
            | InboundEvent::FreeText { user_id, .. } => *user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_with_bot_suffix_and_arguments() {
        assert_eq!("/vote".parse::<Command>(), Ok(Command::Vote));
        assert_eq!("/voteresults@club_bot".parse::<Command>(), Ok(Command::VoteResults));
        assert_eq!("/AllBooks please".parse::<Command>(), Ok(Command::AllBooks));
        assert!("/unknown".parse::<Command>().is_err());
        assert!("vote".parse::<Command>().is_err());
    }

    #[test]
    fn plain_text_becomes_free_text() {
        let event = InboundEvent::from_message(ChatId(5), VoterId(7), "1, 2 и 3").unwrap();
        assert_eq!(
            event,
            InboundEvent::FreeText {
                chat_id: ChatId(5),
                user_id: VoterId(7),
                text: "1, 2 и 3".to_string(),
            }
        );
        assert_eq!(event.user_id(), VoterId(7));
    }

    #[test]
    fn unknown_commands_are_dropped() {
        assert_eq!(InboundEvent::from_message(ChatId(1), VoterId(1), "/frobnicate 1 2 3"), None);
    }
}
