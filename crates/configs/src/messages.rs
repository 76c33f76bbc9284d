//! Message templates keyed by [`MessageKey`].
//!
//! Templates use `{name}` placeholders. Unknown placeholders are left as
//! they are, and substituted values are never scanned for placeholders.

use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKey {
    Greetings,
    Help,
    NoActiveVoting,
    /// `{count}`
    WrongCardinality,
    /// `{numbers}`
    UnresolvedBooks,
    /// `{books}`, `{books_count}`
    VoteAccepted,
    /// `{count}`; appended to every page of the voting browser.
    VotePrompt,
    /// `{books}`, `{voting_start}`, `{voting_finish}`
    VoteResults,
    NoVoteResults,
    /// `{books}`
    AlreadyRead,
    NothingRead,
    /// `{books}`
    NowReading,
    NothingReading,
}

#[derive(Debug, Clone)]
pub struct MessageTemplates {
    templates: HashMap<MessageKey, String>,
}

impl Default for MessageTemplates {
    fn default() -> Self {
        let templates = [
            (
                MessageKey::Greetings,
                "Hi! I keep the reading club's book list and run our votes.\n\nSend /help to see what I can do.",
            ),
            (
                MessageKey::Help,
                "/allbooks - browse the whole catalog\n\
                 /already - books we have finished\n\
                 /now - what we are reading now\n\
                 /vote - vote for the next book\n\
                 /voteresults - current voting results",
            ),
            (
                MessageKey::NoActiveVoting,
                "There is no voting right now. Wait for the next one!",
            ),
            (
                MessageKey::WrongCardinality,
                "Send exactly {count} different book numbers in one message, for example: 1 5 12",
            ),
            (
                MessageKey::UnresolvedBooks,
                "These numbers don't match books open for voting: {numbers}. Check the list with /vote.",
            ),
            (
                MessageKey::VoteAccepted,
                "Your vote is saved, {books_count}:\n\n{books}\n\nSend another vote before the voting closes to change it.",
            ),
            (
                MessageKey::VotePrompt,
                "Pick {count} books and send their numbers in one message.",
            ),
            (
                MessageKey::VoteResults,
                "Voting from {voting_start} to {voting_finish}. Leaders:\n\n{books}",
            ),
            (MessageKey::NoVoteResults, "Nobody has voted yet."),
            (MessageKey::AlreadyRead, "Books we have read:\n\n{books}"),
            (MessageKey::NothingRead, "We haven't finished any book yet."),
            (MessageKey::NowReading, "Now reading:\n\n{books}"),
            (MessageKey::NothingReading, "We are not reading anything at the moment."),
        ]
        .into_iter()
        .map(|(key, text)| (key, text.to_string()))
        .collect();
        Self { templates }
    }
}

impl MessageTemplates {
    pub fn with_overrides(mut self, overrides: HashMap<MessageKey, String>) -> Self {
        self.templates.extend(overrides);
        self
    }

    pub fn template(&self, key: MessageKey) -> &str {
        self.templates.get(&key).map(String::as_str).unwrap_or_default()
    }

    pub fn render(&self, key: MessageKey, args: &[(&str, &str)]) -> String {
        let template = self.template(key);
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let tail = &rest[open..];
            let value = tail.find('}').and_then(|close| {
                let name = &tail[1..close];
                args.iter()
                    .find(|(arg, _)| *arg == name)
                    .map(|(_, value)| (*value, close))
            });
            match value {
                Some((value, close)) => {
                    out.push_str(value);
                    rest = &tail[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = &tail[1..];
                }
            }
        }
        out.push_str(rest);
        out
    }
}
