//! Line-oriented transport for running the bot in a terminal.
//!
//! Each input line is one update:
//! - `/command` is a bot command,
//! - `!<data>` presses a button carrying `<data>` (e.g. `!vote_2`),
//! - anything else is free text.
//!
//! A leading `@<user_id> ` sends the line as another member.

use configs::ConsoleSettings;
use domains::{ChatId, InboundEvent, VoterId};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::dispatcher::Dispatcher;
use crate::render::{Reply, ReplyMode};

pub fn parse_line(line: &str, settings: &ConsoleSettings) -> Option<InboundEvent> {
    let chat_id = ChatId(settings.chat_id);
    let mut user_id = VoterId(settings.user_id);
    let mut rest = line.trim();

    if let Some(tail) = rest.strip_prefix('@') {
        let (id, text) = tail.split_once(char::is_whitespace).unwrap_or((tail, ""));
        user_id = VoterId(id.parse().ok()?);
        rest = text.trim_start();
    }
    if rest.is_empty() {
        return None;
    }
    if let Some(data) = rest.strip_prefix('!') {
        return Some(InboundEvent::CallbackQuery {
            chat_id,
            user_id,
            data: data.to_string(),
        });
    }
    InboundEvent::from_message(chat_id, user_id, rest)
}

fn format_reply(reply: &Reply) -> String {
    let mut out = String::new();
    if reply.mode == ReplyMode::Edit {
        out.push_str("(edited)\n");
    }
    out.push_str(&reply.text);
    out.push('\n');
    if let Some(keyboard) = &reply.keyboard {
        for row in &keyboard.rows {
            let buttons: Vec<String> = row
                .iter()
                .map(|b| match b.data.trim() {
                    "" => format!("[{}]", b.label),
                    data => format!("[{} !{}]", b.label, data),
                })
                .collect();
            out.push_str(&buttons.join(" "));
            out.push('\n');
        }
    }
    out
}

/// Feeds `input` line by line through `dispatcher` until end of input.
/// A failed update is logged and reported; the loop keeps going.
pub async fn run<R, W>(
    dispatcher: &Dispatcher,
    settings: &ConsoleSettings,
    input: R,
    mut output: W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let Some(event) = parse_line(&line, settings) else {
            continue;
        };
        match dispatcher.handle(event).await {
            Ok(Some(reply)) => output.write_all(format_reply(&reply).as_bytes()).await?,
            Ok(None) => {}
            Err(err) => {
                tracing::error!(error = %err, "update failed");
                output.write_all(b"(something went wrong, try again later)\n").await?;
            }
        }
        output.flush().await?;
    }
    Ok(())
}
