//! Full request cycle: console-style events through the dispatcher into an
//! in-memory store and back out as replies.

use std::sync::Arc;

use chat_adapters::{Dispatcher, Ports, Reply, ReplyMode};
use chrono::NaiveDate;
use configs::Settings;
use domains::{BookStatus, ChatId, Command, InboundEvent, VoterId};
use storage_adapters::InMemoryStore;

const CHAT: ChatId = ChatId(42);

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap()
}

/// Fiction [Dune, Solaris], Science [Cosmos, The Selfish Gene] open for
/// voting, one book in progress and one finished. Voting runs June 5-15.
fn club(today: NaiveDate) -> Dispatcher {
    let store = Arc::new(InMemoryStore::new());
    let fiction = store.add_category("Fiction");
    let science = store.add_category("Science");
    let club = store.add_category("Club shelf");
    store.add_book(fiction, "Dune", BookStatus::NotStarted, None, None);
    store.add_book(fiction, "Solaris", BookStatus::NotStarted, None, None);
    store.add_book(science, "Cosmos", BookStatus::NotStarted, None, None);
    store.add_book(science, "The Selfish Gene", BookStatus::NotStarted, None, None);
    store.add_book(
        club,
        "War and Peace",
        BookStatus::Reading,
        Some(date(6, 1)),
        Some(date(6, 30)),
    );
    store.add_book(
        club,
        "Emma",
        BookStatus::Finished,
        Some(date(4, 1)),
        Some(date(4, 28)),
    );
    store.add_voting(date(6, 5), date(6, 15));

    Dispatcher::new(Ports::from_store(store), &Settings::default()).with_clock(move || today)
}

async fn command(dispatcher: &Dispatcher, command: Command) -> Reply {
    let event = InboundEvent::Command {
        chat_id: CHAT,
        user_id: VoterId(1),
        command,
    };
    dispatcher.handle(event).await.unwrap().expect("commands always answer")
}

async fn say(dispatcher: &Dispatcher, voter: i64, text: &str) -> String {
    let event = InboundEvent::FreeText {
        chat_id: CHAT,
        user_id: VoterId(voter),
        text: text.to_string(),
    };
    dispatcher.handle(event).await.unwrap().expect("free text always answers").text
}

async fn press(dispatcher: &Dispatcher, data: &str) -> Option<Reply> {
    let event = InboundEvent::CallbackQuery {
        chat_id: CHAT,
        user_id: VoterId(1),
        data: data.to_string(),
    };
    dispatcher.handle(event).await.unwrap()
}

#[tokio::test]
async fn vote_browser_numbers_books_across_pages() {
    let dispatcher = club(date(6, 10));

    let first = command(&dispatcher, Command::Vote).await;
    assert_eq!(first.mode, ReplyMode::Send);
    assert!(first.text.starts_with("Fiction\n\n1. Dune\n2. Solaris\n"), "{}", first.text);

    let second = press(&dispatcher, "vote_1").await.unwrap();
    assert_eq!(second.mode, ReplyMode::Edit);
    assert!(
        second.text.starts_with("Science\n\n3. Cosmos\n4. The Selfish Gene\n"),
        "{}",
        second.text
    );
    let keys: Vec<&str> = second.keyboard.as_ref().unwrap().rows[0]
        .iter()
        .map(|b| b.data.as_str())
        .collect();
    assert_eq!(keys[0], "vote_0");
    assert_eq!(keys[2], "vote_0");

    // Next from the last page wraps to the first.
    let wrapped = press(&dispatcher, keys[2]).await.unwrap();
    assert!(wrapped.text.starts_with("Fiction\n\n1. Dune"));
}

#[tokio::test]
async fn catalog_browser_shows_every_book_unnumbered() {
    let dispatcher = club(date(6, 10));

    let reply = command(&dispatcher, Command::AllBooks).await;
    assert_eq!(reply.text, "Fiction\n\n• Dune\n• Solaris");
    let last = press(&dispatcher, "all_books_2").await.unwrap();
    assert_eq!(last.text, "Club shelf\n\n• War and Peace\n• Emma");
}

#[tokio::test]
async fn stale_and_foreign_buttons_are_ignored() {
    let dispatcher = club(date(6, 10));

    assert_eq!(press(&dispatcher, "vote_7").await, None);
    assert_eq!(press(&dispatcher, "vote_").await, None);
    assert_eq!(press(&dispatcher, "vote_x").await, None);
    assert_eq!(press(&dispatcher, " ").await, None);
    assert_eq!(press(&dispatcher, "something_else_1").await, None);
}

#[tokio::test]
async fn ballots_are_checked_before_they_count() {
    let dispatcher = club(date(6, 10));

    let short = say(&dispatcher, 1, "1 2").await;
    assert!(short.starts_with("Send exactly 3 different book numbers"), "{short}");

    let repeated = say(&dispatcher, 1, "2, 2 and 3").await;
    assert!(repeated.starts_with("Send exactly 3"), "{repeated}");

    // 5 is the book in progress; it is not on the voting list.
    let unknown = say(&dispatcher, 1, "1 5 9").await;
    assert!(unknown.contains(": 5, 9."), "{unknown}");

    let accepted = say(&dispatcher, 1, "I pick 4, 1 and 03").await;
    assert_eq!(
        accepted,
        "Your vote is saved, 3 books:\n\n1. The Selfish Gene\n2. Dune\n3. Cosmos\n\n\
         Send another vote before the voting closes to change it."
    );
}

#[tokio::test]
async fn results_rank_by_score_then_catalog_id() {
    let dispatcher = club(date(6, 10));

    assert_eq!(
        command(&dispatcher, Command::VoteResults).await.text,
        "Nobody has voted yet."
    );

    say(&dispatcher, 1, "1 2 3").await;
    say(&dispatcher, 2, "2 3 1").await;
    // A second ballot replaces the first one.
    say(&dispatcher, 1, "4 3 2").await;

    let results = command(&dispatcher, Command::VoteResults).await.text;
    assert_eq!(
        results,
        "Voting from 05.06.2024 to 15.06.2024. Leaders:\n\n\
         1. Solaris. Score: 2\n\
         2. Cosmos. Score: 2\n\
         3. Dune. Score: 1\n\
         4. The Selfish Gene. Score: 1"
    );
}

#[tokio::test]
async fn closed_voting_rejects_ballots_but_keeps_results() {
    let during = club(date(6, 15));
    say(&during, 1, "1 2 3").await;
    let results = command(&during, Command::VoteResults).await.text;
    assert!(results.contains("1. Dune. Score: 1"), "{results}");

    let before = club(date(6, 4));
    assert_eq!(
        command(&before, Command::Vote).await.text,
        "There is no voting right now. Wait for the next one!"
    );
    assert_eq!(
        say(&before, 1, "1 2 3").await,
        "There is no voting right now. Wait for the next one!"
    );
    assert_eq!(
        command(&before, Command::VoteResults).await.text,
        "Nobody has voted yet."
    );

    let after = club(date(6, 16));
    assert_eq!(
        command(&after, Command::VoteResults).await.text,
        "Nobody has voted yet."
    );
}

#[tokio::test]
async fn reading_lists_follow_book_status() {
    let dispatcher = club(date(6, 10));

    assert_eq!(
        command(&dispatcher, Command::Now).await.text,
        "Now reading:\n\nWar and Peace (from 01.06.2024 to 30.06.2024)"
    );
    assert_eq!(
        command(&dispatcher, Command::Already).await.text,
        "Books we have read:\n\n1. Emma (read from 01.04.2024 to 28.04.2024)"
    );
}

#[tokio::test]
async fn slash_prefixed_text_is_never_a_ballot() {
    assert_eq!(
        InboundEvent::from_message(CHAT, VoterId(1), "/unknown 1 2 3"),
        None
    );
    assert_eq!(
        InboundEvent::from_message(CHAT, VoterId(1), "/voteresults@club_bot"),
        Some(InboundEvent::Command {
            chat_id: CHAT,
            user_id: VoterId(1),
            command: Command::VoteResults,
        })
    );
}
