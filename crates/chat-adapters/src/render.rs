//! Text and keyboard rendering for outbound messages.

use chrono::NaiveDate;
use configs::{MessageKey, MessageTemplates};
use domains::{Book, Browser, CallbackPrefixes, CallbackToken, DomainError, Leaderboard};
use services::{Page, Pager};

/// Data of the inert page-label button. Never decodes as a token.
pub const INERT_BUTTON_DATA: &str = " ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyMode {
    /// A new message.
    Send,
    /// Replace the message whose button was pressed.
    Edit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub chat_id: domains::ChatId,
    pub mode: ReplyMode,
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    pub fn send(chat_id: domains::ChatId, text: String) -> Self {
        Self {
            chat_id,
            mode: ReplyMode::Send,
            text,
            keyboard: None,
        }
    }
}

pub struct Renderer {
    templates: MessageTemplates,
    prefixes: CallbackPrefixes,
    date_format: String,
    ballot_size: usize,
}

impl Renderer {
    pub fn new(
        templates: MessageTemplates,
        prefixes: CallbackPrefixes,
        date_format: String,
        ballot_size: usize,
    ) -> Self {
        Self {
            templates,
            prefixes,
            date_format,
            ballot_size,
        }
    }

    pub fn prefixes(&self) -> &CallbackPrefixes {
        &self.prefixes
    }

    pub fn message(&self, key: MessageKey) -> String {
        self.templates.render(key, &[])
    }

    fn date(&self, date: Option<NaiveDate>) -> String {
        date.map(|d| d.format(&self.date_format).to_string())
            .unwrap_or_else(|| "?".to_string())
    }

    /// Category heading followed by its books. The voting browser shows the
    /// global numbers and the ballot prompt.
    pub fn page(&self, page: &Page<'_>, browser: Browser) -> String {
        let mut text = format!("{}\n\n", page.category.name);
        for (number, book) in page.numbered_books() {
            if browser.is_numbered() {
                text.push_str(&format!("{number}. {}\n", book.name));
            } else {
                text.push_str(&format!("• {}\n", book.name));
            }
        }
        if browser.is_numbered() {
            text.push('\n');
            text.push_str(&self.templates.render(
                MessageKey::VotePrompt,
                &[("count", &self.ballot_size.to_string())],
            ));
        }
        text.trim_end().to_string()
    }

    /// `<`, `i/N`, `>`.
    pub fn pager_keyboard(&self, pager: &Pager, browser: Browser) -> Keyboard {
        let token = |page| CallbackToken::new(browser, page).encode(&self.prefixes);
        Keyboard {
            rows: vec![vec![
                Button {
                    label: "<".to_string(),
                    data: token(pager.previous),
                },
                Button {
                    label: pager.label(),
                    data: INERT_BUTTON_DATA.to_string(),
                },
                Button {
                    label: ">".to_string(),
                    data: token(pager.next),
                },
            ]],
        }
    }

    pub fn finished_books(&self, books: &[Book]) -> String {
        if books.is_empty() {
            return self.message(MessageKey::NothingRead);
        }
        let lines: Vec<String> = books
            .iter()
            .enumerate()
            .map(|(i, book)| {
                format!(
                    "{}. {} (read from {} to {})",
                    i + 1,
                    book.name,
                    self.date(book.read_start),
                    self.date(book.read_finish)
                )
            })
            .collect();
        self.templates
            .render(MessageKey::AlreadyRead, &[("books", &lines.join("\n"))])
    }

    /// Unnumbered when exactly one book is in progress.
    pub fn reading_books(&self, books: &[Book]) -> String {
        if books.is_empty() {
            return self.message(MessageKey::NothingReading);
        }
        let just_one = books.len() == 1;
        let lines: Vec<String> = books
            .iter()
            .enumerate()
            .map(|(i, book)| {
                let number = if just_one { String::new() } else { format!("{}. ", i + 1) };
                format!(
                    "{number}{} (from {} to {})",
                    book.name,
                    self.date(book.read_start),
                    self.date(book.read_finish)
                )
            })
            .collect();
        self.templates
            .render(MessageKey::NowReading, &[("books", &lines.join("\n"))])
    }

    pub fn ballot(&self, books: &[Book]) -> String {
        let lines: Vec<String> = books
            .iter()
            .enumerate()
            .map(|(i, book)| format!("{}. {}", i + 1, book.name))
            .collect();
        let count = match books.len() {
            1 => "1 book".to_string(),
            n => format!("{n} books"),
        };
        self.templates.render(
            MessageKey::VoteAccepted,
            &[("books", &lines.join("\n")), ("books_count", &count)],
        )
    }

    pub fn leaderboard(&self, board: &Leaderboard) -> String {
        let lines: Vec<String> = board
            .leaders
            .iter()
            .enumerate()
            .map(|(i, leader)| format!("{}. {}. Score: {}", i + 1, leader.book.name, leader.score))
            .collect();
        self.templates.render(
            MessageKey::VoteResults,
            &[
                ("books", &lines.join("\n")),
                ("voting_start", &self.date(Some(board.voting.voting_start))),
                ("voting_finish", &self.date(Some(board.voting.voting_finish))),
            ],
        )
    }

    /// The message for a rejected ballot, `None` for errors members never see.
    pub fn rejection(&self, err: &DomainError) -> Option<String> {
        match err {
            DomainError::NoActiveVoting => Some(self.message(MessageKey::NoActiveVoting)),
            DomainError::WrongCardinality { expected, .. } => Some(self.templates.render(
                MessageKey::WrongCardinality,
                &[("count", &expected.to_string())],
            )),
            DomainError::UnresolvedBooks(numbers) => Some(self.templates.render(
                MessageKey::UnresolvedBooks,
                &[("numbers", &numbers.join(", "))],
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{BookId, BookStatus, Category, CategoryId, Leader, Voting, VotingId, VotingStatus};
    use services::CatalogIndex;

    fn renderer() -> Renderer {
        Renderer::new(
            MessageTemplates::default(),
            CallbackPrefixes::default(),
            "%d.%m.%Y".to_string(),
            3,
        )
    }

    fn book(id: i64, name: &str) -> Book {
        Book {
            id: BookId(id),
            name: name.to_string(),
            category_id: CategoryId(1),
            status: BookStatus::Reading,
            read_start: NaiveDate::from_ymd_opt(2024, 1, 5),
            read_finish: NaiveDate::from_ymd_opt(2024, 2, 1),
        }
    }

    #[test]
    fn voting_pages_continue_the_numbering() {
        let index = CatalogIndex::new(vec![
            Category {
                id: CategoryId(1),
                name: "Fiction".into(),
                books: vec![book(1, "Dune"), book(2, "Solaris")],
            },
            Category {
                id: CategoryId(2),
                name: "Science".into(),
                books: vec![book(3, "Cosmos")],
            },
        ]);
        let text = renderer().page(&index.page(1).unwrap(), Browser::VoteBooks);
        assert!(text.starts_with("Science\n\n3. Cosmos\n"), "{text}");
        assert!(text.ends_with("Pick 3 books and send their numbers in one message."));

        let plain = renderer().page(&index.page(0).unwrap(), Browser::AllBooks);
        assert_eq!(plain, "Fiction\n\n• Dune\n• Solaris");
    }

    #[test]
    fn keyboard_points_at_neighbours() {
        let keyboard = renderer().pager_keyboard(&Pager::new(0, 3).unwrap(), Browser::AllBooks);
        let row: Vec<(&str, &str)> = keyboard.rows[0]
            .iter()
            .map(|b| (b.label.as_str(), b.data.as_str()))
            .collect();
        assert_eq!(
            row,
            vec![("<", "all_books_2"), ("1/3", INERT_BUTTON_DATA), (">", "all_books_1")]
        );
    }

    #[test]
    fn single_book_in_progress_is_unnumbered() {
        let text = renderer().reading_books(&[book(1, "Dune")]);
        assert_eq!(text, "Now reading:\n\nDune (from 05.01.2024 to 01.02.2024)");
        let two = renderer().reading_books(&[book(1, "Dune"), book(2, "Solaris")]);
        assert!(two.contains("1. Dune") && two.contains("2. Solaris"));
    }

    #[test]
    fn leaderboard_lists_scores() {
        let board = Leaderboard {
            voting: Voting {
                id: VotingId(1),
                voting_start: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                voting_finish: NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
                status: VotingStatus::Closed,
            },
            leaders: vec![
                Leader { book: book(1, "Dune"), score: 2 },
                Leader { book: book(2, "Solaris"), score: 1 },
            ],
        };
        assert_eq!(
            renderer().leaderboard(&board),
            "Voting from 01.03.2024 to 07.03.2024. Leaders:\n\n1. Dune. Score: 2\n2. Solaris. Score: 1"
        );
    }

    #[test]
    fn only_ballot_errors_have_messages() {
        let r = renderer();
        assert!(r.rejection(&DomainError::WrongCardinality { expected: 3, found: 1 }).is_some());
        assert!(r.rejection(&DomainError::EmptyCollection).is_none());
        assert!(r
            .rejection(&DomainError::Storage(anyhow::anyhow!("down")))
            .is_none());
    }
}
