//! # Ballot intake
//!
//! Turns a free-text message into a validated ballot. Stages run in a fixed
//! order and stop at the first failure: active voting, number extraction,
//! cardinality, resolution against the votable catalog.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use domains::{
    Ballot, Book, BookRepository, CatalogFilter, DomainError, DomainResult, VoteStore, VoterId,
    Voting,
};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::catalog::CatalogIndex;

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("static regex"));
static DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d$").expect("static regex"));

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0; 4];
    DIGIT.is_match(c.encode_utf8(&mut buf))
}

/// Value of a Unicode decimal digit. Every script encodes its digits as a
/// contiguous 0..=9 run, and adjacent runs are whole, so the value is the
/// distance to the start of the surrounding digit block modulo ten.
fn decimal_value(c: char) -> u8 {
    if let Some(value) = c.to_digit(10) {
        return value as u8;
    }
    let mut steps = 0u32;
    let mut code = c as u32;
    while let Some(previous) = code.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(previous) {
            break;
        }
        steps += 1;
        code -= 1;
    }
    (steps % 10) as u8
}

/// Rewrites a run of decimal digits from any script with ASCII digits.
fn ascii_digits(run: &str) -> String {
    run.chars().map(|c| char::from(b'0' + decimal_value(c))).collect()
}

/// A number typed by a voter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BookNumber {
    Index(usize),
    /// Too large to be an index; kept so it counts towards cardinality and
    /// is reported back as unresolved. Holds the digits without leading zeros.
    Overflow(String),
}

impl BookNumber {
    fn from_digits(digits: &str) -> Self {
        let trimmed = digits.trim_start_matches('0');
        let normalized = if trimmed.is_empty() { "0" } else { trimmed };
        normalized
            .parse()
            .map(BookNumber::Index)
            .unwrap_or_else(|_| BookNumber::Overflow(normalized.to_string()))
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            BookNumber::Index(n) => Some(*n),
            BookNumber::Overflow(_) => None,
        }
    }
}

impl fmt::Display for BookNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookNumber::Index(n) => n.fmt(f),
            BookNumber::Overflow(digits) => f.write_str(digits),
        }
    }
}

/// Every maximal run of decimal digits, in order of appearance. Digits of
/// any script count (`٣`, `３`). Everything else in the text is ignored.
pub fn extract_numbers(text: &str) -> Vec<BookNumber> {
    DIGIT_RUN
        .find_iter(text)
        .map(|m| BookNumber::from_digits(&ascii_digits(m.as_str())))
        .collect()
}

/// Drops repeats, keeping each number at its first occurrence.
fn distinct_in_order(numbers: Vec<BookNumber>) -> Vec<BookNumber> {
    let mut seen = HashSet::new();
    numbers.into_iter().filter(|n| seen.insert(n.clone())).collect()
}

pub struct BallotValidator {
    books: Arc<dyn BookRepository>,
    ballot_size: usize,
}

impl BallotValidator {
    pub fn new(books: Arc<dyn BookRepository>, ballot_size: usize) -> Self {
        Self { books, ballot_size }
    }

    /// Returns the chosen books in the order their numbers first appear in
    /// `text`. The catalog is only read once the cardinality check passed.
    pub async fn validate(&self, voting: Option<&Voting>, text: &str) -> DomainResult<Vec<Book>> {
        if !voting.is_some_and(Voting::is_active) {
            return Err(DomainError::NoActiveVoting);
        }

        let numbers = distinct_in_order(extract_numbers(text));
        if numbers.len() != self.ballot_size {
            return Err(DomainError::WrongCardinality {
                expected: self.ballot_size,
                found: numbers.len(),
            });
        }

        let catalog = CatalogIndex::load(self.books.as_ref(), CatalogFilter::VOTABLE).await?;
        let resolution = catalog.resolve_numbers(&numbers);
        if !resolution.matched {
            let reported = if resolution.unresolved.is_empty() {
                &numbers
            } else {
                &resolution.unresolved
            };
            return Err(DomainError::UnresolvedBooks(
                reported.iter().map(ToString::to_string).collect(),
            ));
        }
        Ok(resolution.books)
    }
}

/// Validates and persists ballots.
pub struct VoteService {
    validator: BallotValidator,
    votes: Arc<dyn VoteStore>,
}

impl VoteService {
    pub fn new(validator: BallotValidator, votes: Arc<dyn VoteStore>) -> Self {
        Self { validator, votes }
    }

    /// Saves the voter's ballot, replacing any earlier one for this voting.
    /// Nothing is written when validation fails.
    pub async fn cast(
        &self,
        voting: Option<&Voting>,
        voter_id: VoterId,
        text: &str,
        cast_at: DateTime<Utc>,
    ) -> DomainResult<Ballot> {
        let books = self.validator.validate(voting, text).await?;
        let voting = voting.ok_or(DomainError::NoActiveVoting)?;
        let ballot = Ballot {
            voter_id,
            voting_id: voting.id,
            books,
            cast_at,
        };
        self.votes.save(ballot.clone()).await?;
        tracing::info!(voter = %voter_id, voting = %voting.id, "ballot saved");
        Ok(ballot)
    }
}
