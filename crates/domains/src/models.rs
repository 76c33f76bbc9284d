//! # Domain Models
//!
//! These structs represent the core entities of the reading club:
//! the catalog (books grouped into categories), voting rounds and ballots.
//! Identifiers are the integer keys handed out by the storage layer.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_type!(
    /// Catalog id of a book. Also the tie-breaker of the leaderboard.
    BookId
);
id_type!(CategoryId);
id_type!(VotingId);
id_type!(
    /// Chat-platform id of the member casting a ballot.
    VoterId
);
id_type!(ChatId);

/// Reading status of a book. Maintained by whoever curates the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookStatus {
    NotStarted,
    Reading,
    Finished,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::NotStarted => "not_started",
            BookStatus::Reading => "reading",
            BookStatus::Finished => "finished",
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(BookStatus::NotStarted),
            "reading" => Ok(BookStatus::Reading),
            "finished" => Ok(BookStatus::Finished),
            other => Err(format!("unknown book status `{other}`")),
        }
    }
}

/// A single catalog entry. Read-only for the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub name: String,
    pub category_id: CategoryId,
    pub status: BookStatus,
    pub read_start: Option<NaiveDate>,
    pub read_finish: Option<NaiveDate>,
}

/// An ordered group of books. Categories are the pages of the browsers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub books: Vec<Book>,
}

/// Selects which books of the catalog take part in a browsing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogFilter {
    All,
    Status(BookStatus),
}

impl CatalogFilter {
    /// Books eligible for a ballot.
    pub const VOTABLE: CatalogFilter = CatalogFilter::Status(BookStatus::NotStarted);

    pub fn admits(&self, book: &Book) -> bool {
        match self {
            CatalogFilter::All => true,
            CatalogFilter::Status(status) => book.status == *status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VotingStatus {
    Active,
    Closed,
}

impl VotingStatus {
    /// A voting is active on every day of its window, both ends included.
    pub fn on(voting_start: NaiveDate, voting_finish: NaiveDate, today: NaiveDate) -> Self {
        if voting_start <= today && today <= voting_finish {
            VotingStatus::Active
        } else {
            VotingStatus::Closed
        }
    }
}

/// A voting round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voting {
    pub id: VotingId,
    pub voting_start: NaiveDate,
    pub voting_finish: NaiveDate,
    pub status: VotingStatus,
}

impl Voting {
    pub fn is_active(&self) -> bool {
        self.status == VotingStatus::Active
    }
}

/// Books per ballot unless configured otherwise.
pub const DEFAULT_BALLOT_SIZE: usize = 3;

/// One member's selection for a voting round.
///
/// Keyed by `(voter_id, voting_id)`; saving again replaces the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub voter_id: VoterId,
    pub voting_id: VotingId,
    /// In the order the voter typed the numbers. Order does not affect scoring.
    pub books: Vec<Book>,
    pub cast_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leader {
    pub book: Book,
    pub score: u32,
}

/// Ranked tally of a voting round. Computed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub voting: Voting,
    pub leaders: Vec<Leader>,
}
