//! # InMemoryStore
//!
//! Process-local implementation of every port. Ballots live in a `DashMap`
//! keyed by `(voting, voter)`, so a resubmission replaces the entry in place.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use domains::{
    Ballot, Book, BookId, BookRepository, BookStatus, CatalogFilter, Category, CategoryId, VoteStore,
    VoterId, Voting, VotingId, VotingRepository, VotingStatus,
};

use crate::catalog::assemble;

#[derive(Default)]
struct Catalog {
    categories: Vec<(CategoryId, String)>,
    books: Vec<Book>,
}

#[derive(Clone, Copy)]
struct VotingWindow {
    id: VotingId,
    start: NaiveDate,
    finish: NaiveDate,
}

impl VotingWindow {
    fn on(&self, today: NaiveDate) -> Voting {
        Voting {
            id: self.id,
            voting_start: self.start,
            voting_finish: self.finish,
            status: VotingStatus::on(self.start, self.finish, today),
        }
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    catalog: RwLock<Catalog>,
    votings: RwLock<Vec<VotingWindow>>,
    ballots: DashMap<(VotingId, VoterId), Ballot>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a category after the existing ones.
    pub fn add_category(&self, name: &str) -> CategoryId {
        let mut catalog = self.catalog.write().unwrap_or_else(PoisonError::into_inner);
        let id = CategoryId(catalog.categories.len() as i64 + 1);
        catalog.categories.push((id, name.to_string()));
        id
    }

    /// Appends a book at the end of `category`.
    pub fn add_book(
        &self,
        category: CategoryId,
        name: &str,
        status: BookStatus,
        read_start: Option<NaiveDate>,
        read_finish: Option<NaiveDate>,
    ) -> Book {
        let mut catalog = self.catalog.write().unwrap_or_else(PoisonError::into_inner);
        let book = Book {
            id: BookId(catalog.books.len() as i64 + 1),
            name: name.to_string(),
            category_id: category,
            status,
            read_start,
            read_finish,
        };
        catalog.books.push(book.clone());
        book
    }

    pub fn add_voting(&self, start: NaiveDate, finish: NaiveDate) -> VotingId {
        let mut votings = self.votings.write().unwrap_or_else(PoisonError::into_inner);
        let id = VotingId(votings.len() as i64 + 1);
        votings.push(VotingWindow { id, start, finish });
        id
    }

    /// Most recently started window matching `keep`, newest id on ties.
    fn newest(&self, keep: impl Fn(&VotingWindow) -> bool) -> Option<VotingWindow> {
        let votings = self.votings.read().unwrap_or_else(PoisonError::into_inner);
        votings
            .iter()
            .filter(|w| keep(w))
            .max_by_key(|w| (w.start, w.id))
            .copied()
    }
}

#[async_trait]
impl BookRepository for InMemoryStore {
    async fn categories(&self, filter: CatalogFilter) -> anyhow::Result<Vec<Category>> {
        let catalog = self.catalog.read().unwrap_or_else(PoisonError::into_inner);
        // Books sort by category position, then insertion order.
        let mut books = catalog.books.clone();
        books.sort_by_key(|b| {
            catalog
                .categories
                .iter()
                .position(|(id, _)| *id == b.category_id)
        });
        Ok(assemble(catalog.categories.clone(), books, filter))
    }
}

#[async_trait]
impl VotingRepository for InMemoryStore {
    async fn active_voting(&self, today: NaiveDate) -> anyhow::Result<Option<Voting>> {
        Ok(self
            .newest(|w| w.start <= today && today <= w.finish)
            .map(|w| w.on(today)))
    }

    async fn latest_voting(&self, today: NaiveDate) -> anyhow::Result<Option<Voting>> {
        Ok(self.newest(|w| w.start <= today).map(|w| w.on(today)))
    }

    async fn voting(&self, id: VotingId, today: NaiveDate) -> anyhow::Result<Option<Voting>> {
        Ok(self.newest(|w| w.id == id).map(|w| w.on(today)))
    }
}

#[async_trait]
impl VoteStore for InMemoryStore {
    async fn save(&self, ballot: Ballot) -> anyhow::Result<()> {
        self.ballots.insert((ballot.voting_id, ballot.voter_id), ballot);
        Ok(())
    }

    async fn ballots(&self, voting_id: VotingId) -> anyhow::Result<Vec<Ballot>> {
        let mut ballots: Vec<Ballot> = self
            .ballots
            .iter()
            .filter(|entry| entry.key().0 == voting_id)
            .map(|entry| entry.value().clone())
            .collect();
        ballots.sort_by_key(|b| (b.cast_at, b.voter_id));
        Ok(ballots)
    }
}
