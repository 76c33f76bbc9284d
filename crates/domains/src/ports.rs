//! # Core Traits (Ports)
//!
//! Any storage adapter must implement these traits to be used by the bot.
//! Every method is a suspension point; the core keeps no state between calls.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::{Ballot, CatalogFilter, Category, Voting, VotingId};

/// Read access to the catalog.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Categories in display order, each holding only the books admitted by
    /// `filter` in their in-category order. Categories left empty are omitted.
    async fn categories(&self, filter: CatalogFilter) -> anyhow::Result<Vec<Category>>;
}

/// Read access to voting rounds. Status is evaluated against `today`.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait VotingRepository: Send + Sync {
    /// The voting whose window contains `today`, if any.
    async fn active_voting(&self, today: NaiveDate) -> anyhow::Result<Option<Voting>>;

    /// The most recent voting that has started on or before `today`.
    async fn latest_voting(&self, today: NaiveDate) -> anyhow::Result<Option<Voting>>;

    async fn voting(&self, id: VotingId, today: NaiveDate) -> anyhow::Result<Option<Voting>>;
}

/// Ballot persistence contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait VoteStore: Send + Sync {
    /// Inserts or replaces the ballot keyed by `(voter_id, voting_id)`.
    async fn save(&self, ballot: Ballot) -> anyhow::Result<()>;

    /// Every ballot of a voting round, at most one per voter.
    async fn ballots(&self, voting_id: VotingId) -> anyhow::Result<Vec<Ballot>>;
}
