//! # TallyEngine
//!
//! Aggregates the ballots of a voting round into a ranked leaderboard.
//! Recomputed on every query.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use domains::{Ballot, Book, BookId, DomainResult, Leader, Leaderboard, VoteStore, VotingId, VotingRepository};

/// Scores every book by the number of ballots naming it. Ranked by score
/// descending, then by book id ascending.
pub fn rank(ballots: &[Ballot]) -> Vec<Leader> {
    let mut scores: HashMap<BookId, (Book, u32)> = HashMap::new();
    for ballot in ballots {
        let mut counted = HashSet::new();
        for book in &ballot.books {
            // A book counts once per ballot.
            if !counted.insert(book.id) {
                continue;
            }
            scores
                .entry(book.id)
                .or_insert_with(|| (book.clone(), 0))
                .1 += 1;
        }
    }

    let mut leaders: Vec<Leader> = scores
        .into_values()
        .map(|(book, score)| Leader { book, score })
        .collect();
    leaders.sort_by_key(|leader| (Reverse(leader.score), leader.book.id));
    leaders
}

pub struct TallyEngine {
    votings: Arc<dyn VotingRepository>,
    votes: Arc<dyn VoteStore>,
}

impl TallyEngine {
    pub fn new(votings: Arc<dyn VotingRepository>, votes: Arc<dyn VoteStore>) -> Self {
        Self { votings, votes }
    }

    /// `None` when the voting is unknown or nobody has voted yet.
    pub async fn compute_leaders(
        &self,
        voting_id: VotingId,
        today: NaiveDate,
    ) -> DomainResult<Option<Leaderboard>> {
        let Some(voting) = self.votings.voting(voting_id, today).await? else {
            tracing::debug!(voting = %voting_id, "no such voting");
            return Ok(None);
        };
        let ballots = self.votes.ballots(voting_id).await?;
        if ballots.is_empty() {
            return Ok(None);
        }
        tracing::debug!(voting = %voting_id, ballots = ballots.len(), "tallying");
        Ok(Some(Leaderboard {
            voting,
            leaders: rank(&ballots),
        }))
    }
}
