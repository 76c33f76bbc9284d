//! Port contract checks shared by every store implementation.
//!
//! Each store is seeded with the same catalog:
//! Fiction [Dune, Solaris], Science [Cosmos], Empty [], Club [Emma (reading)],
//! and one voting from June 5 to June 15 2024.

#![allow(dead_code)]

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use domains::{
    Ballot, Book, BookRepository, BookStatus, CatalogFilter, VoteStore, VoterId, VotingId,
    VotingRepository, VotingStatus,
};

pub fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap()
}

pub async fn catalog_contract<S: BookRepository>(store: &S) {
    let all = store.categories(CatalogFilter::All).await.unwrap();
    let names: Vec<&str> = all.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Fiction", "Science", "Club"], "empty categories are omitted");
    let fiction: Vec<&str> = all[0].books.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(fiction, ["Dune", "Solaris"]);

    let votable = store.categories(CatalogFilter::VOTABLE).await.unwrap();
    assert_eq!(votable.len(), 2);
    assert!(votable
        .iter()
        .flat_map(|c| &c.books)
        .all(|b| b.status == BookStatus::NotStarted));

    let reading = store
        .categories(CatalogFilter::Status(BookStatus::Reading))
        .await
        .unwrap();
    assert_eq!(reading.len(), 1);
    assert_eq!(reading[0].books[0].name, "Emma");
    assert_eq!(reading[0].books[0].read_start, Some(date(6, 1)));

    assert!(store
        .categories(CatalogFilter::Status(BookStatus::Finished))
        .await
        .unwrap()
        .is_empty());
}

pub async fn voting_contract<S: VotingRepository>(store: &S, id: VotingId) {
    assert!(store.active_voting(date(6, 4)).await.unwrap().is_none());
    for day in [5, 10, 15] {
        let voting = store.active_voting(date(6, day)).await.unwrap().unwrap();
        assert_eq!(voting.id, id);
        assert_eq!(voting.status, VotingStatus::Active);
    }
    assert!(store.active_voting(date(6, 16)).await.unwrap().is_none());

    let latest = store.latest_voting(date(6, 20)).await.unwrap().unwrap();
    assert_eq!(latest.id, id);
    assert_eq!(latest.status, VotingStatus::Closed);
    assert!(store.latest_voting(date(6, 1)).await.unwrap().is_none());

    let by_id = store.voting(id, date(6, 10)).await.unwrap().unwrap();
    assert_eq!((by_id.voting_start, by_id.voting_finish), (date(6, 5), date(6, 15)));
    assert!(store.voting(VotingId(id.0 + 100), date(6, 10)).await.unwrap().is_none());
}

/// `books` must hold at least three votable books.
pub async fn vote_store_contract<S: VoteStore>(store: &S, voting: VotingId, books: &[Book]) {
    let at = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
    let ballot = |voter: i64, picks: &[usize], at| Ballot {
        voter_id: VoterId(voter),
        voting_id: voting,
        books: picks.iter().map(|&i| books[i].clone()).collect(),
        cast_at: at,
    };

    assert!(store.ballots(voting).await.unwrap().is_empty());

    store.save(ballot(7, &[0, 1], at)).await.unwrap();
    store.save(ballot(3, &[1, 2], at + Duration::minutes(1))).await.unwrap();
    store.save(ballot(7, &[2, 0], at + Duration::minutes(2))).await.unwrap();

    let saved = store.ballots(voting).await.unwrap();
    assert_eq!(saved.len(), 2, "one ballot per voter");
    assert_eq!(saved[0].voter_id, VoterId(3));
    assert_eq!(saved[1].voter_id, VoterId(7));
    let replaced: Vec<&str> = saved[1].books.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(replaced, [books[2].name.as_str(), books[0].name.as_str()]);

    assert!(store.ballots(VotingId(voting.0 + 100)).await.unwrap().is_empty());
}
