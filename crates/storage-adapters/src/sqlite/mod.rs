//! # SqliteStore
//!
//! This module implements the data mapping between the SQLite relational
//! model and the `domains` models. Dates are stored as ISO-8601 TEXT, so
//! window comparisons run directly in SQL.

mod schema;

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use domains::{
    Ballot, Book, BookId, BookRepository, BookStatus, CatalogFilter, Category, CategoryId, VoteStore,
    VoterId, Voting, VotingId, VotingRepository, VotingStatus,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use crate::catalog::assemble;

const BOOK_COLUMNS: &str = "id, name, category_id, status, read_start, read_finish";

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `url` and applies the schema.
    ///
    /// In-memory databases are private to one connection, so the pool is
    /// pinned to a single connection that is never recycled.
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(max_connections.max(1))
                .connect_with(options)
                .await?
        };

        let store = Self { pool };
        store.migrate().await?;
        tracing::debug!(url, "sqlite store ready");
        Ok(store)
    }

    async fn migrate(&self) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        for statement in schema::STATEMENTS {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Appends a category after the existing ones.
    pub async fn add_category(&self, name: &str) -> anyhow::Result<CategoryId> {
        let result = sqlx::query(
            "INSERT INTO book_category (name, ordering)
             VALUES (?, (SELECT COALESCE(MAX(ordering), 0) + 1 FROM book_category))",
        )
        .bind(name)
        .execute(&self.pool)
        .await?;
        Ok(CategoryId(result.last_insert_rowid()))
    }

    /// Appends a book at the end of `category`.
    pub async fn add_book(
        &self,
        category: CategoryId,
        name: &str,
        status: BookStatus,
        read_start: Option<NaiveDate>,
        read_finish: Option<NaiveDate>,
    ) -> anyhow::Result<BookId> {
        let result = sqlx::query(
            "INSERT INTO book (name, category_id, ordering, status, read_start, read_finish)
             VALUES (?, ?, (SELECT COALESCE(MAX(ordering), 0) + 1 FROM book WHERE category_id = ?), ?, ?, ?)",
        )
        .bind(name)
        .bind(category.0)
        .bind(category.0)
        .bind(status.as_str())
        .bind(read_start)
        .bind(read_finish)
        .execute(&self.pool)
        .await?;
        Ok(BookId(result.last_insert_rowid()))
    }

    pub async fn add_voting(&self, start: NaiveDate, finish: NaiveDate) -> anyhow::Result<VotingId> {
        let result = sqlx::query("INSERT INTO voting (voting_start, voting_finish) VALUES (?, ?)")
            .bind(start)
            .bind(finish)
            .execute(&self.pool)
            .await?;
        Ok(VotingId(result.last_insert_rowid()))
    }

    async fn all_books(&self) -> anyhow::Result<Vec<Book>> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM book ORDER BY id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(book_from_row).collect()
    }
}

fn category_from_row(row: &SqliteRow) -> anyhow::Result<(CategoryId, String)> {
    Ok((CategoryId(row.try_get("id")?), row.try_get("name")?))
}

fn book_from_row(row: &SqliteRow) -> anyhow::Result<Book> {
    let status: String = row.try_get("status")?;
    Ok(Book {
        id: BookId(row.try_get("id")?),
        name: row.try_get("name")?,
        category_id: CategoryId(row.try_get("category_id")?),
        status: BookStatus::from_str(&status).map_err(anyhow::Error::msg)?,
        read_start: row.try_get("read_start")?,
        read_finish: row.try_get("read_finish")?,
    })
}

fn voting_from_row(row: &SqliteRow, today: NaiveDate) -> anyhow::Result<Voting> {
    let voting_start: NaiveDate = row.try_get("voting_start")?;
    let voting_finish: NaiveDate = row.try_get("voting_finish")?;
    Ok(Voting {
        id: VotingId(row.try_get("id")?),
        voting_start,
        voting_finish,
        status: VotingStatus::on(voting_start, voting_finish, today),
    })
}

#[async_trait]
impl BookRepository for SqliteStore {
    async fn categories(&self, filter: CatalogFilter) -> anyhow::Result<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name FROM book_category ORDER BY ordering, id")
            .fetch_all(&self.pool)
            .await?;
        let categories = rows
            .iter()
            .map(category_from_row)
            .collect::<anyhow::Result<Vec<_>>>()?;

        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM book
             JOIN (SELECT id AS c_id, ordering AS c_ordering FROM book_category) ON c_id = category_id
             ORDER BY c_ordering, category_id, ordering, id"
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        let books = rows
            .iter()
            .map(book_from_row)
            .collect::<anyhow::Result<Vec<Book>>>()?;

        Ok(assemble(categories, books, filter))
    }
}

#[async_trait]
impl VotingRepository for SqliteStore {
    async fn active_voting(&self, today: NaiveDate) -> anyhow::Result<Option<Voting>> {
        let row = sqlx::query(
            "SELECT id, voting_start, voting_finish FROM voting
             WHERE voting_start <= ? AND voting_finish >= ?
             ORDER BY voting_start DESC, id DESC LIMIT 1",
        )
        .bind(today)
        .bind(today)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|row| voting_from_row(&row, today)).transpose()
    }

    async fn latest_voting(&self, today: NaiveDate) -> anyhow::Result<Option<Voting>> {
        let row = sqlx::query(
            "SELECT id, voting_start, voting_finish FROM voting
             WHERE voting_start <= ?
             ORDER BY voting_start DESC, id DESC LIMIT 1",
        )
        .bind(today)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|row| voting_from_row(&row, today)).transpose()
    }

    async fn voting(&self, id: VotingId, today: NaiveDate) -> anyhow::Result<Option<Voting>> {
        let row = sqlx::query("SELECT id, voting_start, voting_finish FROM voting WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| voting_from_row(&row, today)).transpose()
    }
}

#[async_trait]
impl VoteStore for SqliteStore {
    /// Single-statement upsert: concurrent casts by the same voter leave
    /// exactly one row, whichever write lands last.
    async fn save(&self, ballot: Ballot) -> anyhow::Result<()> {
        let book_ids: Vec<i64> = ballot.books.iter().map(|b| b.id.0).collect();
        sqlx::query(
            "INSERT INTO vote (voting_id, voter_id, book_ids, cast_at) VALUES (?, ?, ?, ?)
             ON CONFLICT (voting_id, voter_id)
             DO UPDATE SET book_ids = excluded.book_ids, cast_at = excluded.cast_at",
        )
        .bind(ballot.voting_id.0)
        .bind(ballot.voter_id.0)
        .bind(serde_json::to_string(&book_ids)?)
        .bind(ballot.cast_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn ballots(&self, voting_id: VotingId) -> anyhow::Result<Vec<Ballot>> {
        let rows = sqlx::query(
            "SELECT voter_id, book_ids, cast_at FROM vote WHERE voting_id = ? ORDER BY cast_at, voter_id",
        )
        .bind(voting_id.0)
        .fetch_all(&self.pool)
        .await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let books: HashMap<BookId, Book> = self
            .all_books()
            .await?
            .into_iter()
            .map(|book| (book.id, book))
            .collect();

        rows.iter()
            .map(|row| -> anyhow::Result<Ballot> {
                let voter_id = VoterId(row.try_get("voter_id")?);
                let ids: Vec<i64> = serde_json::from_str(&row.try_get::<String, _>("book_ids")?)?;
                let cast_at: DateTime<Utc> = row.try_get("cast_at")?;
                let (found, missing): (Vec<_>, Vec<_>) = ids
                    .into_iter()
                    .map(|id| books.get(&BookId(id)).cloned().ok_or(id))
                    .partition(Result::is_ok);
                if !missing.is_empty() {
                    let missing: Vec<i64> = missing.into_iter().filter_map(Result::err).collect();
                    // The remaining picks still count; the ballot is short by `missing`.
                    tracing::error!(
                        voting = %voting_id,
                        voter = %voter_id,
                        ?missing,
                        "ballot names books that no longer exist"
                    );
                }
                let books = found.into_iter().filter_map(Result::ok).collect();
                Ok(Ballot {
                    voter_id,
                    voting_id,
                    books,
                    cast_at,
                })
            })
            .collect()
    }
}
