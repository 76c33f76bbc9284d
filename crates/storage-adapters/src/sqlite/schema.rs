//! Tables, created idempotently on connect.

pub(crate) const STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS book_category (
        id       INTEGER PRIMARY KEY AUTOINCREMENT,
        name     TEXT    NOT NULL UNIQUE,
        ordering INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS book (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT    NOT NULL,
        category_id INTEGER NOT NULL REFERENCES book_category (id),
        ordering    INTEGER NOT NULL,
        status      TEXT    NOT NULL DEFAULT 'not_started'
                    CHECK (status IN ('not_started', 'reading', 'finished')),
        read_start  TEXT,
        read_finish TEXT
    )",
    "CREATE TABLE IF NOT EXISTS voting (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        voting_start  TEXT NOT NULL,
        voting_finish TEXT NOT NULL,
        CHECK (voting_start <= voting_finish)
    )",
    // One row per (voting, voter); `book_ids` is a JSON array in ballot order.
    "CREATE TABLE IF NOT EXISTS vote (
        voting_id INTEGER NOT NULL REFERENCES voting (id),
        voter_id  INTEGER NOT NULL,
        book_ids  TEXT    NOT NULL,
        cast_at   TEXT    NOT NULL,
        PRIMARY KEY (voting_id, voter_id)
    )",
    "DROP INDEX IF EXISTS book_category_ordering",
    "CREATE INDEX IF NOT EXISTS book_ordering ON book (category_id, ordering)",
];
