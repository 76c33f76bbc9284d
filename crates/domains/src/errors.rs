//! # DomainError
//!
//! Centralized error handling for the voting and catalog engine.
//! User-facing rejections are translated into chat messages by the
//! dispatcher; everything else fails the triggering request only.

use thiserror::Error;

/// The primary error type for all core operations.
#[derive(Error, Debug)]
pub enum DomainError {
    /// A ballot arrived while no voting round is running.
    #[error("no voting is running")]
    NoActiveVoting,

    /// The ballot does not contain exactly K distinct numbers.
    #[error("expected exactly {expected} distinct numbers, found {found}")]
    WrongCardinality { expected: usize, found: usize },

    /// Some numbers do not point at an eligible book.
    #[error("numbers do not match eligible books: {}", .0.join(", "))]
    UnresolvedBooks(Vec<String>),

    /// A browser was opened over a catalog without pages.
    #[error("catalog has no pages")]
    EmptyCollection,

    /// A callback referenced a page the catalog no longer has.
    #[error("page {index} is out of range ({total} pages)")]
    OutOfRangePage { index: usize, total: usize },

    /// A callback token that does not follow `<prefix><index>`.
    #[error("malformed callback token `{0}`")]
    MalformedCallback(String),

    /// Infrastructure failure (e.g., database unavailable)
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl DomainError {
    /// Stale or forged button presses. Logged and dropped.
    pub fn is_ignorable(&self) -> bool {
        matches!(
            self,
            DomainError::OutOfRangePage { .. } | DomainError::MalformedCallback(_)
        )
    }
}

/// A specialized Result type for the core.
pub type DomainResult<T> = std::result::Result<T, DomainError>;
