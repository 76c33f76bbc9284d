//! Cyclic navigation over category pages.

use domains::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Previous,
    Next,
}

/// Moves one page from `current` in a ring of `total` pages.
///
/// A stale `current` (the catalog shrank since the page was rendered) is
/// folded back into range first, so the result is always in `[0, total)`.
pub fn wrap(current: usize, total: usize, step: Step) -> DomainResult<usize> {
    if total == 0 {
        return Err(DomainError::EmptyCollection);
    }
    let current = current % total;
    Ok(match step {
        Step::Previous if current == 0 => total - 1,
        Step::Previous => current - 1,
        Step::Next if current == total - 1 => 0,
        Step::Next => current + 1,
    })
}

/// Neighbouring page indexes around the displayed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    pub current: usize,
    pub total: usize,
    pub previous: usize,
    pub next: usize,
}

impl Pager {
    pub fn new(current: usize, total: usize) -> DomainResult<Self> {
        if current >= total && total > 0 {
            return Err(DomainError::OutOfRangePage { index: current, total });
        }
        Ok(Self {
            current,
            total,
            previous: wrap(current, total, Step::Previous)?,
            next: wrap(current, total, Step::Next)?,
        })
    }

    /// One-based position, e.g. `2/5`.
    pub fn label(&self) -> String {
        format!("{}/{}", self.current + 1, self.total)
    }
}
