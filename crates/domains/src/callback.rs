//! # Pagination callback tokens
//!
//! A browser button carries `"<prefix><page>"`. The prefix tells the two
//! browsers apart; the page is the zero-based index of a category page.

use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use crate::models::CatalogFilter;

/// The two cyclic catalog browsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Browser {
    /// Every category, unnumbered.
    AllBooks,
    /// Books eligible for voting, numbered globally.
    VoteBooks,
}

impl Browser {
    pub fn filter(&self) -> CatalogFilter {
        match self {
            Browser::AllBooks => CatalogFilter::All,
            Browser::VoteBooks => CatalogFilter::VOTABLE,
        }
    }

    pub fn is_numbered(&self) -> bool {
        matches!(self, Browser::VoteBooks)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackPrefixes {
    pub all_books: String,
    pub vote_books: String,
}

impl Default for CallbackPrefixes {
    fn default() -> Self {
        Self {
            all_books: "all_books_".to_string(),
            vote_books: "vote_".to_string(),
        }
    }
}

impl CallbackPrefixes {
    pub fn prefix(&self, browser: Browser) -> &str {
        match browser {
            Browser::AllBooks => &self.all_books,
            Browser::VoteBooks => &self.vote_books,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallbackToken {
    pub browser: Browser,
    pub page: usize,
}

impl CallbackToken {
    pub fn new(browser: Browser, page: usize) -> Self {
        Self { browser, page }
    }

    pub fn encode(&self, prefixes: &CallbackPrefixes) -> String {
        format!("{}{}", prefixes.prefix(self.browser), self.page)
    }

    /// Parses button data. The suffix must be a non-empty run of ASCII digits
    /// that fits a page index; range against the live catalog is checked by
    /// the caller.
    pub fn decode(data: &str, prefixes: &CallbackPrefixes) -> DomainResult<Self> {
        let mut candidates = [
            (Browser::AllBooks, prefixes.all_books.as_str()),
            (Browser::VoteBooks, prefixes.vote_books.as_str()),
        ];
        // Longest prefix first so nested prefixes stay unambiguous.
        candidates.sort_by_key(|(_, prefix)| std::cmp::Reverse(prefix.len()));

        let malformed = || DomainError::MalformedCallback(data.to_string());
        let (browser, suffix) = candidates
            .iter()
            .find_map(|(browser, prefix)| data.strip_prefix(prefix).map(|rest| (*browser, rest)))
            .ok_or_else(malformed)?;

        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let page = suffix.parse::<usize>().map_err(|_| malformed())?;
        Ok(Self { browser, page })
    }
}
