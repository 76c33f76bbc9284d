//! # CatalogIndex
//!
//! A snapshot of the filtered catalog with the global 1-based numbering
//! voters use. Book `#n` means the same book on every page for as long as
//! the snapshot lives.

use std::collections::HashSet;

use domains::{Book, BookRepository, CatalogFilter, Category, CategoryId, DomainError, DomainResult};

use crate::ballot::BookNumber;

#[derive(Debug, Clone)]
pub struct CatalogIndex {
    categories: Vec<Category>,
    /// `offsets[k]` is the number of books in categories `0..k`.
    offsets: Vec<usize>,
    total: usize,
}

/// One category page together with its place in the global numbering.
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    pub index: usize,
    pub total_pages: usize,
    pub category: &'a Category,
    /// Books before this page; the first book here is number `start_index + 1`.
    pub start_index: usize,
}

impl<'a> Page<'a> {
    pub fn numbered_books(&self) -> impl Iterator<Item = (usize, &'a Book)> + 'a {
        let start = self.start_index;
        let category: &'a Category = self.category;
        category
            .books
            .iter()
            .enumerate()
            .map(move |(position, book)| (start + position + 1, book))
    }
}

/// Outcome of mapping ballot numbers onto the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Resolved books, in the order the numbers were given.
    pub books: Vec<Book>,
    pub unresolved: Vec<BookNumber>,
    /// Every number resolved, and to pairwise distinct books.
    pub matched: bool,
}

impl CatalogIndex {
    pub fn new(categories: Vec<Category>) -> Self {
        let offsets = categories
            .iter()
            .scan(0usize, |seen, category| {
                let offset = *seen;
                *seen += category.books.len();
                Some(offset)
            })
            .collect();
        let total = categories.iter().map(|c| c.books.len()).sum();
        Self { categories, offsets, total }
    }

    /// Reads a fresh snapshot from storage.
    pub async fn load(repo: &dyn BookRepository, filter: CatalogFilter) -> DomainResult<Self> {
        let categories = repo.categories(filter).await?;
        tracing::debug!(?filter, pages = categories.len(), "catalog loaded");
        Ok(Self::new(categories))
    }

    pub fn page_count(&self) -> usize {
        self.categories.len()
    }

    pub fn page(&self, index: usize) -> DomainResult<Page<'_>> {
        if self.categories.is_empty() {
            return Err(DomainError::EmptyCollection);
        }
        let category = self.categories.get(index).ok_or(DomainError::OutOfRangePage {
            index,
            total: self.categories.len(),
        })?;
        let start_index = self
            .category_start_index(category.id)
            .ok_or(DomainError::OutOfRangePage {
                index,
                total: self.categories.len(),
            })?;
        Ok(Page {
            index,
            total_pages: self.categories.len(),
            category,
            start_index,
        })
    }

    /// Number of books in the categories preceding `target`, or `None` when
    /// `target` is not in the snapshot.
    pub fn category_start_index(&self, target: CategoryId) -> Option<usize> {
        let position = self.categories.iter().position(|c| c.id == target)?;
        self.offsets.get(position).copied()
    }

    /// The book carrying global `number` (1-based).
    pub fn book_at(&self, number: usize) -> Option<&Book> {
        let position = number.checked_sub(1).filter(|p| *p < self.total)?;
        // Last category starting at or before `position`; empty categories
        // share an offset with their successor and are skipped over.
        let page = self.offsets.partition_point(|offset| *offset <= position) - 1;
        self.categories[page].books.get(position - self.offsets[page])
    }

    pub fn resolve_numbers(&self, numbers: &[BookNumber]) -> Resolution {
        let mut books = Vec::with_capacity(numbers.len());
        let mut unresolved = Vec::new();
        let mut seen = HashSet::new();
        let mut distinct = true;

        for number in numbers {
            match number.index().and_then(|n| self.book_at(n)) {
                Some(book) => {
                    distinct &= seen.insert(book.id);
                    books.push(book.clone());
                }
                None => unresolved.push(number.clone()),
            }
        }

        Resolution {
            matched: unresolved.is_empty() && distinct,
            books,
            unresolved,
        }
    }
}
