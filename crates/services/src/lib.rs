//! # services
//!
//! The voting and catalog-pagination engine. Everything here talks to
//! storage only through the `domains` ports and holds no shared state.

pub mod ballot;
pub mod catalog;
pub mod pagination;
pub mod tally;

pub use ballot::{extract_numbers, BallotValidator, BookNumber, VoteService};
pub use catalog::{CatalogIndex, Page, Resolution};
pub use pagination::{wrap, Pager, Step};
pub use tally::{rank, TallyEngine};

#[cfg(test)]
pub(crate) mod fixtures {
    use domains::{Book, BookId, BookStatus, Category, CategoryId};

    pub fn book(id: i64, name: &str, category: i64) -> Book {
        Book {
            id: BookId(id),
            name: name.to_string(),
            category_id: CategoryId(category),
            status: BookStatus::NotStarted,
            read_start: None,
            read_finish: None,
        }
    }

    /// `Fiction: [Dune, Solaris]`, `Science: [Cosmos]`.
    pub fn catalog() -> Vec<Category> {
        vec![
            Category {
                id: CategoryId(1),
                name: "Fiction".to_string(),
                books: vec![book(10, "Dune", 1), book(11, "Solaris", 1)],
            },
            Category {
                id: CategoryId(2),
                name: "Science".to_string(),
                books: vec![book(20, "Cosmos", 2)],
            },
        ]
    }
}
