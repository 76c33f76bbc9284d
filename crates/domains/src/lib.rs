//! book-club/crates/domains/src/lib.rs
//!
//! Domain models, port traits and the error taxonomy shared by every crate
//! of the book club bot.

pub mod callback;
pub mod errors;
pub mod events;
pub mod models;
pub mod ports;

// Re-exporting for easier access in other crates
pub use callback::*;
pub use errors::*;
pub use events::*;
pub use models::*;
pub use ports::*;
