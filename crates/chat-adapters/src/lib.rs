//! # chat-adapters
//!
//! The chat boundary of the book club bot: the dispatcher that routes
//! inbound events into the engine, the text and keyboard renderers, and a
//! line-oriented console transport.

pub mod console;
pub mod dispatcher;
pub mod render;

pub use dispatcher::{Dispatcher, Ports};
pub use render::{Button, Keyboard, Reply, ReplyMode};
