//! # Book Club Binary
//!
//! The entry point that assembles the bot based on compile-time features
//! and drives it from the terminal.

use std::sync::Arc;

use chat_adapters::{console, Dispatcher, Ports};
use configs::Settings;
use tokio::io::BufReader;

#[cfg(feature = "db-sqlite")]
use storage_adapters::SqliteStore;

#[cfg(not(feature = "db-sqlite"))]
use storage_adapters::InMemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    configs::telemetry::init(&settings.log);

    // 1. Initialize storage
    #[cfg(feature = "db-sqlite")]
    let ports = {
        let store = SqliteStore::connect(&settings.database.url, settings.database.max_connections).await?;
        tracing::info!(url = %settings.database.url, "using sqlite storage");
        Ports::from_store(Arc::new(store))
    };

    #[cfg(not(feature = "db-sqlite"))]
    let ports = {
        tracing::warn!("no database feature enabled, data lives in memory");
        Ports::from_store(Arc::new(InMemoryStore::new()))
    };

    // 2. Wire the engine
    let dispatcher = Dispatcher::new(ports, &settings);

    tracing::info!(
        ballot_size = settings.voting.ballot_size,
        "book club bot ready, reading updates from stdin"
    );

    // 3. Serve updates until stdin closes
    console::run(
        &dispatcher,
        &settings.console,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
}
