//! Seeds a demo catalog and a running voting into the configured database.
//!
//! Meant for a fresh database; running it twice fails on the unique
//! category names.

use chrono::{Duration, Local};
use configs::Settings;
use domains::BookStatus;
use storage_adapters::SqliteStore;

const CATALOG: &[(&str, &[&str])] = &[
    ("Fiction", &["Dune", "Solaris", "The Left Hand of Darkness"]),
    ("Science", &["Cosmos", "The Selfish Gene"]),
    ("Programming", &["Structure and Interpretation of Computer Programs", "The Rust Programming Language"]),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    configs::telemetry::init(&settings.log);

    let store = SqliteStore::connect(&settings.database.url, 1).await?;
    let today = Local::now().date_naive();

    let mut books = 0;
    for (category, titles) in CATALOG {
        let category = store.add_category(category).await?;
        for title in *titles {
            store.add_book(category, title, BookStatus::NotStarted, None, None).await?;
            books += 1;
        }
    }

    let finished = store.add_category("Read together").await?;
    store
        .add_book(
            finished,
            "Pride and Prejudice",
            BookStatus::Finished,
            Some(today - Duration::days(60)),
            Some(today - Duration::days(31)),
        )
        .await?;
    store
        .add_book(
            finished,
            "The Master and Margarita",
            BookStatus::Reading,
            Some(today - Duration::days(30)),
            Some(today + Duration::days(10)),
        )
        .await?;

    let voting = store
        .add_voting(today - Duration::days(1), today + Duration::days(6))
        .await?;

    tracing::info!(books = books + 2, voting = %voting, url = %settings.database.url, "database seeded");
    Ok(())
}
