//! # configs
//!
//! Runtime settings of the book club bot. Values are layered, later sources
//! winning: built-in defaults, `config/default.toml`, `config/local.toml`,
//! then `BOOKCLUB__SECTION__KEY` environment variables (a `.env` file is
//! loaded first).

pub mod messages;
pub mod telemetry;

use std::collections::HashMap;

use chrono::format::{Item, StrftimeItems};
use config::{Config, Environment, File, FileFormat};
use domains::{CallbackPrefixes, DEFAULT_BALLOT_SIZE};
use serde::Deserialize;
use thiserror::Error;

pub use messages::{MessageKey, MessageTemplates};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub voting: VotingSettings,
    pub callbacks: CallbackSettings,
    pub display: DisplaySettings,
    pub console: ConsoleSettings,
    pub log: LogSettings,
    /// Per-key overrides of the built-in message templates.
    pub messages: HashMap<MessageKey, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite:book_club.db".to_string(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VotingSettings {
    /// Books per ballot (K).
    pub ballot_size: usize,
}

impl Default for VotingSettings {
    fn default() -> Self {
        Self {
            ballot_size: DEFAULT_BALLOT_SIZE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CallbackSettings {
    pub all_books_prefix: String,
    pub vote_prefix: String,
}

impl Default for CallbackSettings {
    fn default() -> Self {
        let prefixes = CallbackPrefixes::default();
        Self {
            all_books_prefix: prefixes.all_books,
            vote_prefix: prefixes.vote_books,
        }
    }
}

impl CallbackSettings {
    pub fn prefixes(&self) -> CallbackPrefixes {
        CallbackPrefixes {
            all_books: self.all_books_prefix.clone(),
            vote_books: self.vote_prefix.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// `chrono` format string for reading and voting dates.
    pub date_format: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            date_format: "%d.%m.%Y".to_string(),
        }
    }
}

/// Identity used by the console transport for every line it reads.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConsoleSettings {
    pub chat_id: i64,
    pub user_id: i64,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self { chat_id: 1, user_id: 1 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Loads `.env`, the optional config files and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                return Err(ConfigError::Invalid(format!(".env: {err}")));
            }
        }
        let raw = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("BOOKCLUB")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Self::from_config(raw)
    }

    /// Settings from a TOML document over the built-in defaults.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let raw = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?;
        Self::from_config(raw)
    }

    fn from_config(raw: Config) -> Result<Self, ConfigError> {
        let settings: Settings = raw.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.voting.ballot_size == 0 {
            return Err(ConfigError::Invalid("voting.ballot_size must be at least 1".into()));
        }
        let (all, vote) = (&self.callbacks.all_books_prefix, &self.callbacks.vote_prefix);
        if all.is_empty() || vote.is_empty() {
            return Err(ConfigError::Invalid("callback prefixes must not be empty".into()));
        }
        if all == vote {
            return Err(ConfigError::Invalid(format!(
                "callback prefixes must differ, both are `{all}`"
            )));
        }
        if all.ends_with(|c: char| c.is_ascii_digit()) || vote.ends_with(|c: char| c.is_ascii_digit()) {
            return Err(ConfigError::Invalid("callback prefixes must not end in a digit".into()));
        }
        if StrftimeItems::new(&self.display.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::Invalid(format!(
                "display.date_format `{}` is not a valid strftime format",
                self.display.date_format
            )));
        }
        Ok(())
    }

    pub fn message_templates(&self) -> MessageTemplates {
        MessageTemplates::default().with_overrides(self.messages.clone())
    }
}
