//! # Dispatcher
//!
//! Routes inbound events to the engine and turns outcomes into replies.
//! Ballot rejections become messages; stale button presses are dropped;
//! storage failures and invariant violations fail the request.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use configs::{MessageKey, Settings};
use domains::{
    Book, BookRepository, BookStatus, Browser, CallbackToken, CatalogFilter, ChatId, Command, DomainError,
    InboundEvent, VoteStore, VoterId, VotingRepository,
};
use services::{BallotValidator, CatalogIndex, Pager, TallyEngine, VoteService};

use crate::render::{Keyboard, Renderer, Reply, ReplyMode};

/// Storage handles shared by every request.
#[derive(Clone)]
pub struct Ports {
    pub books: Arc<dyn BookRepository>,
    pub votings: Arc<dyn VotingRepository>,
    pub votes: Arc<dyn VoteStore>,
}

impl Ports {
    /// All three ports served by one store.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: BookRepository + VotingRepository + VoteStore + 'static,
    {
        Self {
            books: store.clone(),
            votings: store.clone(),
            votes: store,
        }
    }
}

type Clock = Box<dyn Fn() -> NaiveDate + Send + Sync>;

pub struct Dispatcher {
    ports: Ports,
    votes: VoteService,
    tally: TallyEngine,
    renderer: Renderer,
    today: Clock,
}

impl Dispatcher {
    pub fn new(ports: Ports, settings: &Settings) -> Self {
        let ballot_size = settings.voting.ballot_size;
        let votes = VoteService::new(
            BallotValidator::new(ports.books.clone(), ballot_size),
            ports.votes.clone(),
        );
        let tally = TallyEngine::new(ports.votings.clone(), ports.votes.clone());
        let renderer = Renderer::new(
            settings.message_templates(),
            settings.callbacks.prefixes(),
            settings.display.date_format.clone(),
            ballot_size,
        );
        Self {
            ports,
            votes,
            tally,
            renderer,
            today: Box::new(|| chrono::Local::now().date_naive()),
        }
    }

    /// Replaces the local-date clock used to decide which voting is active.
    pub fn with_clock(mut self, today: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.today = Box::new(today);
        self
    }

    /// Handles one update. `Ok(None)` means nothing is sent back.
    pub async fn handle(&self, event: InboundEvent) -> anyhow::Result<Option<Reply>> {
        let today = (self.today)();
        match event {
            InboundEvent::Command { chat_id, command, .. } => {
                tracing::debug!(chat = %chat_id, command = command.name(), "command");
                self.command(chat_id, command, today).await.map(Some)
            }
            InboundEvent::CallbackQuery { chat_id, data, .. } => self.button(chat_id, &data).await,
            InboundEvent::FreeText { chat_id, user_id, text } => {
                self.ballot(chat_id, user_id, &text, today).await.map(Some)
            }
        }
    }

    async fn command(&self, chat_id: ChatId, command: Command, today: NaiveDate) -> anyhow::Result<Reply> {
        let text = match command {
            Command::Start => self.renderer.message(MessageKey::Greetings),
            Command::Help => self.renderer.message(MessageKey::Help),
            Command::AllBooks => return self.open_browser(chat_id, Browser::AllBooks).await,
            Command::Vote => {
                if self.ports.votings.active_voting(today).await?.is_none() {
                    self.renderer.message(MessageKey::NoActiveVoting)
                } else {
                    return self.open_browser(chat_id, Browser::VoteBooks).await;
                }
            }
            Command::Already => {
                let books = self.books_with_status(BookStatus::Finished).await?;
                self.renderer.finished_books(&books)
            }
            Command::Now => {
                let books = self.books_with_status(BookStatus::Reading).await?;
                self.renderer.reading_books(&books)
            }
            Command::VoteResults => self.vote_results(today).await?,
        };
        Ok(Reply::send(chat_id, text))
    }

    async fn books_with_status(&self, status: BookStatus) -> anyhow::Result<Vec<Book>> {
        let categories = self.ports.books.categories(CatalogFilter::Status(status)).await?;
        Ok(categories.into_iter().flat_map(|c| c.books).collect())
    }

    /// Results of the running voting, or of the last one when none runs.
    async fn vote_results(&self, today: NaiveDate) -> anyhow::Result<String> {
        let voting = match self.ports.votings.active_voting(today).await? {
            Some(voting) => Some(voting),
            None => self.ports.votings.latest_voting(today).await?,
        };
        let board = match voting {
            Some(voting) => self.tally.compute_leaders(voting.id, today).await?,
            None => None,
        };
        Ok(match board {
            Some(board) => self.renderer.leaderboard(&board),
            None => self.renderer.message(MessageKey::NoVoteResults),
        })
    }

    async fn open_browser(&self, chat_id: ChatId, browser: Browser) -> anyhow::Result<Reply> {
        let catalog = CatalogIndex::load(self.ports.books.as_ref(), browser.filter()).await?;
        match self.render_page(&catalog, browser, 0) {
            Ok((text, keyboard)) => Ok(Reply {
                chat_id,
                mode: ReplyMode::Send,
                text,
                keyboard: Some(keyboard),
            }),
            Err(err) => {
                tracing::error!(?browser, error = %err, "cannot open catalog browser");
                Err(err.into())
            }
        }
    }

    async fn button(&self, chat_id: ChatId, data: &str) -> anyhow::Result<Option<Reply>> {
        let token = match CallbackToken::decode(data, self.renderer.prefixes()) {
            Ok(token) => token,
            Err(err) => {
                tracing::debug!(error = %err, "ignoring button");
                return Ok(None);
            }
        };
        let catalog = CatalogIndex::load(self.ports.books.as_ref(), token.browser.filter()).await?;
        match self.render_page(&catalog, token.browser, token.page) {
            Ok((text, keyboard)) => Ok(Some(Reply {
                chat_id,
                mode: ReplyMode::Edit,
                text,
                keyboard: Some(keyboard),
            })),
            Err(err) if err.is_ignorable() => {
                tracing::warn!(error = %err, "stale page requested");
                Ok(None)
            }
            Err(err) => {
                tracing::error!(browser = ?token.browser, error = %err, "cannot render page");
                Err(err.into())
            }
        }
    }

    fn render_page(
        &self,
        catalog: &CatalogIndex,
        browser: Browser,
        index: usize,
    ) -> Result<(String, Keyboard), DomainError> {
        let page = catalog.page(index)?;
        let pager = Pager::new(index, catalog.page_count())?;
        Ok((
            self.renderer.page(&page, browser),
            self.renderer.pager_keyboard(&pager, browser),
        ))
    }

    async fn ballot(&self, chat_id: ChatId, voter: VoterId, text: &str, today: NaiveDate) -> anyhow::Result<Reply> {
        let voting = self.ports.votings.active_voting(today).await?;
        match self.votes.cast(voting.as_ref(), voter, text, Utc::now()).await {
            Ok(ballot) => Ok(Reply::send(chat_id, self.renderer.ballot(&ballot.books))),
            Err(err) => match self.renderer.rejection(&err) {
                Some(message) => {
                    tracing::debug!(voter = %voter, error = %err, "ballot rejected");
                    Ok(Reply::send(chat_id, message))
                }
                None => Err(err.into()),
            },
        }
    }
}
