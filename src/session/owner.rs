//! Dashboard-level holder of the logged-in session.
//!
//! Owns the token pair and its keeper. The keeper is always stopped and joined
//! before the token pair is released.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use super::keeper::{KeeperExit, SessionEvent, SessionKeeper};
use super::token_pair::{Credentials, TokenPair};
use crate::api::Transport;

struct ActiveSession {
    username: String,
    tokens: Arc<TokenPair>,
    keeper: SessionKeeper,
}

/// Starts, exposes and tears down at most one session at a time.
pub struct SessionOwner<T, E> {
    transport: Arc<T>,
    refresh_url: String,
    refresh_interval: Duration,
    events: mpsc::UnboundedSender<E>,
    active: Option<ActiveSession>,
    generation: u64,
}

impl<T, E> SessionOwner<T, E>
where
    T: Transport,
    E: From<SessionEvent> + Send + 'static,
{
    pub fn new(
        transport: Arc<T>,
        refresh_url: impl Into<String>,
        refresh_interval: Duration,
        events: mpsc::UnboundedSender<E>,
    ) -> Self {
        Self {
            transport,
            refresh_url: refresh_url.into(),
            refresh_interval,
            events,
            active: None,
            generation: 0,
        }
    }

    /// Begin a session from freshly issued credentials.
    ///
    /// Any session already running is stopped first.
    pub async fn start_session(&mut self, credentials: Credentials, username: impl Into<String>) {
        self.stop_session().await;

        let username = username.into();
        let tokens = Arc::new(TokenPair::new(credentials));
        let keeper = SessionKeeper::start(
            Arc::clone(&tokens),
            Arc::clone(&self.transport),
            self.refresh_url.clone(),
            self.refresh_interval,
            self.events.clone(),
        );

        self.generation += 1;
        log::info!("Session {} started for {}", self.generation, username);
        self.active = Some(ActiveSession {
            username,
            tokens,
            keeper,
        });
    }

    /// End the current session, if any.
    ///
    /// Returns after the keeper task has finished; the token pair is released
    /// only then. Returns `None` when no session was active.
    pub async fn stop_session(&mut self) -> Option<KeeperExit> {
        let session = self.active.take()?;
        let exit = session.keeper.stop().await;
        log::info!("Session for {} ended ({:?})", session.username, exit);
        Some(exit)
    }

    /// Shared handle to the current token pair, for attaching bearer tokens.
    pub fn tokens(&self) -> Option<Arc<TokenPair>> {
        self.active.as_ref().map(|s| Arc::clone(&s.tokens))
    }

    pub fn username(&self) -> Option<&str> {
        self.active.as_ref().map(|s| s.username.as_str())
    }

    /// Counter bumped by every `start_session`. Work tagged with an older
    /// value belongs to a session that has since ended.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Whether the current session's keeper task is still alive.
    pub fn keeper_running(&self) -> bool {
        self.active.as_ref().is_some_and(|s| s.keeper.is_running())
    }
}
