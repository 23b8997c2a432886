//! Background token renewal for a logged-in session.
//!
//! Runs in a tokio task, refreshing the token pair once per interval until
//! either the owner asks it to stop or a refresh fails. A failed refresh is
//! fatal to the session: the owner is notified once and the task ends.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::token_pair::TokenPair;
use crate::api::error::RequestError;
use crate::api::Transport;

/// Default token renewal interval (10 minutes).
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Text shown to the user when the session could not be renewed.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired, logging out.";

/// Notifications sent from the keeper to whoever owns the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The refresh exchange failed; the keeper has already stopped.
    Expired { reason: RequestError },
}

impl SessionEvent {
    /// User-facing description.
    pub fn message(&self) -> &'static str {
        match self {
            SessionEvent::Expired { .. } => SESSION_EXPIRED_MESSAGE,
        }
    }
}

/// Why the keeper task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeeperExit {
    /// The owner requested a stop.
    Stopped,
    /// A refresh failed and the owner was notified.
    Expired,
    /// The task panicked or was cancelled by the runtime.
    Aborted,
}

/// Handle to a running renewal task.
///
/// `stop()` must be awaited before the session is torn down; it returns only
/// after the task has fully finished.
pub struct SessionKeeper {
    active: watch::Sender<bool>,
    handle: Option<JoinHandle<KeeperExit>>,
}

impl SessionKeeper {
    /// Spawn the renewal task on the current tokio runtime.
    ///
    /// Session events are delivered through `events`; any channel whose item
    /// type can be built from a `SessionEvent` works, so the application event
    /// loop can receive them directly.
    pub fn start<T, E>(
        tokens: Arc<TokenPair>,
        transport: Arc<T>,
        refresh_url: String,
        interval: Duration,
        events: mpsc::UnboundedSender<E>,
    ) -> Self
    where
        T: Transport,
        E: From<SessionEvent> + Send + 'static,
    {
        let (active, active_rx) = watch::channel(true);
        let task = KeeperTask {
            tokens,
            transport,
            refresh_url,
            interval,
            events,
            active: active_rx,
        };
        let handle = tokio::spawn(task.run());

        log::info!(
            "Session keeper started (interval: {}s)",
            interval.as_secs()
        );

        Self {
            active,
            handle: Some(handle),
        }
    }

    /// Whether the renewal task is still alive.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Clear the active flag and wake the task without waiting for it.
    pub fn request_stop(&self) {
        self.active.send_replace(false);
    }

    /// Stop the task and wait until it has finished.
    ///
    /// A refresh already in flight runs to completion first.
    pub async fn stop(mut self) -> KeeperExit {
        self.request_stop();
        let Some(handle) = self.handle.take() else {
            return KeeperExit::Stopped;
        };
        match handle.await {
            Ok(exit) => exit,
            Err(e) => {
                log::error!("Session keeper task did not finish cleanly: {}", e);
                KeeperExit::Aborted
            }
        }
    }
}

impl Drop for SessionKeeper {
    fn drop(&mut self) {
        if self.handle.is_some() {
            // Not joined: the task still exits on its next wake-up, and it holds
            // its own reference to the token pair.
            log::warn!("Session keeper dropped without stop(); signalling task");
            self.active.send_replace(false);
        }
    }
}

struct KeeperTask<T, E> {
    tokens: Arc<TokenPair>,
    transport: Arc<T>,
    refresh_url: String,
    interval: Duration,
    events: mpsc::UnboundedSender<E>,
    active: watch::Receiver<bool>,
}

impl<T, E> KeeperTask<T, E>
where
    T: Transport,
    E: From<SessionEvent> + Send + 'static,
{
    async fn run(mut self) -> KeeperExit {
        loop {
            tokio::select! {
                biased;
                // Also resolves if the owner's handle is gone.
                _ = self.active.wait_for(|active| !*active) => {
                    log::info!("Session keeper stopped");
                    return KeeperExit::Stopped;
                }
                _ = tokio::time::sleep(self.interval) => {}
            }

            match self
                .tokens
                .refresh(self.transport.as_ref(), &self.refresh_url)
                .await
            {
                Ok(()) => log::debug!("Session renewed"),
                Err(_) if !*self.active.borrow() => {
                    log::info!("Refresh finished after stop was requested; not reporting");
                    return KeeperExit::Stopped;
                }
                Err(reason) => {
                    log::warn!("Session renewal failed: {}", reason);
                    if self.events.send(SessionEvent::Expired { reason }.into()).is_err() {
                        log::debug!("Session owner no longer listening for events");
                    }
                    return KeeperExit::Expired;
                }
            }
        }
    }
}
