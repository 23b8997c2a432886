//! Event-thread controller for Storage Crab Desktop.
//!
//! All presenter calls happen here, on the task that owns the `App`. Network
//! work triggered by the user runs on spawned worker tasks, and the session
//! keeper runs on its own task; both report back only by sending `AppEvent`s
//! into the controller's channel.

pub mod console;
pub mod screen;

pub use screen::{LoginStage, Screen};

use std::sync::Arc;

use tokio::sync::mpsc;
use zeroize::Zeroizing;

use crate::api::auth::{self, LoginError, LoginSuccess};
use crate::api::files::{self, RETRIEVAL_FAILED_MESSAGE};
use crate::api::types::FileEntry;
use crate::api::{Endpoints, RequestResult, Transport};
use crate::config::Config;
use crate::session::{SessionEvent, SessionOwner};

const DASHBOARD_HELP: &str = "Commands: files, logout, quit";

/// Messages consumed by the controller.
#[derive(Debug)]
pub enum AppEvent {
    /// One line typed by the user.
    Input(String),
    /// The input source reached end-of-file.
    InputClosed,
    LoginFinished(Result<LoginSuccess, LoginError>),
    /// Result of a listing started while session `generation` was current.
    FilesListed {
        generation: u64,
        result: RequestResult<Vec<FileEntry>>,
    },
    Session(SessionEvent),
    /// Window close / interrupt.
    Shutdown,
}

impl From<SessionEvent> for AppEvent {
    fn from(event: SessionEvent) -> Self {
        AppEvent::Session(event)
    }
}

/// Presentation layer. Implementations only draw; they never call back into
/// the session.
pub trait Presenter {
    fn show_login(&mut self, error: Option<&str>);
    fn show_busy(&mut self, message: &str);
    fn show_dashboard(&mut self, username: &str);
    fn show_files(&mut self, files: &[FileEntry]);
    fn show_message(&mut self, message: &str);
    fn show_error(&mut self, title: &str, message: &str);
    fn prompt(&mut self, text: &str);
}

pub struct App<T, P> {
    transport: Arc<T>,
    endpoints: Endpoints,
    session: SessionOwner<T, AppEvent>,
    presenter: P,
    screen: Screen,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl<T, P> App<T, P>
where
    T: Transport,
    P: Presenter,
{
    pub fn new(transport: Arc<T>, config: &Config, presenter: P) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let endpoints = config.endpoints();
        let session = SessionOwner::new(
            Arc::clone(&transport),
            endpoints.token_refresh.clone(),
            config.refresh_interval,
            events_tx.clone(),
        );

        Self {
            transport,
            endpoints,
            session,
            presenter,
            screen: Screen::login(),
            events_tx,
            events_rx,
        }
    }

    /// Handle for input sources and signal handlers to post events.
    pub fn sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self.events_tx.clone()
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn session(&self) -> &SessionOwner<T, AppEvent> {
        &self.session
    }

    /// Show the login form and process events until the window is closed.
    pub async fn run(&mut self) {
        self.open_login(None);
        while self.step().await {}
        // Covers a closed channel as well as an explicit shutdown.
        self.session.stop_session().await;
        log::info!("Event loop finished");
    }

    /// Wait for one event and handle it. Returns `false` once closed.
    pub async fn step(&mut self) -> bool {
        match self.events_rx.recv().await {
            Some(event) => {
                self.handle(event).await;
                self.screen != Screen::Closed
            }
            None => false,
        }
    }

    pub async fn handle(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(line) => self.on_input(line).await,
            AppEvent::InputClosed | AppEvent::Shutdown => self.close().await,
            AppEvent::LoginFinished(result) => self.on_login_finished(result).await,
            AppEvent::FilesListed { generation, result } => {
                self.on_files_listed(generation, result)
            }
            AppEvent::Session(event) => self.on_session_event(event).await,
        }
    }

    async fn on_input(&mut self, mut line: String) {
        // In place, so a typed password has no unwiped copy.
        let len = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(len);

        match self.screen.clone() {
            Screen::Login(LoginStage::Email) => {
                self.screen = Screen::Login(LoginStage::Password {
                    email: line.trim().to_string(),
                });
                self.show_prompt();
            }
            Screen::Login(LoginStage::Password { email }) => {
                self.submit_login(email, Zeroizing::new(line));
            }
            Screen::Dashboard => self.on_command(line.trim()).await,
            Screen::ConfirmLogout => {
                if matches!(line.trim().to_lowercase().as_str(), "y" | "yes") {
                    self.logout().await;
                } else {
                    self.screen = Screen::Dashboard;
                    self.show_prompt();
                }
            }
            Screen::LoggingIn => log::debug!("Ignoring input while logging in"),
            Screen::Closed => {}
        }
    }

    fn submit_login(&mut self, email: String, password: Zeroizing<String>) {
        if let Err(e) = auth::validate(&email, &password) {
            self.open_login(Some(&e.to_string()));
            return;
        }

        self.screen = Screen::LoggingIn;
        self.presenter.show_busy("Logging in...");

        let transport = Arc::clone(&self.transport);
        let endpoints = self.endpoints.clone();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let result = auth::login(transport.as_ref(), &endpoints, &email, &password).await;
            if events.send(AppEvent::LoginFinished(result)).is_err() {
                log::debug!("Login finished after the event loop closed");
            }
        });
    }

    async fn on_login_finished(&mut self, result: Result<LoginSuccess, LoginError>) {
        if self.screen != Screen::LoggingIn {
            log::warn!("Discarding login result received on {} screen", self.screen.label());
            return;
        }

        match result {
            Ok(LoginSuccess {
                credentials,
                username,
            }) => {
                self.session.start_session(credentials, username.clone()).await;
                self.screen = Screen::Dashboard;
                self.presenter.show_dashboard(&username);
                self.presenter.show_message(DASHBOARD_HELP);
                self.show_prompt();
            }
            Err(LoginError::Request(e)) if e.is_transport() => {
                log::warn!("Login request failed: {}", e);
                self.presenter
                    .show_error(e.category(), "Could not reach the authorization server.");
                self.open_login(None);
            }
            Err(e) => {
                log::info!("Login refused: {}", e);
                self.open_login(Some(&e.to_string()));
            }
        }
    }

    async fn on_command(&mut self, command: &str) {
        match command {
            "files" => self.request_files(),
            "logout" => {
                self.screen = Screen::ConfirmLogout;
                self.show_prompt();
            }
            "quit" | "exit" => self.close().await,
            "help" => {
                self.presenter.show_message(DASHBOARD_HELP);
                self.show_prompt();
            }
            "" => self.show_prompt(),
            other => {
                self.presenter
                    .show_message(&format!("Unknown command '{}'. {}", other, DASHBOARD_HELP));
                self.show_prompt();
            }
        }
    }

    fn request_files(&mut self) {
        let Some(tokens) = self.session.tokens() else {
            log::warn!("File listing requested without a session");
            return;
        };

        self.presenter.show_busy("Retrieving files...");

        let generation = self.session.generation();
        let transport = Arc::clone(&self.transport);
        let endpoints = self.endpoints.clone();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let result = files::list_files(transport.as_ref(), &endpoints, &tokens).await;
            if events
                .send(AppEvent::FilesListed { generation, result })
                .is_err()
            {
                log::debug!("File listing finished after the event loop closed");
            }
        });
    }

    fn on_files_listed(&mut self, generation: u64, result: RequestResult<Vec<FileEntry>>) {
        if !self.screen.has_session() || generation != self.session.generation() {
            log::debug!("Discarding file listing from an ended session");
            return;
        }

        match result {
            Ok(files) => self.presenter.show_files(&files),
            Err(e) => {
                log::warn!("File listing failed: {}", e);
                self.presenter.show_error("Error", RETRIEVAL_FAILED_MESSAGE);
            }
        }
        self.show_prompt();
    }

    async fn on_session_event(&mut self, event: SessionEvent) {
        if !self.session.is_active() {
            return;
        }

        match &event {
            SessionEvent::Expired { reason } => log::warn!("Session expired: {}", reason),
        }
        self.presenter.show_error(
            "Error",
            &format!("Something went wrong.\nDetails: {}", event.message()),
        );
        self.logout().await;
    }

    async fn logout(&mut self) {
        self.session.stop_session().await;
        self.open_login(None);
    }

    async fn close(&mut self) {
        self.session.stop_session().await;
        self.screen = Screen::Closed;
        log::info!("Window closed");
    }

    fn open_login(&mut self, error: Option<&str>) {
        self.screen = Screen::login();
        self.presenter.show_login(error);
        self.show_prompt();
    }

    fn show_prompt(&mut self) {
        if let Some(text) = self.screen.prompt() {
            self.presenter.prompt(text);
        }
    }
}
