//! Screen state machine for the desktop client.
//!
//! The presenter renders whatever screen the controller is on; input lines
//! are interpreted according to the current screen.

/// Which part of the login form is waiting for input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginStage {
    Email,
    Password { email: String },
}

/// All screens the client can be on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Login form, initial state and post-logout state.
    Login(LoginStage),
    /// Credentials sent, waiting for the authorization server.
    LoggingIn,
    /// Logged in; the session keeper is running.
    Dashboard,
    /// Logged in, asking whether the user really wants to leave.
    ConfirmLogout,
    /// Window closed; the event loop is finishing.
    Closed,
}

impl Screen {
    /// Fresh login form.
    pub fn login() -> Self {
        Screen::Login(LoginStage::Email)
    }

    /// Human-readable screen name, used for window titles and logs.
    pub fn label(&self) -> &str {
        match self {
            Screen::Login(_) => "Login",
            Screen::LoggingIn => "Logging in...",
            Screen::Dashboard => "Dashboard",
            Screen::ConfirmLogout => "Logout",
            Screen::Closed => "Closed",
        }
    }

    /// Prompt shown while this screen waits for a line of input.
    pub fn prompt(&self) -> Option<&'static str> {
        match self {
            Screen::Login(LoginStage::Email) => Some("Email: "),
            Screen::Login(LoginStage::Password { .. }) => Some("Password: "),
            Screen::Dashboard => Some("> "),
            Screen::ConfirmLogout => Some("Are you sure you want to logout? [y/N] "),
            Screen::LoggingIn | Screen::Closed => None,
        }
    }

    /// Returns `true` on screens that only make sense with a live session.
    pub fn has_session(&self) -> bool {
        matches!(self, Screen::Dashboard | Screen::ConfirmLogout)
    }
}
