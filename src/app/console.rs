//! Line-oriented terminal front end.
//!
//! `ConsolePresenter` draws screens as plain text; `spawn_line_reader` turns
//! an input stream into `AppEvent::Input` messages for the controller.

use std::fmt;
use std::io::{self, Write};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{AppEvent, Presenter};
use crate::api::types::FileEntry;

const TITLE: &str = "Storage Crab";

pub struct ConsolePresenter<W> {
    out: W,
}

impl ConsolePresenter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsolePresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, args: fmt::Arguments<'_>) {
        if let Err(e) = self.out.write_fmt(args).and_then(|()| self.out.flush()) {
            log::warn!("Console write failed: {}", e);
        }
    }
}

impl<W: Write> Presenter for ConsolePresenter<W> {
    fn show_login(&mut self, error: Option<&str>) {
        self.emit(format_args!("\n=== {} ===\n", TITLE));
        if let Some(error) = error {
            self.emit(format_args!("! {}\n", error));
        }
    }

    fn show_busy(&mut self, message: &str) {
        self.emit(format_args!("{}\n", message));
    }

    fn show_dashboard(&mut self, username: &str) {
        self.emit(format_args!("\n=== {}'s dashboard ===\n", username));
    }

    fn show_files(&mut self, files: &[FileEntry]) {
        if files.is_empty() {
            self.emit(format_args!("No files uploaded yet.\n"));
            return;
        }
        for file in files {
            self.emit(format_args!(
                "{:<32} {:>10}  {}\n",
                file.name,
                file.human_size(),
                file.path
            ));
        }
    }

    fn show_message(&mut self, message: &str) {
        self.emit(format_args!("{}\n", message));
    }

    fn show_error(&mut self, title: &str, message: &str) {
        self.emit(format_args!("[{}] {}\n", title, message));
    }

    fn prompt(&mut self, text: &str) {
        self.emit(format_args!("{}", text));
    }
}

/// Forward each line of `reader` to the controller as `AppEvent::Input`.
///
/// Sends `AppEvent::InputClosed` on end-of-file or a read error.
pub fn spawn_line_reader<R>(reader: R, events: mpsc::UnboundedSender<AppEvent>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if events.send(AppEvent::Input(line)).is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    let _ = events.send(AppEvent::InputClosed);
                    break;
                }
                Err(e) => {
                    log::error!("Failed to read input: {}", e);
                    let _ = events.send(AppEvent::InputClosed);
                    break;
                }
            }
        }
    })
}
