use std::error::Error;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::warn;

use crate::core::conversation::{Conversation, TurnOutcome};
use crate::core::message::Message;
use crate::ui::html::Html;
use crate::ui::sanitize::{AmmoniaSanitizer, Sanitizer};
use crate::ui::transcript::render_page;
use crate::utils::logging::LoggingState;

pub const PAGE_TITLE: &str = "Gen UI Chat";

/// Interactive session state: the conversation plus its outputs (transcript
/// log, HTML export) and a pending status line for the front end.
pub struct App {
    pub conversation: Conversation,
    pub logging: LoggingState,
    html_export: Option<PathBuf>,
    sanitizer: Box<dyn Sanitizer>,
    status: Option<String>,
}

impl App {
    pub fn new(conversation: Conversation, logging: LoggingState) -> Self {
        Self {
            conversation,
            logging,
            html_export: None,
            sanitizer: Box::new(AmmoniaSanitizer::new()),
            status: None,
        }
    }

    pub fn with_html_export(mut self, path: Option<PathBuf>) -> Self {
        self.html_export = path;
        self
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn take_status(&mut self) -> Option<String> {
        self.status.take()
    }

    pub fn html_export(&self) -> Option<&Path> {
        self.html_export.as_deref()
    }

    pub fn set_html_export(&mut self, path: PathBuf) {
        self.html_export = Some(path);
    }

    pub fn sanitizer(&self) -> &dyn Sanitizer {
        self.sanitizer.as_ref()
    }

    pub fn render_page(&self) -> Html {
        render_page(
            PAGE_TITLE,
            self.conversation.mode(),
            self.conversation.transcript().messages(),
            self.sanitizer(),
        )
    }

    /// Writes the page atomically so a browser reload never sees a partial
    /// file.
    pub fn export_html_to(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        let parent = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let mut temp_file = NamedTempFile::new_in(parent)?;
        temp_file.write_all(self.render_page().as_str().as_bytes())?;
        temp_file.as_file_mut().sync_all()?;
        temp_file.persist(path)?;
        Ok(())
    }

    /// Runs a turn, then appends the settled exchange to the log and
    /// refreshes the HTML export. Output failures become status messages.
    pub async fn send<F>(&mut self, prompt: &str, on_update: F) -> TurnOutcome
    where
        F: FnMut(&Message),
    {
        let outcome = self.conversation.send(prompt, on_update).await;
        if outcome == TurnOutcome::Ignored {
            return outcome;
        }

        let messages = self.conversation.transcript().messages();
        let settled = messages.range(messages.len().saturating_sub(2)..);
        for message in settled {
            if let Err(e) = self.logging.log_message(message) {
                warn!("transcript log write failed: {e}");
                self.status = Some(format!("Log error: {e}"));
            }
        }

        if let Some(path) = self.html_export.as_deref() {
            if let Err(e) = self.export_html_to(path) {
                warn!("html export failed: {e}");
                self.status = Some(format!("HTML export error: {e}"));
            }
        }

        outcome
    }

    /// Starts over: empty transcript, fresh provider session, truncated log.
    pub fn clear(&mut self) -> Result<(), Box<dyn Error>> {
        self.conversation.reset();
        self.logging
            .rewrite_log(self.conversation.transcript().messages())?;
        if let Some(path) = self.html_export.as_deref() {
            self.export_html_to(path)?;
        }
        Ok(())
    }
}
