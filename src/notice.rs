//! Aggregated user notifications
//!
//! Every warning and error from one command run funnels into a single
//! `NoticeSession`, which flushes exactly one presentation: an error takes
//! priority with warnings appended beneath it, otherwise the warnings are
//! shown together (prefixed by the success line when one was recorded),
//! otherwise a lone success message. Duplicate lines are dropped, first
//! occurrence wins.

use log::{error, info, warn};

/// One-shot presentation surface for the aggregated message.
pub trait NoticePresenter {
    fn show_success(&self, message: &str);
    fn show_warning(&self, message: &str);
    fn show_error(&self, message: &str);
}

/// Accumulate-then-flush session. Exactly one presentation per flush,
/// or none when nothing was recorded.
pub struct NoticeSession<'a> {
    presenter: &'a dyn NoticePresenter,
    success: Option<String>,
    warnings: Vec<String>,
    error: Option<String>,
}

impl<'a> NoticeSession<'a> {
    pub fn new(presenter: &'a dyn NoticePresenter) -> Self {
        NoticeSession {
            presenter,
            success: None,
            warnings: Vec::new(),
            error: None,
        }
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.success = Some(message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Emit the single aggregated notification.
    pub fn flush(self) {
        if let Some(error) = self.error {
            let message = join_unique(std::iter::once(error).chain(self.warnings));
            self.presenter.show_error(&message);
        } else if !self.warnings.is_empty() {
            let message = join_unique(self.success.into_iter().chain(self.warnings));
            self.presenter.show_warning(&message);
        } else if let Some(success) = self.success {
            self.presenter.show_success(&success);
        }
    }
}

/// Join lines with newlines, dropping duplicates while preserving the order
/// of first occurrence.
fn join_unique(lines: impl IntoIterator<Item = String>) -> String {
    let mut seen: Vec<String> = Vec::new();
    for line in lines {
        if !seen.contains(&line) {
            seen.push(line);
        }
    }
    seen.join("\n")
}

// ─────────────────────────────────────────────────────────────────────────────
// Log Presenter
// ─────────────────────────────────────────────────────────────────────────────

/// Presenter that reports through the log facade; with the default
/// env_logger setup this reaches the terminal the command ran in.
pub struct LogNoticePresenter;

impl NoticePresenter for LogNoticePresenter {
    fn show_success(&self, message: &str) {
        info!("{}", message);
    }

    fn show_warning(&self, message: &str) {
        warn!("{}", message);
    }

    fn show_error(&self, message: &str) {
        error!("{}", message);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
