//! Single most-recent status message

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// The one line of feedback shown to the operator. Each new message
/// replaces the previous one; there is no queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    kind: StatusKind,
    message: String,
    /// Bumped on every update, even when the text repeats
    revision: u64,
}

impl Default for StatusLine {
    fn default() -> Self {
        Self {
            kind: StatusKind::Info,
            message: "Ready.".to_string(),
            revision: 0,
        }
    }
}

impl StatusLine {
    pub fn info(&mut self, message: impl Into<String>) {
        self.set(StatusKind::Info, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.set(StatusKind::Error, message.into());
    }

    fn set(&mut self, kind: StatusKind, message: String) {
        self.kind = kind;
        self.message = message;
        self.revision += 1;
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn kind(&self) -> StatusKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            StatusKind::Info => write!(f, "[status] {}", self.message),
            StatusKind::Error => write!(f, "[error] {}", self.message),
        }
    }
}
