//! End-of-chat feedback

use crate::webhook::Thumb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sentiment {
    Up,
    Down,
    #[default]
    Unset,
}

impl Sentiment {
    /// Wire rating, `None` while unset
    pub fn thumb(self) -> Option<Thumb> {
        match self {
            Sentiment::Up => Some(Thumb::Up),
            Sentiment::Down => Some(Thumb::Down),
            Sentiment::Unset => None,
        }
    }
}

/// Contents of the open feedback dialog
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedbackDraft {
    pub sentiment: Sentiment,
    pub comment: String,
    pub submitting: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// Transient notice shown after a reset or feedback submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.severity == Severity::Success
    }
}
