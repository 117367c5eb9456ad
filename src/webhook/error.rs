//! Webhook error types

use thiserror::Error;

/// Webhook error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct WebhookError {
    pub kind: WebhookErrorKind,
    pub message: String,
    /// HTTP status when the backend answered at all
    pub status: Option<u16>,
}

impl WebhookError {
    pub fn new(kind: WebhookErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(WebhookErrorKind::Transport, message)
    }

    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            ..Self::new(WebhookErrorKind::RemoteRejected, message)
        }
    }
}

/// Error classification
///
/// Callers never branch on this; both kinds mean "the call did not
/// succeed". It exists for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookErrorKind {
    /// Network failure, timeout or malformed response body
    Transport,
    /// Backend answered with a non-success status
    RemoteRejected,
}

impl WebhookErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::RemoteRejected => "remote_rejected",
        }
    }
}
