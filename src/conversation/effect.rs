//! Effects produced by state transitions

use super::feedback::Notification;
use super::state::Sender;
use crate::webhook::Thumb;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a message to the log
    AppendMessage { sender: Sender, text: String },

    /// Replace the whole log with a single bot message
    ReplaceLog { text: String },

    /// Fire the lead request and await the answer request for this text
    DispatchInquiry { text: String },

    /// Ask the backend to drop the session's conversation
    DispatchReset,

    /// Submit feedback
    DispatchFeedback { thumb: Thumb, comment: String },

    /// Surface a transient notice
    Notify(Notification),
}

impl Effect {
    pub fn append_user(text: impl Into<String>) -> Self {
        Effect::AppendMessage {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn append_bot(text: impl Into<String>) -> Self {
        Effect::AppendMessage {
            sender: Sender::Bot,
            text: text.into(),
        }
    }
}
