//! Events that can occur in a conversation

use super::feedback::Sentiment;

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Seed the log with the assistant greeting
    Greet,

    // User events
    UserMessage {
        text: String,
    },
    ResetRequested,
    EndChatRequested,
    FeedbackSubmitted {
        sentiment: Sentiment,
        comment: String,
    },
    FeedbackCancelled,

    // Webhook events
    AnswerReceived {
        /// Raw `output` field, empty when the backend sent none
        output: String,
    },
    AnswerFailed {
        message: String,
    },
    ResetSucceeded,
    ResetFailed {
        message: String,
    },
    FeedbackSucceeded,
    FeedbackFailed {
        message: String,
    },
}
