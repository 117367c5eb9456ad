//! Conversation state types

use super::feedback::FeedbackDraft;
use crate::format::{format, RenderNode};
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const GREETING_TEXT: &str = "Hello! I'm Hexaa AI. How can I help you today?";
pub const CLARIFICATION_TEXT: &str = "I'm here to help! Could you please clarify your question?";
pub const ANSWER_ERROR_TEXT: &str = "Oops! Something went wrong. Please try again later.";
pub const CHAT_ENDED_TEXT: &str = "The chat has ended.";

/// Canned prompts offered while the assistant is ready for input
pub const SUGGESTIONS: [&str; 3] = [
    "I want an estimate",
    "I want to schedule meeting with an expert",
    "What are Hexaa AI services?",
];

// ============================================================================
// Messages
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// One entry of the conversation log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Uuid,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender,
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text)
    }

    /// Formatted content; the raw text is what gets stored.
    pub fn render(&self) -> Vec<RenderNode> {
        format(&self.text)
    }
}

// ============================================================================
// Conversation State
// ============================================================================

/// What the conversation is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activity {
    /// Ready for user input, no pending request
    #[default]
    Idle,
    /// Answer request in flight
    AwaitingAnswer,
    /// Reset request in flight
    Resetting,
}

/// Coarse phase as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingResponse,
    Ended,
}

/// Conversation state, minus the message log
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConvState {
    pub activity: Activity,
    /// Set by successful feedback; cleared only by a successful reset
    pub has_ended: bool,
    /// Open feedback dialog
    pub feedback: Option<FeedbackDraft>,
}

impl ConvState {
    pub fn is_typing(&self) -> bool {
        self.activity != Activity::Idle
    }

    pub fn phase(&self) -> Phase {
        if self.is_typing() {
            Phase::AwaitingResponse
        } else if self.has_ended {
            Phase::Ended
        } else {
            Phase::Idle
        }
    }

    /// Suggestions are only offered when a message could be sent right now
    pub fn suggestions(&self) -> &'static [&'static str] {
        if self.phase() == Phase::Idle {
            &SUGGESTIONS
        } else {
            &[]
        }
    }
}
