//! Pure state transition function
//!
//! Given the same state and event this always produces the same new
//! state and effects. All I/O happens in the controller.

use super::feedback::{FeedbackDraft, Notification, Sentiment};
use super::state::{
    Activity, ConvState, ANSWER_ERROR_TEXT, CHAT_ENDED_TEXT, CLARIFICATION_TEXT, GREETING_TEXT,
};
use super::{Effect, Event};
use thiserror::Error;

/// Marker the backend puts in front of the user-facing part of a reply
const OUTPUT_MARKER: &str = "Output:";

const RESET_OK_TEXT: &str = "Chat cleared successfully.";
const RESET_FAILED_TEXT: &str = "Chat clear failed.";
const FEEDBACK_OK_TEXT: &str = "Feedback submitted successfully!";
const FEEDBACK_FAILED_TEXT: &str = "Failed to submit feedback.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Reasons an event is refused; the state is left untouched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error("The chat has ended")]
    ChatEnded,
    #[error("Assistant is busy, wait for the current request to finish")]
    Busy,
    #[error("Pick a thumbs up or thumbs down rating first")]
    SentimentRequired,
    #[error("Feedback is already being submitted")]
    FeedbackInFlight,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
pub fn transition(state: &ConvState, event: Event) -> Result<TransitionResult, TransitionError> {
    match event {
        Event::Greet => {
            Ok(TransitionResult::new(state.clone()).with_effect(Effect::append_bot(GREETING_TEXT)))
        }

        // ============================================================
        // User messages
        // ============================================================
        Event::UserMessage { text } => {
            if text.trim().is_empty() {
                return Err(TransitionError::EmptyMessage);
            }
            if state.has_ended {
                return Err(TransitionError::ChatEnded);
            }
            if state.activity != Activity::Idle {
                return Err(TransitionError::Busy);
            }

            let new_state = ConvState {
                activity: Activity::AwaitingAnswer,
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::append_user(text.clone()))
                .with_effect(Effect::DispatchInquiry { text }))
        }

        Event::AnswerReceived { output } => {
            let new_state = finish(state, Activity::AwaitingAnswer, "answer")?;
            let reply = extract_reply(&output);
            Ok(TransitionResult::new(new_state).with_effect(Effect::append_bot(reply)))
        }

        Event::AnswerFailed { .. } => {
            let new_state = finish(state, Activity::AwaitingAnswer, "answer")?;
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::append_bot(ANSWER_ERROR_TEXT)))
        }

        // ============================================================
        // Reset
        // ============================================================
        Event::ResetRequested => {
            if state.activity != Activity::Idle {
                return Err(TransitionError::Busy);
            }
            let new_state = ConvState {
                activity: Activity::Resetting,
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state).with_effect(Effect::DispatchReset))
        }

        Event::ResetSucceeded => {
            let mut new_state = finish(state, Activity::Resetting, "reset")?;
            new_state.has_ended = false;
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::ReplaceLog {
                    text: GREETING_TEXT.to_string(),
                })
                .with_effect(Effect::Notify(Notification::success(RESET_OK_TEXT))))
        }

        Event::ResetFailed { .. } => {
            let new_state = finish(state, Activity::Resetting, "reset")?;
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::Notify(Notification::error(RESET_FAILED_TEXT))))
        }

        // ============================================================
        // Feedback
        // ============================================================
        Event::EndChatRequested => {
            let mut new_state = state.clone();
            new_state.feedback.get_or_insert_with(FeedbackDraft::default);
            Ok(TransitionResult::new(new_state))
        }

        Event::FeedbackSubmitted { sentiment, comment } => {
            if state.feedback.as_ref().is_some_and(|d| d.submitting) {
                return Err(TransitionError::FeedbackInFlight);
            }
            let thumb = sentiment.thumb().ok_or(TransitionError::SentimentRequired)?;

            let new_state = ConvState {
                feedback: Some(FeedbackDraft {
                    sentiment,
                    comment: comment.clone(),
                    submitting: true,
                }),
                ..state.clone()
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::DispatchFeedback { thumb, comment }))
        }

        Event::FeedbackCancelled => {
            if state.feedback.as_ref().is_some_and(|d| d.submitting) {
                return Err(TransitionError::FeedbackInFlight);
            }
            Ok(TransitionResult::new(ConvState {
                feedback: None,
                ..state.clone()
            }))
        }

        Event::FeedbackSucceeded => {
            let new_state = ConvState {
                has_ended: true,
                feedback: None,
                ..finish_feedback(state)?
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::append_bot(CHAT_ENDED_TEXT))
                .with_effect(Effect::Notify(Notification::success(FEEDBACK_OK_TEXT))))
        }

        Event::FeedbackFailed { .. } => {
            let new_state = ConvState {
                feedback: None,
                ..finish_feedback(state)?
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::Notify(Notification::error(FEEDBACK_FAILED_TEXT))))
        }
    }
}

/// Settle an in-flight request, returning to `Idle`.
fn finish(state: &ConvState, expected: Activity, what: &str) -> Result<ConvState, TransitionError> {
    if state.activity != expected {
        return Err(TransitionError::InvalidTransition(format!(
            "{what} result while {:?}",
            state.activity
        )));
    }
    Ok(ConvState {
        activity: Activity::Idle,
        ..state.clone()
    })
}

fn finish_feedback(state: &ConvState) -> Result<ConvState, TransitionError> {
    match &state.feedback {
        Some(draft) if draft.submitting => Ok(state.clone()),
        _ => Err(TransitionError::InvalidTransition(
            "feedback result without a pending submission".to_string(),
        )),
    }
}

/// Reply text shown to the user for a raw backend `output`.
///
/// Text after the first `Output:` marker wins; without a marker the whole
/// output is used. Blank replies become a request for clarification.
pub fn extract_reply(output: &str) -> String {
    let reply = output
        .split_once(OUTPUT_MARKER)
        .map_or(output, |(_, rest)| rest)
        .trim();

    if reply.is_empty() {
        CLARIFICATION_TEXT.to_string()
    } else {
        reply.to_string()
    }
}
