//! Conversation controller
//!
//! Owns the message log and the [`ConvState`], feeds events through the
//! pure [`transition`] function and executes the resulting effects
//! against the webhook transport.

use super::feedback::{FeedbackDraft, Notification, Sentiment};
use super::state::{ConvState, Message, Phase};
use super::transition::{transition, TransitionError};
use super::{Effect, Event};
use crate::session::Session;
use crate::webhook::{AnswerRequest, FeedbackRequest, Inquiry, ResetRequest, WebhookClient};
use chrono::Local;
use std::sync::Arc;
use tokio::sync::broadcast;

const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// Updates published to front ends
#[derive(Debug, Clone)]
pub enum ConversationUpdate {
    MessageAppended(Message),
    LogReplaced(Vec<Message>),
    StateChanged(ConvState),
    Notification(Notification),
    /// A command was refused without touching state
    Rejected(String),
}

pub struct ConversationController<C>
where
    C: WebhookClient + 'static,
{
    session: Session,
    client: Arc<C>,
    state: ConvState,
    messages: Vec<Message>,
    updates: broadcast::Sender<ConversationUpdate>,
}

impl<C> ConversationController<C>
where
    C: WebhookClient + 'static,
{
    pub fn new(session: Session, client: C) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            session,
            client: Arc::new(client),
            state: ConvState::default(),
            messages: Vec::new(),
            updates,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConversationUpdate> {
        self.updates.subscribe()
    }

    pub(crate) fn update_sender(&self) -> broadcast::Sender<ConversationUpdate> {
        self.updates.clone()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn state(&self) -> &ConvState {
        &self.state
    }

    pub fn is_typing(&self) -> bool {
        self.state.is_typing()
    }

    pub fn has_ended(&self) -> bool {
        self.state.has_ended
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn feedback(&self) -> Option<&FeedbackDraft> {
        self.state.feedback.as_ref()
    }

    pub fn suggestions(&self) -> &'static [&'static str] {
        self.state.suggestions()
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Seed the log with the greeting
    pub async fn greet(&mut self) {
        if let Err(e) = self.process(Event::Greet).await {
            tracing::error!(error = %e, "Failed to seed greeting");
        }
    }

    /// Send a user message and wait for the assistant's reply.
    ///
    /// Blank text, an ended chat and an in-flight request are refused
    /// without any state change or network traffic.
    pub async fn send_message(&mut self, text: &str) -> Result<(), TransitionError> {
        self.process(Event::UserMessage {
            text: text.to_string(),
        })
        .await
        .map(drop)
    }

    /// Clear the conversation on the backend and start over.
    pub async fn reset_conversation(&mut self) -> Result<Notification, TransitionError> {
        let notes = self.process(Event::ResetRequested).await?;
        first_notification(notes)
    }

    /// Open the feedback dialog
    pub async fn request_end_chat(&mut self) -> Result<(), TransitionError> {
        self.process(Event::EndChatRequested).await.map(drop)
    }

    /// Submit feedback; success ends the chat.
    pub async fn submit_feedback(
        &mut self,
        sentiment: Sentiment,
        comment: &str,
    ) -> Result<Notification, TransitionError> {
        let notes = self
            .process(Event::FeedbackSubmitted {
                sentiment,
                comment: comment.to_string(),
            })
            .await?;
        first_notification(notes)
    }

    /// Close the feedback dialog without submitting
    pub async fn cancel_feedback(&mut self) -> Result<(), TransitionError> {
        self.process(Event::FeedbackCancelled).await.map(drop)
    }

    // ========================================================================
    // Event loop
    // ========================================================================

    /// Run an event and every event its requests produce, awaiting each
    /// backend call in turn.
    async fn process(&mut self, event: Event) -> Result<Vec<Notification>, TransitionError> {
        let mut notifications = Vec::new();
        let mut events_to_process = vec![event];

        while let Some(current_event) = events_to_process.pop() {
            let applied = self.apply(current_event)?;
            notifications.extend(applied.notifications);

            for request in applied.requests {
                events_to_process.push(request.perform(&*self.client).await);
            }
        }

        Ok(notifications)
    }

    /// Apply one event without performing any backend call.
    ///
    /// Local effects run immediately and the lead request is spawned; the
    /// remaining backend calls come back as [`Request`]s whose outcome
    /// event must be fed back in.
    pub(crate) fn apply(&mut self, event: Event) -> Result<Applied, TransitionError> {
        let result = transition(&self.state, event)?;

        if result.new_state != self.state {
            self.state = result.new_state;
            self.publish(ConversationUpdate::StateChanged(self.state.clone()));
        }

        let mut applied = Applied::default();
        for effect in result.effects {
            self.execute_effect(effect, &mut applied);
        }
        Ok(applied)
    }

    pub(crate) fn client(&self) -> Arc<C> {
        Arc::clone(&self.client)
    }

    fn execute_effect(&mut self, effect: Effect, applied: &mut Applied) {
        match effect {
            Effect::AppendMessage { sender, text } => {
                let message = Message::new(sender, text);
                self.messages.push(message.clone());
                self.publish(ConversationUpdate::MessageAppended(message));
            }

            Effect::ReplaceLog { text } => {
                self.messages = vec![Message::bot(text)];
                self.publish(ConversationUpdate::LogReplaced(self.messages.clone()));
            }

            Effect::DispatchInquiry { text } => {
                let inquiry = Inquiry {
                    text,
                    user_id: self.session.id().to_string(),
                    time_zone: self.session.time_zone(),
                };
                tracing::info!(
                    session_id = %self.session.id(),
                    chars = inquiry.text.chars().count(),
                    "Sending user message"
                );

                // Lead outcome is never inspected and never awaited
                let client = Arc::clone(&self.client);
                let lead_inquiry = inquiry.clone();
                tokio::spawn(async move {
                    let _ = client.lead(&lead_inquiry).await;
                });

                applied.requests.push(Request::Answer(AnswerRequest::new(inquiry)));
            }

            Effect::DispatchReset => {
                applied.requests.push(Request::Reset(ResetRequest {
                    key: self.session.id().to_string(),
                }));
            }

            Effect::DispatchFeedback { thumb, comment } => {
                let key = self.session.id().to_string();
                let request = FeedbackRequest::at(key, thumb, comment, &Local::now());
                applied.requests.push(Request::Feedback(request));
            }

            Effect::Notify(notification) => {
                applied.notifications.push(notification.clone());
                self.publish(ConversationUpdate::Notification(notification));
            }
        }
    }

    fn publish(&self, update: ConversationUpdate) {
        // No subscribers is fine
        let _ = self.updates.send(update);
    }
}

/// Backend call decided by a transition but not yet performed
#[derive(Debug)]
pub(crate) enum Request {
    Answer(AnswerRequest),
    Reset(ResetRequest),
    Feedback(FeedbackRequest),
}

impl Request {
    /// Perform the call and turn its outcome into the follow-up event.
    pub(crate) async fn perform<C>(self, client: &C) -> Event
    where
        C: WebhookClient + ?Sized,
    {
        match self {
            Request::Answer(request) => match client.answer(&request).await {
                Ok(response) => Event::AnswerReceived {
                    output: response.output.unwrap_or_default(),
                },
                Err(e) => Event::AnswerFailed { message: e.message },
            },
            Request::Reset(request) => match client.reset(&request).await {
                Ok(()) => Event::ResetSucceeded,
                Err(e) => Event::ResetFailed { message: e.message },
            },
            Request::Feedback(request) => match client.feedback(&request).await {
                Ok(()) => Event::FeedbackSucceeded,
                Err(e) => Event::FeedbackFailed { message: e.message },
            },
        }
    }
}

/// What applying one event left to do
#[derive(Debug, Default)]
pub(crate) struct Applied {
    pub requests: Vec<Request>,
    pub notifications: Vec<Notification>,
}

fn first_notification(notes: Vec<Notification>) -> Result<Notification, TransitionError> {
    notes.into_iter().next().ok_or_else(|| {
        TransitionError::InvalidTransition("request settled without an outcome".to_string())
    })
}
