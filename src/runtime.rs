//! Conversation runtime
//!
//! Puts a [`ConversationController`] behind a single-writer command
//! queue. Front ends send [`Command`]s and watch [`ConversationUpdate`]s.
//! Backend calls run as background tasks whose outcome events come back
//! through a second channel, so commands keep flowing through the state
//! machine while a request is outstanding and are refused there when the
//! conversation is busy.

use crate::conversation::{
    Applied, ConversationController, ConversationUpdate, Event, Request, Sentiment,
};
use crate::webhook::WebhookClient;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

const COMMAND_CHANNEL_CAPACITY: usize = 32;
const OUTCOME_CHANNEL_CAPACITY: usize = 8;

/// User actions a front end can queue
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SendMessage(String),
    Reset,
    EndChat,
    SubmitFeedback { sentiment: Sentiment, comment: String },
    CancelFeedback,
}

impl From<Command> for Event {
    fn from(command: Command) -> Self {
        match command {
            Command::SendMessage(text) => Event::UserMessage { text },
            Command::Reset => Event::ResetRequested,
            Command::EndChat => Event::EndChatRequested,
            Command::SubmitFeedback { sentiment, comment } => {
                Event::FeedbackSubmitted { sentiment, comment }
            }
            Command::CancelFeedback => Event::FeedbackCancelled,
        }
    }
}

#[derive(Debug, Error)]
#[error("Conversation runtime has stopped")]
pub struct RuntimeStopped;

/// Handle to interact with a running conversation.
///
/// Once every handle is dropped the runtime finishes the requests already
/// in flight and stops.
#[derive(Clone)]
pub struct ConversationHandle {
    command_tx: mpsc::Sender<Command>,
    update_tx: broadcast::Sender<ConversationUpdate>,
}

impl ConversationHandle {
    pub async fn send(&self, command: Command) -> Result<(), RuntimeStopped> {
        self.command_tx.send(command).await.map_err(|_| RuntimeStopped)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConversationUpdate> {
        self.update_tx.subscribe()
    }
}

/// Task that owns the controller
pub struct ConversationRuntime<C>
where
    C: WebhookClient + 'static,
{
    controller: ConversationController<C>,
    command_rx: mpsc::Receiver<Command>,
    outcome_tx: mpsc::Sender<Event>,
    outcome_rx: mpsc::Receiver<Event>,
    greeting_delay: Duration,
    in_flight: usize,
}

impl<C> ConversationRuntime<C>
where
    C: WebhookClient + 'static,
{
    /// Spawn the runtime; the greeting appears after `greeting_delay`.
    ///
    /// Subscribe through the returned handle before the delay elapses to
    /// see the greeting. The join handle resolves once the runtime stops.
    pub fn spawn(
        controller: ConversationController<C>,
        greeting_delay: Duration,
    ) -> (ConversationHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (outcome_tx, outcome_rx) = mpsc::channel(OUTCOME_CHANNEL_CAPACITY);
        let handle = ConversationHandle {
            command_tx,
            update_tx: controller.update_sender(),
        };

        let runtime = Self {
            controller,
            command_rx,
            outcome_tx,
            outcome_rx,
            greeting_delay,
            in_flight: 0,
        };
        let task = tokio::spawn(runtime.run());

        (handle, task)
    }

    async fn run(mut self) {
        let session_id = self.controller.session().id().clone();
        tracing::info!(session_id = %session_id, "Starting conversation runtime");

        if !self.greeting_delay.is_zero() {
            tokio::time::sleep(self.greeting_delay).await;
        }
        self.apply_outcome(Event::Greet);

        let mut accepting = true;
        loop {
            tokio::select! {
                Some(event) = self.outcome_rx.recv() => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    self.apply_outcome(event);
                }
                command = self.command_rx.recv(), if accepting => match command {
                    Some(command) => self.apply_command(command),
                    None => accepting = false,
                },
                else => break,
            }

            if !accepting && self.in_flight == 0 {
                break;
            }
        }

        tracing::info!(session_id = %session_id, "Conversation runtime stopped");
    }

    fn apply_command(&mut self, command: Command) {
        tracing::debug!(?command, "Applying command");
        match self.controller.apply(command.into()) {
            Ok(applied) => self.dispatch(applied),
            Err(e) => {
                tracing::debug!(error = %e, "Command rejected");
                let _ = self
                    .controller
                    .update_sender()
                    .send(ConversationUpdate::Rejected(e.to_string()));
            }
        }
    }

    fn apply_outcome(&mut self, event: Event) {
        match self.controller.apply(event) {
            Ok(applied) => self.dispatch(applied),
            Err(e) => tracing::warn!(error = %e, "Dropped event the state machine refused"),
        }
    }

    /// Run each backend call in the background; its outcome comes back as
    /// an event on the outcome channel.
    fn dispatch(&mut self, applied: Applied) {
        for request in applied.requests {
            self.spawn_request(request);
        }
    }

    fn spawn_request(&mut self, request: Request) {
        self.in_flight += 1;
        let client = self.controller.client();
        let outcome_tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let event = request.perform(&*client).await;
            let _ = outcome_tx.send(event).await;
        });
    }
}
