//! Hexaa chat - terminal client for the Hexaa assistant
//!
//! Reads lines from stdin, talks to the webhook backend and prints the
//! conversation as it changes.

use hexaa_chat::config::ChatConfig;
use hexaa_chat::conversation::state::SUGGESTIONS;
use hexaa_chat::conversation::{
    ConvState, ConversationController, ConversationUpdate, Sender, Severity,
};
use hexaa_chat::runtime::{Command, ConversationRuntime};
use hexaa_chat::session::Session;
use hexaa_chat::terminal::{self, Input, HELP_TEXT};
use hexaa_chat::webhook::{HttpWebhookClient, LoggingClient};
use std::io::IsTerminal;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they never interleave with the transcript
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hexaa_chat=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ChatConfig::from_env()?;

    let mut session = match &config.session_file {
        Some(path) => Session::load_or_create(path)?,
        None => Session::new(),
    };
    if let Some(tz) = &config.time_zone {
        session = session.with_time_zone(tz.clone());
    }
    tracing::info!(
        session_id = %session.id(),
        base_url = %config.api_base_url,
        "Starting chat session"
    );

    let client = LoggingClient::new(HttpWebhookClient::new(
        &config.api_base_url,
        config.request_timeout,
    )?);
    let controller = ConversationController::new(session, client);

    let (handle, runtime) = ConversationRuntime::spawn(controller, config.greeting_delay);
    let updates = handle.subscribe();
    let ansi = std::io::stdout().is_terminal();
    let printer = tokio::spawn(print_updates(updates, ansi));

    println!("Type /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match terminal::parse_input(&line) {
            Input::Empty => continue,
            Input::Message(text) => Command::SendMessage(text),
            Input::Suggestion(idx) => match SUGGESTIONS.get(idx) {
                Some(text) => Command::SendMessage((*text).to_string()),
                None => continue,
            },
            Input::Reset => Command::Reset,
            Input::EndChat => Command::EndChat,
            Input::Feedback { sentiment, comment } => {
                Command::SubmitFeedback { sentiment, comment }
            }
            Input::CancelFeedback => Command::CancelFeedback,
            Input::Help => {
                println!("{HELP_TEXT}");
                continue;
            }
            Input::Quit => {
                printer.abort();
                return Ok(());
            }
            Input::Unknown(input) => {
                println!("Unknown command: {input} (try /help)");
                continue;
            }
        };

        if handle.send(command).await.is_err() {
            tracing::warn!("Conversation runtime stopped unexpectedly");
            break;
        }
    }

    // End of input: let outstanding requests finish and show their results
    drop(handle);
    runtime.await?;
    printer.await?;
    Ok(())
}

async fn print_updates(mut updates: broadcast::Receiver<ConversationUpdate>, ansi: bool) {
    let mut last_state = ConvState::default();

    loop {
        let update = match updates.recv().await {
            Ok(update) => update,
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Display fell behind, some updates were dropped");
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        match update {
            ConversationUpdate::MessageAppended(message) => {
                println!("{}\n", terminal::render_message(&message, ansi));
                if message.sender == Sender::Bot {
                    print_suggestions(&last_state);
                }
            }
            ConversationUpdate::LogReplaced(messages) => {
                println!("--- chat cleared ---\n");
                for message in &messages {
                    println!("{}\n", terminal::render_message(message, ansi));
                }
                print_suggestions(&last_state);
            }
            ConversationUpdate::StateChanged(state) => {
                print_state_change(&last_state, &state);
                last_state = state;
            }
            ConversationUpdate::Notification(note) => match note.severity {
                Severity::Success => println!("✓ {}", note.message),
                Severity::Error => println!("✗ {}", note.message),
            },
            ConversationUpdate::Rejected(reason) => println!("! {reason}"),
        }
    }
}

fn print_state_change(before: &ConvState, after: &ConvState) {
    if after.is_typing() && !before.is_typing() {
        println!("Hexaa AI is typing...");
    }

    if before.feedback.is_none() && after.feedback.is_some() {
        println!("How was your chat? Reply /up or /down with an optional comment, or /cancel.");
    }
}

/// State changes land before the reply they belong to, so this runs
/// after each bot message.
fn print_suggestions(state: &ConvState) {
    for (idx, text) in state.suggestions().iter().enumerate() {
        println!("  /{} {text}", idx + 1);
    }
}
