//! Terminal front end helpers
//!
//! Renders messages as text and maps input lines onto user actions.

use crate::conversation::{Message, Sender, Sentiment};
use crate::format::{InlineNode, RenderNode};
use chrono::Local;

/// Longest message the input line accepts, in characters
pub const MAX_INPUT_CHARS: usize = 500;

const BOLD: &str = "\x1b[1m";
const UNDERLINE: &str = "\x1b[4m";
const RESET: &str = "\x1b[0m";

pub const HELP_TEXT: &str = "\
Commands:
  <text>             send a message
  /1 /2 /3           send a suggested prompt
  /reset             clear the chat
  /end               end the chat and leave feedback
  /up [comment]      thumbs up feedback
  /down [comment]    thumbs down feedback
  /cancel            close the feedback prompt
  /help              show this help
  /quit              exit";

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Empty,
    Message(String),
    /// Index into the suggestion list, zero based
    Suggestion(usize),
    Reset,
    EndChat,
    Feedback { sentiment: Sentiment, comment: String },
    CancelFeedback,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }

    let Some(command) = line.strip_prefix('/') else {
        return Input::Message(line.chars().take(MAX_INPUT_CHARS).collect());
    };

    let (name, rest) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };

    match name {
        "1" | "2" | "3" => name
            .parse::<usize>()
            .map_or_else(|_| Input::Unknown(line.to_string()), |n| Input::Suggestion(n - 1)),
        "reset" => Input::Reset,
        "end" => Input::EndChat,
        "up" => Input::Feedback {
            sentiment: Sentiment::Up,
            comment: rest.to_string(),
        },
        "down" => Input::Feedback {
            sentiment: Sentiment::Down,
            comment: rest.to_string(),
        },
        "cancel" => Input::CancelFeedback,
        "help" => Input::Help,
        "quit" | "exit" => Input::Quit,
        _ => Input::Unknown(line.to_string()),
    }
}

/// Render formatted nodes as terminal text
pub fn render_nodes(nodes: &[RenderNode], ansi: bool) -> String {
    let blocks: Vec<String> = nodes
        .iter()
        .map(|node| match node {
            RenderNode::Paragraph(children) => render_inline(children, ansi),
            RenderNode::BulletList(items) => items
                .iter()
                .map(|item| format!("  • {}", render_inline(item, ansi)))
                .collect::<Vec<_>>()
                .join("\n"),
        })
        .collect();
    blocks.join("\n\n")
}

fn render_inline(nodes: &[InlineNode], ansi: bool) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            InlineNode::PlainText(text) => out.push_str(text),
            InlineNode::Bold(text) if ansi => {
                out.push_str(BOLD);
                out.push_str(text);
                out.push_str(RESET);
            }
            InlineNode::Link(url) if ansi => {
                out.push_str(UNDERLINE);
                out.push_str(url);
                out.push_str(RESET);
            }
            InlineNode::Bold(text) | InlineNode::Link(text) => out.push_str(text),
            InlineNode::LineBreak => out.push('\n'),
        }
    }
    out
}

/// Render one log entry with its local timestamp
pub fn render_message(message: &Message, ansi: bool) -> String {
    let time = message.timestamp.with_timezone(&Local).format("%I:%M %p");
    let label = match message.sender {
        Sender::User => "You",
        Sender::Bot => "Hexaa AI",
    };
    let body = render_nodes(&message.render(), ansi);
    format!("[{time}] {label}:\n{body}")
}
