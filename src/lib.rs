//! Hexaa chat client core
//!
//! Conversation state machine, reply formatting and the webhook transport
//! behind the Hexaa assistant chat, plus a line-oriented terminal front end.

#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

pub mod config;
pub mod conversation;
pub mod format;
pub mod runtime;
pub mod session;
pub mod terminal;
pub mod webhook;
