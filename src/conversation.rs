//! Conversation state machine and controller
//!
//! Elm-style split: a pure transition function decides what happens, the
//! controller performs the I/O.

mod controller;
mod effect;
pub mod event;
pub mod feedback;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::{ConversationController, ConversationUpdate};
pub(crate) use controller::{Applied, Request};
pub use effect::Effect;
pub use event::Event;
pub use feedback::{FeedbackDraft, Notification, Sentiment, Severity};
pub use state::{Activity, ConvState, Message, Phase, Sender};
pub use transition::{extract_reply, transition, TransitionError};
