//! Wire types for the webhook endpoints

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Retrieval parameters the answer endpoint expects on every call
const ANSWER_TOP_K: u32 = 3;
const ANSWER_MIN_SCORE: f64 = 0.1;

/// The four webhook operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Answer,
    Lead,
    Reset,
    Feedback,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Answer => "/webhook/answer",
            Endpoint::Lead => "/webhook/lead",
            Endpoint::Reset => "/webhook/reset",
            Endpoint::Feedback => "/webhook/collect-metrics",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Endpoint::Answer => "answer",
            Endpoint::Lead => "lead",
            Endpoint::Reset => "reset",
            Endpoint::Feedback => "feedback",
        }
    }
}

/// User text plus the session context shared by answer and lead calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inquiry {
    pub text: String,
    pub user_id: String,
    pub time_zone: String,
}

/// Body of the answer request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerRequest {
    #[serde(flatten)]
    pub inquiry: Inquiry,
    pub top_k: u32,
    pub min_score: f64,
    pub include_source: bool,
    pub use_query_refinement: bool,
}

impl AnswerRequest {
    pub fn new(inquiry: Inquiry) -> Self {
        Self {
            inquiry,
            top_k: ANSWER_TOP_K,
            min_score: ANSWER_MIN_SCORE,
            include_source: false,
            use_query_refinement: true,
        }
    }
}

/// Successful answer payload; everything besides `output` is ignored
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AnswerResponse {
    #[serde(default)]
    pub output: Option<String>,
}

/// One element of the lead request array
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadEnvelope<'a> {
    pub body: &'a Inquiry,
}

/// Body of the lead request: a one-element array
pub fn lead_body(inquiry: &Inquiry) -> [LeadEnvelope<'_>; 1] {
    [LeadEnvelope { body: inquiry }]
}

/// Body of the reset request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResetRequest {
    pub key: String,
}

/// Thumb rating carried by a feedback submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Thumb {
    Up,
    Down,
}

/// Body of the feedback request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackRequest {
    pub key: String,
    pub thumb_response: Thumb,
    pub message: String,
    /// e.g. "October 18, 2026"
    pub date: String,
    /// 24-hour "HH:MM"
    pub time: String,
    /// e.g. "October 2026"
    #[serde(rename = "monthYear")]
    pub month_year: String,
}

impl FeedbackRequest {
    /// Build a submission stamped with `now`.
    pub fn at<Tz>(
        key: impl Into<String>,
        thumb: Thumb,
        comment: impl Into<String>,
        now: &DateTime<Tz>,
    ) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self {
            key: key.into(),
            thumb_response: thumb,
            message: comment.into(),
            date: now.format("%B %-d, %Y").to_string(),
            time: now.format("%H:%M").to_string(),
            month_year: now.format("%B %Y").to_string(),
        }
    }
}
