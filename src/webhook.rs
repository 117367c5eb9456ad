//! Webhook backend transport
//!
//! The conversation controller only sees the [`WebhookClient`] trait; the
//! reqwest implementation and the logging decorator live here too.

mod error;
mod http;
mod types;

pub use error::{WebhookError, WebhookErrorKind};
pub use http::HttpWebhookClient;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Transport for the four webhook operations
#[async_trait]
pub trait WebhookClient: Send + Sync {
    /// Ask the backend for a reply
    async fn answer(&self, request: &AnswerRequest) -> Result<AnswerResponse, WebhookError>;

    /// Record the inquiry for lead tracking
    async fn lead(&self, inquiry: &Inquiry) -> Result<(), WebhookError>;

    /// Drop the backend-side conversation for a session
    async fn reset(&self, request: &ResetRequest) -> Result<(), WebhookError>;

    /// Submit end-of-chat feedback
    async fn feedback(&self, request: &FeedbackRequest) -> Result<(), WebhookError>;
}

#[async_trait]
impl<T: WebhookClient + ?Sized> WebhookClient for Arc<T> {
    async fn answer(&self, request: &AnswerRequest) -> Result<AnswerResponse, WebhookError> {
        (**self).answer(request).await
    }

    async fn lead(&self, inquiry: &Inquiry) -> Result<(), WebhookError> {
        (**self).lead(inquiry).await
    }

    async fn reset(&self, request: &ResetRequest) -> Result<(), WebhookError> {
        (**self).reset(request).await
    }

    async fn feedback(&self, request: &FeedbackRequest) -> Result<(), WebhookError> {
        (**self).feedback(request).await
    }
}

/// Logging wrapper for webhook clients
pub struct LoggingClient<C> {
    inner: C,
}

impl<C: WebhookClient> LoggingClient<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    fn record<T>(endpoint: Endpoint, started: Instant, result: &Result<T, WebhookError>) {
        let duration_ms = started.elapsed().as_millis();
        match result {
            Ok(_) => {
                tracing::info!(
                    endpoint = endpoint.name(),
                    duration_ms = %duration_ms,
                    "Webhook request completed"
                );
            }
            // Lead failures never reach the user; keep them out of warn-level logs too
            Err(e) if endpoint == Endpoint::Lead => {
                tracing::debug!(
                    endpoint = endpoint.name(),
                    duration_ms = %duration_ms,
                    error = %e.message,
                    "Lead request failed"
                );
            }
            Err(e) => {
                tracing::warn!(
                    endpoint = endpoint.name(),
                    duration_ms = %duration_ms,
                    kind = e.kind.as_str(),
                    status = ?e.status,
                    error = %e.message,
                    "Webhook request failed"
                );
            }
        }
    }
}

#[async_trait]
impl<C: WebhookClient> WebhookClient for LoggingClient<C> {
    async fn answer(&self, request: &AnswerRequest) -> Result<AnswerResponse, WebhookError> {
        let started = Instant::now();
        let result = self.inner.answer(request).await;
        Self::record(Endpoint::Answer, started, &result);
        result
    }

    async fn lead(&self, inquiry: &Inquiry) -> Result<(), WebhookError> {
        let started = Instant::now();
        let result = self.inner.lead(inquiry).await;
        Self::record(Endpoint::Lead, started, &result);
        result
    }

    async fn reset(&self, request: &ResetRequest) -> Result<(), WebhookError> {
        let started = Instant::now();
        let result = self.inner.reset(request).await;
        Self::record(Endpoint::Reset, started, &result);
        result
    }

    async fn feedback(&self, request: &FeedbackRequest) -> Result<(), WebhookError> {
        let started = Instant::now();
        let result = self.inner.feedback(request).await;
        Self::record(Endpoint::Feedback, started, &result);
        result
    }
}
