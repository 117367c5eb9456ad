//! reqwest-backed webhook client

use super::types::{
    lead_body, AnswerRequest, AnswerResponse, Endpoint, FeedbackRequest, Inquiry, ResetRequest,
};
use super::{WebhookClient, WebhookError};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use std::time::Duration;

/// Webhook client speaking JSON over HTTP
pub struct HttpWebhookClient {
    client: Client,
    base_url: String,
}

impl HttpWebhookClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, WebhookError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WebhookError::transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// POST a JSON body; any non-2xx status is a rejection.
    async fn post<B: Serialize + ?Sized + Sync>(
        &self,
        endpoint: Endpoint,
        body: &B,
    ) -> Result<Response, WebhookError> {
        let response = self
            .client
            .post(self.url(endpoint))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WebhookError::transport(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    WebhookError::transport(format!("Connection failed: {e}"))
                } else {
                    WebhookError::transport(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WebhookError::rejected(
                status.as_u16(),
                format!("HTTP {status}: {body}"),
            ));
        }

        Ok(response)
    }
}

#[async_trait]
impl WebhookClient for HttpWebhookClient {
    async fn answer(&self, request: &AnswerRequest) -> Result<AnswerResponse, WebhookError> {
        let response = self.post(Endpoint::Answer, request).await?;
        let body = response
            .text()
            .await
            .map_err(|e| WebhookError::transport(format!("Failed to read response: {e}")))?;

        serde_json::from_str(&body).map_err(|e| {
            WebhookError::transport(format!("Failed to parse response: {e} - body: {body}"))
        })
    }

    async fn lead(&self, inquiry: &Inquiry) -> Result<(), WebhookError> {
        self.post(Endpoint::Lead, &lead_body(inquiry)).await?;
        Ok(())
    }

    async fn reset(&self, request: &ResetRequest) -> Result<(), WebhookError> {
        self.post(Endpoint::Reset, request).await?;
        Ok(())
    }

    async fn feedback(&self, request: &FeedbackRequest) -> Result<(), WebhookError> {
        self.post(Endpoint::Feedback, request).await?;
        Ok(())
    }
}
