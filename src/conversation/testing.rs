//! Mock webhook client and controller integration tests

use crate::webhook::{
    AnswerRequest, AnswerResponse, FeedbackRequest, Inquiry, ResetRequest, WebhookClient,
    WebhookError,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

// ============================================================================
// Mock Webhook Client
// ============================================================================

/// Mock webhook client that returns queued outcomes.
///
/// An empty queue answers with a transport error, like an unreachable
/// backend.
#[derive(Default)]
pub struct MockWebhookClient {
    answers: Mutex<VecDeque<Result<AnswerResponse, WebhookError>>>,
    resets: Mutex<VecDeque<Result<(), WebhookError>>>,
    feedbacks: Mutex<VecDeque<Result<(), WebhookError>>>,
    lead_fails: bool,
    /// When set, lead requests park until notified
    lead_gate: Option<Arc<Notify>>,
    /// When set, answer requests park until notified
    answer_gate: Option<Arc<Notify>>,
    pub answer_requests: Mutex<Vec<AnswerRequest>>,
    pub lead_requests: Mutex<Vec<Inquiry>>,
    pub reset_requests: Mutex<Vec<ResetRequest>>,
    pub feedback_requests: Mutex<Vec<FeedbackRequest>>,
}

impl MockWebhookClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lead requests fail
    pub fn failing_lead(mut self) -> Self {
        self.lead_fails = true;
        self
    }

    /// Lead requests never finish until the gate is notified
    pub fn stalled_lead(mut self, gate: Arc<Notify>) -> Self {
        self.lead_gate = Some(gate);
        self
    }

    /// Answer requests never finish until the gate is notified
    pub fn stalled_answers(mut self, gate: Arc<Notify>) -> Self {
        self.answer_gate = Some(gate);
        self
    }

    /// Drop every queued outcome that no call consumed
    pub fn clear_queues(&self) {
        self.answers.lock().unwrap().clear();
        self.resets.lock().unwrap().clear();
        self.feedbacks.lock().unwrap().clear();
    }

    pub fn queue_answer(&self, output: &str) {
        self.answers.lock().unwrap().push_back(Ok(AnswerResponse {
            output: Some(output.to_string()),
        }));
    }

    pub fn queue_answer_error(&self, error: WebhookError) {
        self.answers.lock().unwrap().push_back(Err(error));
    }

    pub fn queue_reset(&self, result: Result<(), WebhookError>) {
        self.resets.lock().unwrap().push_back(result);
    }

    pub fn queue_feedback(&self, result: Result<(), WebhookError>) {
        self.feedbacks.lock().unwrap().push_back(result);
    }

    pub fn request_count(&self) -> usize {
        self.answer_requests.lock().unwrap().len()
            + self.reset_requests.lock().unwrap().len()
            + self.feedback_requests.lock().unwrap().len()
    }

    fn unreachable() -> WebhookError {
        WebhookError::transport("No mock response queued")
    }
}

#[async_trait]
impl WebhookClient for MockWebhookClient {
    async fn answer(&self, request: &AnswerRequest) -> Result<AnswerResponse, WebhookError> {
        self.answer_requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.answer_gate {
            gate.notified().await;
        }
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::unreachable()))
    }

    async fn lead(&self, inquiry: &Inquiry) -> Result<(), WebhookError> {
        self.lead_requests.lock().unwrap().push(inquiry.clone());
        if let Some(gate) = &self.lead_gate {
            gate.notified().await;
        }
        if self.lead_fails {
            Err(WebhookError::rejected(500, "lead store down"))
        } else {
            Ok(())
        }
    }

    async fn reset(&self, request: &ResetRequest) -> Result<(), WebhookError> {
        self.reset_requests.lock().unwrap().push(request.clone());
        self.resets
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::unreachable()))
    }

    async fn feedback(&self, request: &FeedbackRequest) -> Result<(), WebhookError> {
        self.feedback_requests.lock().unwrap().push(request.clone());
        self.feedbacks
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::unreachable()))
    }
}

// ============================================================================
// Controller integration tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::state::{
        ANSWER_ERROR_TEXT, CHAT_ENDED_TEXT, CLARIFICATION_TEXT, GREETING_TEXT,
    };
    use crate::conversation::{
        ConversationController, ConversationUpdate, Phase, Sender, Sentiment, TransitionError,
    };
    use crate::format::{InlineNode, RenderNode};
    use crate::session::{Session, SessionId};
    use crate::webhook::Thumb;
    use std::time::Duration;

    fn session() -> Session {
        Session::with_id(SessionId::from("session-1".to_string())).with_time_zone("Asia/Karachi")
    }

    async fn controller(
        mock: &Arc<MockWebhookClient>,
    ) -> ConversationController<Arc<MockWebhookClient>> {
        let mut controller = ConversationController::new(session(), Arc::clone(mock));
        controller.greet().await;
        controller
    }

    /// Wait until the detached lead task has recorded its request
    async fn wait_for_lead(mock: &MockWebhookClient, count: usize) {
        for _ in 0..100 {
            if mock.lead_requests.lock().unwrap().len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("lead request was never dispatched");
    }

    #[tokio::test]
    async fn test_greeting_seeds_log() {
        let mock = Arc::new(MockWebhookClient::new());
        let controller = controller(&mock).await;

        assert_eq!(controller.messages().len(), 1);
        assert_eq!(controller.messages()[0].text, GREETING_TEXT);
        assert_eq!(controller.messages()[0].sender, Sender::Bot);
        assert_eq!(controller.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_successful_answer() {
        let mock = Arc::new(MockWebhookClient::new());
        mock.queue_answer("Output: Hi there!");
        let mut controller = ConversationController::new(session(), Arc::clone(&mock));

        controller.send_message("Hello").await.unwrap();

        let msgs = controller.messages();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].sender, Sender::User);
        assert_eq!(msgs[0].text, "Hello");
        assert_eq!(msgs[1].sender, Sender::Bot);
        assert_eq!(msgs[1].text, "Hi there!");
        assert!(!controller.is_typing());

        let requests = mock.answer_requests.lock().unwrap().clone();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].inquiry.text, "Hello");
        assert_eq!(requests[0].inquiry.user_id, "session-1");
        assert_eq!(requests[0].inquiry.time_zone, "Asia/Karachi");

        wait_for_lead(&mock, 1).await;
        assert_eq!(mock.lead_requests.lock().unwrap()[0], requests[0].inquiry);
    }

    #[tokio::test]
    async fn test_answer_failure_appends_error_message() {
        let mock = Arc::new(MockWebhookClient::new());
        mock.queue_answer_error(WebhookError::transport("connection reset"));
        let mut controller = ConversationController::new(session(), Arc::clone(&mock));

        controller.send_message("Hello").await.unwrap();

        let msgs = controller.messages();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[1].sender, Sender::Bot);
        assert_eq!(msgs[1].text, ANSWER_ERROR_TEXT);
        assert!(!controller.is_typing());
    }

    #[tokio::test]
    async fn test_rejected_status_is_same_as_transport_failure() {
        let mock = Arc::new(MockWebhookClient::new());
        mock.queue_answer_error(WebhookError::rejected(502, "bad gateway"));
        let mut controller = ConversationController::new(session(), Arc::clone(&mock));

        controller.send_message("Hello").await.unwrap();
        assert_eq!(controller.messages()[1].text, ANSWER_ERROR_TEXT);
    }

    #[tokio::test]
    async fn test_blank_output_asks_for_clarification() {
        let mock = Arc::new(MockWebhookClient::new());
        mock.queue_answer("Output:   ");
        let mut controller = ConversationController::new(session(), Arc::clone(&mock));

        controller.send_message("?").await.unwrap();
        assert_eq!(controller.messages()[1].text, CLARIFICATION_TEXT);
    }

    #[tokio::test]
    async fn test_blank_messages_do_nothing() {
        let mock = Arc::new(MockWebhookClient::new());
        let mut controller = controller(&mock).await;
        let before = controller.state().clone();

        for text in ["", "   ", "\n\t"] {
            assert_eq!(
                controller.send_message(text).await.unwrap_err(),
                TransitionError::EmptyMessage
            );
        }

        assert_eq!(controller.state(), &before);
        assert_eq!(controller.messages().len(), 1);
        assert_eq!(mock.request_count(), 0);
        assert!(mock.lead_requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lead_failure_is_invisible() {
        let mock = Arc::new(MockWebhookClient::new().failing_lead());
        mock.queue_answer("Output: Fine");
        let mut controller = ConversationController::new(session(), Arc::clone(&mock));

        controller.send_message("Hello").await.unwrap();
        wait_for_lead(&mock, 1).await;

        assert_eq!(controller.messages().len(), 2);
        assert_eq!(controller.messages()[1].text, "Fine");
    }

    #[tokio::test]
    async fn test_stalled_lead_does_not_delay_answer() {
        let gate = Arc::new(Notify::new());
        let mock = Arc::new(MockWebhookClient::new().stalled_lead(Arc::clone(&gate)));
        mock.queue_answer("Output: Quick");
        let mut controller = ConversationController::new(session(), Arc::clone(&mock));

        tokio::time::timeout(Duration::from_secs(2), controller.send_message("Hello"))
            .await
            .expect("answer path must not wait for the lead request")
            .unwrap();

        assert_eq!(controller.messages()[1].text, "Quick");
        assert!(!controller.is_typing());
        gate.notify_waiters();
    }

    #[tokio::test]
    async fn test_reset_success_replaces_log() {
        let mock = Arc::new(MockWebhookClient::new());
        mock.queue_answer("Output: one");
        mock.queue_reset(Ok(()));
        let mut controller = controller(&mock).await;
        controller.send_message("first").await.unwrap();
        assert_eq!(controller.messages().len(), 3);

        let note = controller.reset_conversation().await.unwrap();

        assert!(note.is_success());
        assert_eq!(controller.messages().len(), 1);
        assert_eq!(controller.messages()[0].text, GREETING_TEXT);
        assert!(!controller.has_ended());
        assert!(!controller.is_typing());
        assert_eq!(mock.reset_requests.lock().unwrap()[0].key, "session-1");
    }

    #[tokio::test]
    async fn test_reset_failure_keeps_log() {
        let mock = Arc::new(MockWebhookClient::new());
        mock.queue_answer("Output: one");
        mock.queue_reset(Err(WebhookError::rejected(500, "nope")));
        let mut controller = controller(&mock).await;
        controller.send_message("first").await.unwrap();

        let note = controller.reset_conversation().await.unwrap();

        assert!(!note.is_success());
        assert_eq!(controller.messages().len(), 3);
        assert!(!controller.is_typing());
    }

    #[tokio::test]
    async fn test_feedback_success_ends_chat() {
        let mock = Arc::new(MockWebhookClient::new());
        mock.queue_feedback(Ok(()));
        let mut controller = controller(&mock).await;

        controller.request_end_chat().await.unwrap();
        assert!(controller.feedback().is_some());
        assert!(!controller.has_ended());

        let note = controller
            .submit_feedback(Sentiment::Up, "great")
            .await
            .unwrap();

        assert!(note.is_success());
        assert!(controller.has_ended());
        assert!(controller.feedback().is_none());
        assert_eq!(controller.phase(), Phase::Ended);
        assert_eq!(controller.messages().last().unwrap().text, CHAT_ENDED_TEXT);
        assert!(controller.suggestions().is_empty());

        let request = mock.feedback_requests.lock().unwrap()[0].clone();
        assert_eq!(request.key, "session-1");
        assert_eq!(request.thumb_response, Thumb::Up);
        assert_eq!(request.message, "great");
        assert_eq!(request.time.len(), 5);

        // Ended chats refuse new messages
        assert_eq!(
            controller.send_message("anyone there?").await.unwrap_err(),
            TransitionError::ChatEnded
        );
        assert!(mock.answer_requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_feedback_failure_keeps_chat_live() {
        let mock = Arc::new(MockWebhookClient::new());
        mock.queue_feedback(Err(WebhookError::transport("offline")));
        mock.queue_answer("Output: still here");
        let mut controller = controller(&mock).await;

        controller.request_end_chat().await.unwrap();
        let note = controller
            .submit_feedback(Sentiment::Down, "")
            .await
            .unwrap();

        assert!(!note.is_success());
        assert!(!controller.has_ended());
        assert!(controller.feedback().is_none());
        controller.send_message("hello?").await.unwrap();
        assert_eq!(controller.messages().last().unwrap().text, "still here");
    }

    #[tokio::test]
    async fn test_unset_sentiment_is_refused() {
        let mock = Arc::new(MockWebhookClient::new());
        let mut controller = controller(&mock).await;
        controller.request_end_chat().await.unwrap();

        assert_eq!(
            controller.submit_feedback(Sentiment::Unset, "x").await.unwrap_err(),
            TransitionError::SentimentRequired
        );
        assert!(mock.feedback_requests.lock().unwrap().is_empty());
        assert!(controller.feedback().is_some());

        controller.cancel_feedback().await.unwrap();
        assert!(controller.feedback().is_none());
    }

    #[tokio::test]
    async fn test_reset_after_end_reopens_chat() {
        let mock = Arc::new(MockWebhookClient::new());
        mock.queue_feedback(Ok(()));
        mock.queue_reset(Ok(()));
        mock.queue_answer("Output: welcome back");
        let mut controller = controller(&mock).await;

        controller.submit_feedback(Sentiment::Up, "").await.unwrap();
        assert!(controller.has_ended());

        controller.reset_conversation().await.unwrap();
        assert!(!controller.has_ended());
        controller.send_message("again").await.unwrap();
        assert_eq!(controller.messages().len(), 3);
    }

    #[tokio::test]
    async fn test_updates_are_published() {
        let mock = Arc::new(MockWebhookClient::new());
        mock.queue_answer("Output: **Hi** https://hexaa.ai");
        let mut controller = ConversationController::new(session(), Arc::clone(&mock));
        let mut updates = controller.subscribe();

        controller.send_message("Hello").await.unwrap();

        let mut seen = Vec::new();
        while let Ok(update) = updates.try_recv() {
            seen.push(update);
        }
        assert!(matches!(&seen[0], ConversationUpdate::StateChanged(s) if s.is_typing()));
        assert!(matches!(
            &seen[1],
            ConversationUpdate::MessageAppended(m) if m.sender == Sender::User
        ));
        assert!(matches!(&seen[2], ConversationUpdate::StateChanged(s) if !s.is_typing()));
        let ConversationUpdate::MessageAppended(reply) = &seen[3] else {
            panic!("expected bot reply, got {:?}", seen[3]);
        };
        assert_eq!(
            reply.render(),
            vec![RenderNode::Paragraph(vec![
                InlineNode::Bold("Hi".into()),
                InlineNode::PlainText(" ".into()),
                InlineNode::Link("https://hexaa.ai".into()),
            ])]
        );
    }
}
