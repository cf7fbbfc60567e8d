//! In-memory message list for one chat surface.
//!
//! A [`Conversation`] holds the messages shown to the user and at most one
//! assistant reply that is still streaming in. The reply is a placeholder
//! message whose content grows with each delta.

use crate::client::LillyClient;
use crate::error::{LillyResult, STREAM_FAILURE_NOTICE};
use crate::models::{ChatMessage, MessageRole};
use crate::traits::HttpClient;

#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    /// Index of the assistant placeholder while a reply is in flight
    pending: Option<usize>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Whether an assistant reply is currently streaming.
    pub fn is_in_flight(&self) -> bool {
        self.pending.is_some()
    }

    /// Push the user message and an empty assistant placeholder.
    ///
    /// Returns the trimmed message to send, or `None` when the input is blank
    /// or a reply is already in flight.
    pub fn begin_reply(&mut self, text: &str) -> Option<String> {
        let message = text.trim();
        if message.is_empty() {
            return None;
        }
        if self.is_in_flight() {
            tracing::debug!("send ignored, reply already in flight");
            return None;
        }

        self.messages.push(ChatMessage::user(message));
        self.messages.push(ChatMessage::assistant_placeholder());
        self.pending = Some(self.messages.len() - 1);
        Some(message.to_string())
    }

    /// Append a corrected delta to the in-flight reply.
    pub fn push_delta(&mut self, delta: &str) {
        if let Some(msg) = self.pending_mut() {
            msg.content.push_str(delta);
        }
    }

    /// Mark the in-flight reply as complete.
    pub fn finish_reply(&mut self) {
        self.pending = None;
    }

    /// Replace the in-flight reply with the failure notice.
    ///
    /// Earlier messages are left alone.
    pub fn fail_reply(&mut self) {
        if let Some(msg) = self.pending_mut() {
            msg.content = STREAM_FAILURE_NOTICE.to_string();
        }
        self.pending = None;
    }

    /// Send `text` and stream the reply into the conversation.
    ///
    /// Returns `Ok(false)` if the send was ignored.
    pub async fn send<C: HttpClient>(
        &mut self,
        client: &LillyClient<C>,
        text: &str,
    ) -> LillyResult<bool> {
        self.send_with(client, text, |_| {}).await
    }

    /// Like [`Self::send`], also passing each delta to `on_delta`.
    pub async fn send_with<C, F>(
        &mut self,
        client: &LillyClient<C>,
        text: &str,
        mut on_delta: F,
    ) -> LillyResult<bool>
    where
        C: HttpClient,
        F: FnMut(&str),
    {
        let Some(message) = self.begin_reply(text) else {
            return Ok(false);
        };

        let result = client
            .stream_chat(&message, |delta| {
                self.push_delta(delta);
                on_delta(delta);
            })
            .await;

        match result {
            Ok(_) => {
                self.finish_reply();
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(error = %e, code = e.error_code(), "chat reply failed");
                self.fail_reply();
                Err(e)
            }
        }
    }

    /// Clear local messages, then ask the server to forget the conversation.
    ///
    /// Server failures are logged and otherwise ignored.
    pub async fn clear<C: HttpClient>(&mut self, client: &LillyClient<C>) {
        self.messages.clear();
        self.pending = None;

        match client.clear().await {
            Ok(response) if response.is_success() => {
                tracing::debug!(message = %response.message, "server memory cleared");
            }
            Ok(response) => {
                tracing::warn!(status = %response.status, "server did not confirm clear");
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to clear server memory");
            }
        }
    }

    fn pending_mut(&mut self) -> Option<&mut ChatMessage> {
        let idx = self.pending?;
        self.messages
            .get_mut(idx)
            .filter(|msg| msg.role == MessageRole::Assistant)
    }
}
