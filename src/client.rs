//! Lilly API client.
//!
//! Wraps the chat, CVE and clear endpoints of the Lilly backend. Streaming
//! calls run the response body through a fresh [`StreamSession`] and hand
//! each corrected delta to the caller as it arrives.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::adapters::ReqwestHttpClient;
use crate::config::LillyConfig;
use crate::error::{LillyError, LillyResult};
use crate::models::{ChatAnswer, ChatRequest, ClearResponse, CveRequest};
use crate::stream::{read_stream, StreamSession};
use crate::traits::{Headers, HttpClient, HttpError};

pub const CHAT_PATH: &str = "/api/lilly/chat";
pub const ENRICH_CVE_PATH: &str = "/api/lilly/enrich_cve";
pub const SIMPLIFY_CVE_PATH: &str = "/api/lilly/simplify_cve";
pub const CLEAR_PATH: &str = "/api/lilly/clear";

/// Client for the Lilly backend.
///
/// Generic over the transport so tests can substitute
/// [`crate::adapters::MockHttpClient`].
#[derive(Debug, Clone)]
pub struct LillyClient<C = ReqwestHttpClient> {
    http: C,
    config: LillyConfig,
}

impl LillyClient<ReqwestHttpClient> {
    /// Create a client that talks HTTP through reqwest.
    pub fn new(config: LillyConfig) -> Self {
        let http = ReqwestHttpClient::new().with_request_timeout(config.request_timeout);
        Self { http, config }
    }
}

impl<C: HttpClient> LillyClient<C> {
    /// Create a client over an arbitrary transport.
    pub fn with_http(http: C, config: LillyConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &LillyConfig {
        &self.config
    }

    pub fn http(&self) -> &C {
        &self.http
    }

    /// Send a chat message and stream the reply.
    ///
    /// `sink` receives every corrected delta in order. Returns the full
    /// reconstructed reply once the stream ends.
    ///
    /// # Errors
    ///
    /// Fails on a non-2xx status, a transport error mid-stream, or when the
    /// configured idle timeout elapses between chunks. Deltas already handed
    /// to `sink` stay delivered.
    pub async fn stream_chat<F>(&self, message: &str, sink: F) -> LillyResult<String>
    where
        F: FnMut(&str),
    {
        let url = format!("{}?stream=true", self.config.endpoint(CHAT_PATH));
        self.open_stream(&url, &ChatRequest::new(message), sink).await
    }

    /// Send a chat message and wait for the whole answer.
    pub async fn chat(&self, message: &str) -> LillyResult<String> {
        let url = format!("{}?stream=false", self.config.endpoint(CHAT_PATH));
        let answer: ChatAnswer = self.post_json(&url, &ChatRequest::new(message)).await?;
        Ok(answer.answer)
    }

    /// Ask for an analyst-level write-up of a CVE.
    pub async fn enrich_cve(&self, cve_id: &str, description: &str) -> LillyResult<String> {
        let url = self.config.endpoint(ENRICH_CVE_PATH);
        let answer: ChatAnswer = self
            .post_json(&url, &CveRequest::new(cve_id, description))
            .await?;
        Ok(answer.answer)
    }

    /// Streaming variant of [`Self::enrich_cve`].
    pub async fn stream_enrich_cve<F>(
        &self,
        cve_id: &str,
        description: &str,
        sink: F,
    ) -> LillyResult<String>
    where
        F: FnMut(&str),
    {
        let url = format!("{}?stream=true", self.config.endpoint(ENRICH_CVE_PATH));
        self.open_stream(&url, &CveRequest::new(cve_id, description), sink)
            .await
    }

    /// Ask for a plain-language explanation of a CVE.
    pub async fn simplify_cve(&self, cve_id: &str, description: &str) -> LillyResult<String> {
        let url = self.config.endpoint(SIMPLIFY_CVE_PATH);
        let answer: ChatAnswer = self
            .post_json(&url, &CveRequest::new(cve_id, description))
            .await?;
        Ok(answer.answer)
    }

    /// Streaming variant of [`Self::simplify_cve`].
    pub async fn stream_simplify_cve<F>(
        &self,
        cve_id: &str,
        description: &str,
        sink: F,
    ) -> LillyResult<String>
    where
        F: FnMut(&str),
    {
        let url = format!("{}?stream=true", self.config.endpoint(SIMPLIFY_CVE_PATH));
        self.open_stream(&url, &CveRequest::new(cve_id, description), sink)
            .await
    }

    /// Reset the server-side conversation memory.
    pub async fn clear(&self) -> LillyResult<ClearResponse> {
        let url = self.config.endpoint(CLEAR_PATH);
        self.post_json(&url, &serde_json::json!({})).await
    }

    async fn open_stream<B, F>(&self, url: &str, body: &B, sink: F) -> LillyResult<String>
    where
        B: Serialize + ?Sized,
        F: FnMut(&str),
    {
        let body = serde_json::to_string(body)?;
        let headers = json_headers("text/event-stream");

        tracing::debug!(url = %url, "opening Lilly stream");
        let stream = self
            .http
            .post_stream(url, &body, &headers)
            .await
            .map_err(|e| {
                tracing::warn!(url = %url, error = %e, "failed to open Lilly stream");
                from_transport(e)
            })?;

        let mut session = StreamSession::with_options(self.config.session);
        read_stream(stream, &mut session, self.config.idle_timeout, sink).await?;

        Ok(session.into_output())
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> LillyResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_string(body)?;
        let headers = json_headers("application/json");

        tracing::debug!(url = %url, "POST");
        let response = self
            .http
            .post(url, &body, &headers)
            .await
            .map_err(from_transport)?;

        if !response.is_success() {
            let message = response.text();
            tracing::warn!(url = %url, status = response.status, "Lilly request failed");
            return Err(LillyError::ServerError {
                status: response.status,
                message,
            });
        }

        Ok(response.json()?)
    }
}

fn json_headers(accept: &str) -> Headers {
    let mut headers = Headers::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    headers.insert("Accept".to_string(), accept.to_string());
    headers
}

/// Surface status failures as [`LillyError::ServerError`] rather than a
/// wrapped transport error.
fn from_transport(err: HttpError) -> LillyError {
    match err {
        HttpError::ServerError { status, message } => LillyError::ServerError { status, message },
        other => LillyError::Http(other),
    }
}
