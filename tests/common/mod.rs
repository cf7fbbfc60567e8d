//! Common test utilities for integration tests.
//!
//! Builders for chat response bodies in the shapes the Lilly backend has
//! been seen to emit, plus a preconfigured mock client.

#![allow(dead_code)]

pub use lilly::adapters::{MockHttpClient, MockResponse};
pub use lilly::traits::{HttpError, Response};

use lilly::{LillyClient, LillyConfig};

pub const BASE_URL: &str = "http://lilly.test";

/// One OpenAI-style delta line.
pub fn delta_line(token: &str) -> String {
    format!(
        "data: {}\n",
        serde_json::json!({"choices": [{"delta": {"content": token}}]})
    )
}

/// One flat `{"text": ...}` line.
pub fn text_line(text: &str) -> String {
    format!("data: {}\n", serde_json::json!({ "text": text }))
}

/// Full OpenAI-style body for `tokens`, terminated by `[DONE]`.
pub fn delta_body(tokens: &[&str]) -> String {
    let mut body: String = tokens.iter().map(|t| delta_line(t)).collect();
    body.push_str("data: [DONE]\n");
    body
}

/// Client over a fresh mock transport.
pub fn mock_client() -> LillyClient<MockHttpClient> {
    LillyClient::with_http(
        MockHttpClient::new(),
        LillyConfig::default().with_base_url(BASE_URL),
    )
}
