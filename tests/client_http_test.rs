//! HTTP-level tests for `LillyClient` over the reqwest transport.

mod common;

use std::time::Duration;

use common::{delta_body, text_line};
use lilly::error::LillyError;
use lilly::{LillyClient, LillyConfig};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> LillyClient {
    LillyClient::new(LillyConfig::default().with_base_url(server.uri()))
}

#[tokio::test]
async fn test_stream_chat_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/lilly/chat"))
        .and(query_param("stream", "true"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(serde_json::json!({"message": "How bad is CVE-2021-44228?"})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            delta_body(&["Cri", "tical", ",", " patch", " now", "."]),
            "text/event-stream",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut deltas = Vec::new();
    let reply = client
        .stream_chat("How bad is CVE-2021-44228?", |d| deltas.push(d.to_string()))
        .await
        .unwrap();

    assert_eq!(reply, "Critical, patch now.");
    assert_eq!(deltas.concat(), reply);
}

#[tokio::test]
async fn test_stream_chat_plain_text_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/lilly/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("Rotate\nthe\nkeys.\n", "text/plain; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let reply = client_for(&server).stream_chat("hi", |_| {}).await.unwrap();
    assert_eq!(reply, "Rotate the keys.");
}

#[tokio::test]
async fn test_stream_chat_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/lilly/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model offline"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .stream_chat("hi", |_| {})
        .await
        .unwrap_err();

    match err {
        LillyError::ServerError { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "model offline");
        }
        other => panic!("expected ServerError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connection_refused() {
    let client = LillyClient::new(LillyConfig::default().with_base_url("http://127.0.0.1:1"));
    let err = client.stream_chat("hi", |_| {}).await.unwrap_err();
    assert!(matches!(err, LillyError::Http(_)));
    assert_eq!(err.error_code(), "E_LILLY_HTTP");
}

#[tokio::test]
async fn test_buffered_chat() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/lilly/chat"))
        .and(query_param("stream", "false"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"answer": "Yes."})),
        )
        .mount(&server)
        .await;

    assert_eq!(client_for(&server).chat("Is it exploited?").await.unwrap(), "Yes.");
}

#[tokio::test]
async fn test_enrich_cve() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/lilly/enrich_cve"))
        .and(body_json(serde_json::json!({
            "cve_id": "CVE-2024-3094",
            "cve_description": "Malicious code in xz upstream tarballs"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"answer": "Supply-chain backdoor."})),
        )
        .mount(&server)
        .await;

    let answer = client_for(&server)
        .enrich_cve("CVE-2024-3094", "Malicious code in xz upstream tarballs")
        .await
        .unwrap();
    assert_eq!(answer, "Supply-chain backdoor.");
}

#[tokio::test]
async fn test_stream_enrich_cve() {
    let server = MockServer::start().await;
    let body: String = ["Affects", "liblzma", "versions", "."]
        .iter()
        .map(|t| text_line(t))
        .collect();
    Mock::given(method("POST"))
        .and(path("/api/lilly/enrich_cve"))
        .and(query_param("stream", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/plain"))
        .mount(&server)
        .await;

    let reply = client_for(&server)
        .stream_enrich_cve("CVE-2024-3094", "xz", |_| {})
        .await
        .unwrap();
    assert_eq!(reply, "Affects liblzma versions.");
}

#[tokio::test]
async fn test_clear() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/lilly/clear"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "message": "Chat memory cleared."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server).clear().await.unwrap();
    assert!(response.is_success());
    assert_eq!(response.message, "Chat memory cleared.");
}

#[tokio::test]
async fn test_request_timeout_applies_to_buffered_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/lilly/clear"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"status": "success"}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = LillyClient::new(
        LillyConfig::default()
            .with_base_url(server.uri())
            .with_request_timeout(Duration::from_millis(200)),
    );
    let err = client.clear().await.unwrap_err();
    assert!(matches!(
        err,
        LillyError::Http(lilly::traits::HttpError::Timeout(_))
    ));
}
