//! Integration tests for the HTTP transport using wiremock.

use futures::StreamExt;
use serde_json::json;
use transcript_stream::HttpTransport;
use transcript_types::{ChatRequest, ChatTransport, Event, ThreadId, TransportError};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> ChatRequest {
    ChatRequest::new(ThreadId::new("thread-test"), "hi")
}

fn sse_body(frames: &[serde_json::Value]) -> String {
    frames
        .iter()
        .map(|frame| format!("data: {frame}\n\n"))
        .collect()
}

async fn collect(transport: &HttpTransport) -> Vec<Result<Event, TransportError>> {
    let stream = transport.open(request()).await.expect("open should succeed");
    stream.receiver.collect().await
}

#[tokio::test]
async fn open_posts_thread_and_message_to_chat_endpoint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"thread_id": "thread-test", "message": "hi"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(sse_body(&[json!({"type": "status", "status": "done"})]), "text/event-stream"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new().base_url(mock_server.uri());
    let events = collect(&transport).await;
    assert_eq!(events.len(), 1);
    assert!(events[0].as_ref().expect("event").is_done());
}

#[tokio::test]
async fn open_decodes_token_and_tool_frames_in_order() {
    let mock_server = MockServer::start().await;

    let body = sse_body(&[
        json!({"type": "tool_start", "tool": "calc", "input": {"expr": "1+1"}}),
        json!({"type": "tool_result", "tool": "calc", "result": 2}),
        json!({"type": "token", "content": "="}),
        json!({"type": "status", "status": "done"}),
    ]);
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new().base_url(mock_server.uri());
    let events: Vec<Event> = collect(&transport)
        .await
        .into_iter()
        .map(|e| e.expect("no transport error"))
        .collect();

    assert_eq!(
        events,
        vec![
            Event::ToolStart {
                tool: "calc".into(),
                input: json!({"expr": "1+1"}),
            },
            Event::ToolResult {
                tool: "calc".into(),
                result: json!(2),
            },
            Event::token("="),
            Event::done(),
        ]
    );
}

#[tokio::test]
async fn open_skips_malformed_and_non_data_lines() {
    let mock_server = MockServer::start().await;

    let body = ": keep-alive\n\ndata: {broken\n\ndata: {\"type\":\"token\",\"content\":\"ok\"}\n\n";
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new().base_url(mock_server.uri());
    let events = collect(&transport).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].as_ref().expect("event"), &Event::token("ok"));
}

#[tokio::test]
async fn open_maps_server_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Message cannot be empty"))
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new().base_url(mock_server.uri());
    let err = transport.open(request()).await.expect_err("should fail");
    match err {
        TransportError::Http { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "Message cannot be empty");
        }
        other => panic!("expected Http error, got: {other:?}"),
    }
}

#[tokio::test]
async fn open_treats_no_content_as_missing_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new().base_url(mock_server.uri());
    let err = transport.open(request()).await.expect_err("should fail");
    assert!(matches!(err, TransportError::MissingBody), "got: {err:?}");
}

#[tokio::test]
async fn open_reports_connection_refused_as_network_error() {
    // Port 9 (discard) on localhost is not expected to be listening.
    let transport = HttpTransport::new().base_url("http://127.0.0.1:9");
    let err = transport.open(request()).await.expect_err("should fail");
    assert!(matches!(err, TransportError::Network(_)), "got: {err:?}");
}

#[tokio::test]
async fn custom_chat_path_is_used() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            sse_body(&[json!({"type": "token", "content": "x"})]),
            "text/event-stream",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new()
        .base_url(mock_server.uri())
        .chat_path("/api/v1/chat");
    let events = collect(&transport).await;
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn health_check_accepts_ok_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new().base_url(mock_server.uri());
    transport.check_health().await.expect("healthy");
}

#[tokio::test]
async fn health_check_rejects_unexpected_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "degraded"})))
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new().base_url(mock_server.uri());
    let err = transport.check_health().await.expect_err("unhealthy");
    assert!(matches!(err, TransportError::Http { status: 200, .. }), "got: {err:?}");
}

#[tokio::test]
async fn health_check_maps_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new().base_url(mock_server.uri());
    let err = transport.check_health().await.expect_err("unhealthy");
    assert!(matches!(err, TransportError::Http { status: 503, .. }), "got: {err:?}");
}
