//! Integration tests for the retrying transport
//!
//! **Coverage:**
//! - Throttling and gateway failures (429/502/503/504) are retried
//! - Success, client errors and plain 500s are returned after one request
//! - An exhausted retry budget surfaces the final status and body
//! - An unreadable error body is reported in the error instead of dropped
//! - PATCH is never retried
//! - Default headers (auth, user agent, gzip) are sent
//!
//! The blocking client runs on `spawn_blocking`; the mock server lives on the
//! test runtime.

#![allow(dead_code)]

#[path = "support.rs"]
mod support;

use std::sync::atomic::Ordering;

use pingintel_domain::{PingError, SOVFIXER};
use serde_json::{json, Value};
use support::{client_for, Sequence, TEST_TOKEN};
use wiremock::matchers::{header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn hits_for_status(status: u16, max_retries: u32) -> (Result<Value, PingError>, usize) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sov/activity"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;

    let uri = server.uri();
    let result = tokio::task::spawn_blocking(move || {
        let client = client_for(SOVFIXER, &uri, max_retries);
        client.get_json::<Value>("/api/v1/sov/activity", Vec::new())
    })
    .await
    .expect("blocking task should not panic");

    let hits = server.received_requests().await.map(|requests| requests.len()).unwrap_or(0);
    (result, hits)
}

#[tokio::test(flavor = "multi_thread")]
async fn retryable_statuses_use_the_whole_budget() {
    for status in [429, 502, 503, 504] {
        let (result, hits) = hits_for_status(status, 3).await;
        assert_eq!(hits, 4, "status {status} should be attempted 1 + 3 times");
        match result {
            Err(PingError::Transport { status: got, .. }) => assert_eq!(got, status),
            other => panic!("expected transport error for {status}, got {other:?}"),
        }
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn other_statuses_are_not_retried() {
    let (result, hits) = hits_for_status(200, 3).await;
    assert_eq!(hits, 1);
    assert!(result.is_ok());

    for status in [400, 401, 404, 500] {
        let (result, hits) = hits_for_status(status, 3).await;
        assert_eq!(hits, 1, "status {status} should not be retried");
        assert!(matches!(result, Err(PingError::Transport { status: got, .. }) if got == status));
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn recovers_after_transient_failures() {
    let server = MockServer::start().await;
    let (responder, calls) = Sequence::new(vec![
        ResponseTemplate::new(503),
        ResponseTemplate::new(429).insert_header("Retry-After", "1"),
        ResponseTemplate::new(200).set_body_json(json!({"results": [], "cursor_id": null})),
    ]);
    Mock::given(method("GET"))
        .and(path("/api/v1/sov/activity"))
        .respond_with(responder)
        .mount(&server)
        .await;

    let uri = server.uri();
    let result = tokio::task::spawn_blocking(move || {
        client_for(SOVFIXER, &uri, 5).get_json::<Value>("/api/v1/sov/activity", Vec::new())
    })
    .await
    .expect("blocking task should not panic");

    assert!(result.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn exhausted_budget_reports_final_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/sov"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = tokio::task::spawn_blocking(move || {
        client_for(SOVFIXER, &uri, 2).post_json::<Value>("/api/v1/sov", json!({})).unwrap_err()
    })
    .await
    .expect("blocking task should not panic");

    match err {
        PingError::Transport { status, body } => {
            assert_eq!(status, 502);
            assert_eq!(body, "bad gateway");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(server.received_requests().await.map(|r| r.len()), Some(3));
}

#[tokio::test(flavor = "multi_thread")]
async fn unreadable_error_body_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sov/activity"))
        .respond_with(
            ResponseTemplate::new(400)
                .insert_header("Content-Encoding", "gzip")
                .set_body_bytes(b"definitely not gzip".to_vec()),
        )
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = tokio::task::spawn_blocking(move || {
        client_for(SOVFIXER, &uri, 0)
            .get_json::<Value>("/api/v1/sov/activity", Vec::new())
            .unwrap_err()
    })
    .await
    .expect("blocking task should not panic");

    match err {
        PingError::Transport { status, body } => {
            assert_eq!(status, 400);
            assert!(body.starts_with("<failed to read response body"), "body: {body}");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn patch_is_sent_once() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/submission/p-1"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let uri = server.uri();
    let result = tokio::task::spawn_blocking(move || {
        client_for(SOVFIXER, &uri, 5)
            .patch_json::<Value>("/api/v1/submission/p-1", json!({"insured_name": "Acme"}))
    })
    .await
    .expect("blocking task should not panic");

    assert!(matches!(result, Err(PingError::Transport { status: 503, .. })));
    assert_eq!(server.received_requests().await.map(|r| r.len()), Some(1));
}

#[tokio::test(flavor = "multi_thread")]
async fn sends_default_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sov/activity"))
        .and(header("authorization", format!("Token {TEST_TOKEN}").as_str()))
        .and(header_regex("user-agent", r"^pingintel-api/SovFixerClient/\d+\.\d+\.\d+"))
        .and(header_regex("accept-encoding", "gzip"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let result = tokio::task::spawn_blocking(move || {
        client_for(SOVFIXER, &uri, 0).get_json::<Value>("/api/v1/sov/activity", Vec::new())
    })
    .await
    .expect("blocking task should not panic");

    assert!(result.is_ok(), "headers should match: {result:?}");
    server.verify().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn non_json_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sov/activity"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = tokio::task::spawn_blocking(move || {
        client_for(SOVFIXER, &uri, 0)
            .get_json::<Value>("/api/v1/sov/activity", Vec::new())
            .unwrap_err()
    })
    .await
    .expect("blocking task should not panic");

    assert!(matches!(err, PingError::InvalidResponse(message) if message.contains("maintenance")));
}
