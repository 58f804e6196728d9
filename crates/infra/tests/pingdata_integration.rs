//! Integration tests for the Ping Data client

#![allow(dead_code)]

#[path = "support.rs"]
mod support;

use std::time::Duration;

use pingintel_core::PollPolicy;
use pingintel_domain::{
    DataSource, EnhanceRequest, JobOptions, LocationRecord, PingError, PINGDATA,
};
use pingintel_infra::PingDataClient;
use serde_json::json;
use support::{client_for, Sequence};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test(flavor = "multi_thread")]
async fn enhance_sends_repeated_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/enhance"))
        .and(query_param("address", "1 Main St, Austin TX"))
        .and(query_param("sources", "GG"))
        .and(query_param("include_raw_response", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "enh-1",
            "location_data": {
                "GG": {"is_success": true, "latitude": 30.27, "longitude": -97.74},
            },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let response = tokio::task::spawn_blocking(move || {
        let client = PingDataClient::new(client_for(PINGDATA, &uri, 0));
        let request = EnhanceRequest {
            addresses: vec!["1 Main St, Austin TX".into()],
            sources: vec![DataSource::GoogleGeocoding],
            timeout: Some(5.0),
            ..EnhanceRequest::default()
        };
        client.enhance(&request)
    })
    .await
    .expect("blocking task should not panic")
    .expect("enhance should succeed");

    let geocode = response.source(DataSource::GoogleGeocoding).expect("GG result");
    assert_eq!(geocode.is_success, Some(true));
    assert_eq!(geocode.latitude, Some(30.27));
    server.verify().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn enhance_rejects_empty_request_without_calling_out() {
    let server = MockServer::start().await;

    let uri = server.uri();
    let err = tokio::task::spawn_blocking(move || {
        let client = PingDataClient::new(client_for(PINGDATA, &uri, 0));
        client.enhance(&EnhanceRequest::default()).unwrap_err()
    })
    .await
    .expect("blocking task should not panic");

    assert!(matches!(err, PingError::Validation(_)));
    assert_eq!(server.received_requests().await.map(|r| r.len()), Some(0));
}

#[tokio::test(flavor = "multi_thread")]
async fn bulk_enhance_polls_to_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/bulk_enhance"))
        .and(body_string_contains("\"sources\":[\"GG\"]"))
        .and(body_string_contains("loc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "be-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let (responder, _) = Sequence::new(vec![
        ResponseTemplate::new(503),
        ResponseTemplate::new(200).set_body_json(json!({"request": {"status": "ENRICHING"}})),
        ResponseTemplate::new(200).set_body_json(json!({
            "request": {"status": "COMPLETE"},
            "result": {
                "status": "SUCCESS",
                "outputs": [{"url": "/api/v1/bulk_enhance/be-1/output", "filename": "be-1.json"}],
            },
        })),
    ]);
    Mock::given(method("GET"))
        .and(path("/api/v1/bulk_enhance/be-1"))
        .respond_with(responder)
        .mount(&server)
        .await;

    let uri = server.uri();
    let result = tokio::task::spawn_blocking(move || {
        let client = PingDataClient::new(client_for(PINGDATA, &uri, 0));
        let policy = PollPolicy::every(Duration::ZERO).with_transient_retry_delay(Duration::ZERO);
        client.bulk_enhance(
            vec![LocationRecord::with_address("loc-1", "1 Main St, Austin TX")],
            vec![DataSource::GoogleGeocoding],
            &JobOptions::default(),
            Some(policy),
            |_| {},
        )
    })
    .await
    .expect("blocking task should not panic")
    .expect("bulk enhance should finish");

    assert!(result.is_success());
    assert_eq!(result.outputs()[0].filename, "be-1.json");
    server.verify().await;
}
