//! Request pipeline behavior: auth, interception, resilience and cancellation.

mod common;

use common::*;
use integrations_document_library::transport::HttpRequest;
use integrations_document_library::{
    CircuitBreakerConfig, CircuitBreakerPolicy, DocumentLibraryError, DocumentLibraryResult,
    Operation, PolicyMap, RequestOptions, RetryConfig, RetryPolicy, StaticTokenProvider,
};
use reqwest::header::HeaderValue;
use serde_json::json;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy::new(RetryConfig {
        max_retries,
        initial_backoff: Duration::from_millis(10),
        max_backoff: Duration::from_millis(50),
        jitter: 0.0,
        ..RetryConfig::default()
    })
}

#[tokio::test]
async fn test_bearer_token_and_custom_headers() {
    let server = wiremock::MockServer::start().await;
    let client = builder_for(&server)
        .token_provider(StaticTokenProvider::new("secret-token"))
        .header("x-client", "integration-tests")
        .build()
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/libraries"))
        .and(header("authorization", "Bearer secret-token"))
        .and(header("x-client", "integration-tests"))
        .and(header("Subscription-Key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    client.libraries().list(&RequestOptions::default()).await.unwrap();
}

#[tokio::test]
async fn test_interceptor_mutates_request() {
    let server = wiremock::MockServer::start().await;
    let client = builder_for(&server)
        .interceptor(
            |operation: Operation, request: &mut HttpRequest| -> DocumentLibraryResult<()> {
                let value = HeaderValue::from_str(operation.name()).map_err(|e| {
                    DocumentLibraryError::Configuration {
                        message: e.to_string(),
                    }
                })?;
                request.headers.insert("x-operation", value);
                Ok(())
            },
        )
        .build()
        .unwrap();

    Mock::given(method("GET"))
        .and(path(format!("/libraries/{LIBRARY_ID}")))
        .and(header("x-operation", "GetLibrary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(library_json()))
        .expect(1)
        .mount(&server)
        .await;

    client
        .libraries()
        .get(library_id(), &RequestOptions::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_failing_interceptor_aborts_call() {
    let server = wiremock::MockServer::start().await;
    let client = builder_for(&server)
        .interceptor(
            |_: Operation, _: &mut HttpRequest| -> DocumentLibraryResult<()> {
                Err(DocumentLibraryError::validation("blocked"))
            },
        )
        .build()
        .unwrap();

    let result = client.libraries().list(&RequestOptions::default()).await;

    assert!(matches!(result, Err(DocumentLibraryError::Validation { .. })));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_retry_recovers_from_transient_status() {
    let server = wiremock::MockServer::start().await;
    let client = builder_for(&server)
        .policies(PolicyMap::builder().default_policy(fast_retry(3)).build())
        .build()
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/libraries"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/libraries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([library_json()])))
        .mount(&server)
        .await;

    let libraries = client.libraries().list(&RequestOptions::default()).await.unwrap();

    assert_eq!(libraries.len(), 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_retry_leaves_documented_errors_alone() {
    let server = wiremock::MockServer::start().await;
    let client = builder_for(&server)
        .policies(PolicyMap::builder().default_policy(fast_retry(3)).build())
        .build()
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/libraries"))
        .respond_with(ResponseTemplate::new(500).set_body_json(error_json("Boom", "Failed")))
        .expect(1)
        .mount(&server)
        .await;

    let result = client
        .libraries()
        .list_result(&RequestOptions::default())
        .await
        .unwrap();

    assert!(result.is_failure());
}

#[tokio::test]
async fn test_cancel_during_backoff_stops_retrying() {
    let server = wiremock::MockServer::start().await;
    let slow_retry = RetryPolicy::new(RetryConfig {
        max_retries: 5,
        initial_backoff: Duration::from_secs(30),
        max_backoff: Duration::from_secs(30),
        jitter: 0.0,
        ..RetryConfig::default()
    });
    let client = builder_for(&server)
        .policies(
            PolicyMap::builder()
                .policy(Operation::ListLibraries, slow_retry)
                .build(),
        )
        .build()
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/libraries"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let result = client
        .libraries()
        .list(&RequestOptions::new().cancellation(token))
        .await;

    assert!(matches!(result, Err(DocumentLibraryError::Cancelled)));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_already_cancelled_sends_nothing() {
    let (server, client) = setup().await;

    let token = CancellationToken::new();
    token.cancel();

    let result = client
        .libraries()
        .list(&RequestOptions::new().cancellation(token))
        .await;

    assert!(matches!(result, Err(DocumentLibraryError::Cancelled)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_circuit_opens_after_repeated_failures() {
    let server = wiremock::MockServer::start().await;
    let breaker = CircuitBreakerPolicy::new(CircuitBreakerConfig {
        failure_threshold: 2,
        success_threshold: 1,
        reset_timeout: Duration::from_secs(60),
    });
    let client = builder_for(&server)
        .policies(PolicyMap::builder().policy(Operation::GetLibrary, breaker).build())
        .build()
        .unwrap();

    Mock::given(method("GET"))
        .and(path(format!("/libraries/{LIBRARY_ID}")))
        .respond_with(ResponseTemplate::new(500).set_body_json(error_json("Boom", "Failed")))
        .mount(&server)
        .await;

    let libraries = client.libraries();
    let options = RequestOptions::default();
    for _ in 0..2 {
        let result = libraries.get_result(library_id(), &options).await.unwrap();
        assert!(result.is_failure());
    }

    let result = libraries.get(library_id(), &options).await;
    assert!(matches!(result, Err(DocumentLibraryError::CircuitOpen { .. })));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}
