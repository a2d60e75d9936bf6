// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use lambda_wrapper::{
    config::parse_datapoint_endpoint,
    context::InvocationContext,
    dimensions::DimensionDeriver,
    dispatcher::{DispatcherHandle, DispatcherService},
    interceptor::{handler_fn, HandlerError, Interceptor},
    sink::HttpSink,
};
use mockito::{Matcher, Server};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, timeout, Duration};
use tokio_util::sync::CancellationToken;

fn start_dispatcher(server: &Server, send_timeout: Duration) -> DispatcherHandle {
    let sink = HttpSink::new(
        parse_datapoint_endpoint(&server.url()).expect("failed to create URL"),
        "mock-token".to_string(),
        Some(send_timeout),
    )
    .expect("failed to create sink");
    let (service, handle) = DispatcherService::new(
        Arc::new(sink),
        DimensionDeriver::new(Some("AWS_Lambda_rust".to_string())),
        CancellationToken::new(),
    );
    tokio::spawn(service.run());
    handle
}

fn context() -> InvocationContext {
    InvocationContext::new(
        "8476a536-e9f4-11e8-9739-2dfe598c3fcd",
        "arn:aws:lambda:us-east-1:123456789012:function:checkout:live",
        "checkout",
        "12",
    )
}

#[tokio::test]
async fn wrapped_handler_ships_datapoints() {
    let mut mock_server = Server::new_async().await;

    let mock = mock_server
        .mock("POST", "/v2/datapoint")
        .match_header("X-SF-Token", "mock-token")
        .match_header("Content-Type", "application/json")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#""metric":"function.invocations""#.to_string()),
            Matcher::Regex(r#""metric":"function.cold_starts""#.to_string()),
            Matcher::Regex(r#""metric":"function.duration""#.to_string()),
            Matcher::Regex(
                r#""lambda_arn":"arn:aws:lambda:us-east-1:123456789012:function:checkout:12""#
                    .to_string(),
            ),
            Matcher::Regex(r#""aws_function_qualifier":"live""#.to_string()),
            Matcher::Regex(r#""aws_execution_env":"AWS_Lambda_rust""#.to_string()),
        ]))
        .with_status(200)
        .create_async()
        .await;

    let interceptor = Interceptor::new(
        handler_fn(|_context, payload| async move { Ok::<_, HandlerError>(payload) }),
        start_dispatcher(&mock_server, Duration::from_secs(5)),
    );

    let response = interceptor
        .invoke(&context(), br#"{"cart":"c-1"}"#.to_vec())
        .await
        .expect("handler failed");
    assert_eq!(response, br#"{"cart":"c-1"}"#);

    let wait = async {
        while !mock.matched_async().await {
            sleep(Duration::from_millis(50)).await;
        }
    };

    match timeout(Duration::from_millis(2000), wait).await {
        Ok(_) => mock.assert_async().await,
        Err(_) => panic!("timed out before server received datapoints"),
    }
}

#[tokio::test]
async fn handler_error_is_reported_and_returned() {
    let mut mock_server = Server::new_async().await;

    let mock = mock_server
        .mock("POST", "/v2/datapoint")
        .match_body(Matcher::Regex(r#""metric":"function.errors""#.to_string()))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let interceptor = Interceptor::new(
        handler_fn(|_context, _payload| async move {
            Err::<Vec<u8>, HandlerError>("payment declined".into())
        }),
        start_dispatcher(&mock_server, Duration::from_secs(5)),
    );

    let err = interceptor
        .invoke(&context(), Vec::new())
        .await
        .expect_err("handler error was swallowed");
    assert_eq!(err.to_string(), "payment declined");

    interceptor.dispatcher().flush().await.expect("failed to flush");
    mock.assert_async().await;
}

#[tokio::test]
async fn backend_failures_do_not_affect_invocations() {
    let mut mock_server = Server::new_async().await;

    let mock = mock_server
        .mock("POST", "/v2/datapoint")
        .with_status(500)
        .with_body("Internal Server Error")
        .expect(2)
        .create_async()
        .await;

    let interceptor = Interceptor::new(
        handler_fn(|_context, _payload| async move { Ok::<_, HandlerError>(b"ok".to_vec()) }),
        start_dispatcher(&mock_server, Duration::from_secs(1)),
    );

    for _ in 0..2 {
        let response = interceptor
            .invoke(&context(), Vec::new())
            .await
            .expect("handler failed");
        assert_eq!(response, b"ok");
    }

    interceptor.dispatcher().flush().await.expect("failed to flush");
    mock.assert_async().await;
}

#[tokio::test]
async fn slow_backend_does_not_delay_invocations() {
    let interceptor = Interceptor::new(
        handler_fn(|_context, payload| async move { Ok::<_, HandlerError>(payload) }),
        {
            // Nothing listens here; with a long timeout every send hangs until refused or timed out.
            let sink = HttpSink::new(
                parse_datapoint_endpoint("http://10.255.255.1:9").expect("failed to create URL"),
                "mock-token".to_string(),
                Some(Duration::from_secs(30)),
            )
            .expect("failed to create sink");
            let (service, handle) = DispatcherService::new(
                Arc::new(sink),
                DimensionDeriver::default(),
                CancellationToken::new(),
            );
            tokio::spawn(service.run());
            handle
        },
    );

    let start = Instant::now();
    interceptor
        .invoke(&context(), Vec::new())
        .await
        .expect("handler failed");
    assert!(start.elapsed() < Duration::from_secs(1));
}
