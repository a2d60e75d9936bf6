// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Transport for datapoint batches.

use crate::config::Config;
use crate::constants::AUTH_TOKEN_HEADER;
use crate::datapoint::{Datapoint, DatapointPayload};
use crate::errors::{ConfigError, SinkError};
use async_trait::async_trait;
use reqwest::{ClientBuilder, Url};
use std::time::Duration;
use tracing::debug;

/// Ships one batch of datapoints. Implementations report failures to the caller and never
/// retry.
#[async_trait]
pub trait DatapointSink: Send + Sync {
    async fn send_batch(&self, datapoints: &[Datapoint]) -> Result<(), SinkError>;
}

/// Creates a reqwest client builder using reqwest's rustls TLS implementation.
fn create_reqwest_client_builder() -> ClientBuilder {
    reqwest::Client::builder().use_rustls_tls()
}

/// Posts batches as JSON to the datapoint ingestion endpoint.
#[derive(Clone, Debug)]
pub struct HttpSink {
    client: reqwest::Client,
    endpoint: Url,
    auth_token: String,
}

impl HttpSink {
    /// Without a `timeout`, requests are bounded only by the connection itself.
    pub fn new(
        endpoint: Url,
        auth_token: String,
        timeout: Option<Duration>,
    ) -> Result<Self, ConfigError> {
        let mut builder = create_reqwest_client_builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(HttpSink {
            client,
            endpoint,
            auth_token,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::new(
            config.datapoint_endpoint.clone(),
            config.auth_token.clone(),
            config.send_timeout,
        )
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl DatapointSink for HttpSink {
    async fn send_batch(&self, datapoints: &[Datapoint]) -> Result<(), SinkError> {
        let payload = DatapointPayload::from_datapoints(datapoints);
        let body = serde_json::to_vec(&payload).map_err(|e| SinkError::Payload(e.to_string()))?;

        debug!("Sending {} datapoints to {}", payload.len(), self.endpoint);
        let resp = self
            .client
            .post(self.endpoint.clone())
            .header(AUTH_TOKEN_HEADER, &self.auth_token)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| SinkError::Request(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        Err(SinkError::Status {
            status,
            body: resp.text().await.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn sink_for(server: &Server) -> HttpSink {
        let endpoint = crate::config::parse_datapoint_endpoint(&server.url())
            .expect("failed to create URL");
        HttpSink::new(endpoint, "mock-token".to_string(), Some(Duration::from_secs(1)))
            .expect("failed to create sink")
    }

    #[tokio::test]
    async fn test_send_batch_posts_json_with_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v2/datapoint")
            .match_header("X-SF-Token", "mock-token")
            .match_header("Content-Type", "application/json")
            .match_body(Matcher::Json(json!({
                "counter": [{
                    "metric": "function.invocations",
                    "value": 1,
                    "dimensions": {"aws_region": "us-east-1"},
                    "timestamp": 1000,
                }]
            })))
            .with_status(200)
            .with_body("\"OK\"")
            .create_async()
            .await;

        let datapoints = vec![Datapoint::counter("function.invocations", 1)
            .with_dimension("aws_region", "us-east-1")
            .with_timestamp(1000)];
        let result = sink_for(&server).send_batch(&datapoints).await;

        assert!(result.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_batch_reports_unexpected_status() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v2/datapoint")
            .with_status(401)
            .with_body("Unauthorized")
            .expect(1)
            .create_async()
            .await;

        let datapoints = vec![Datapoint::gauge("function.duration", 0.1)];
        let result = sink_for(&server).send_batch(&datapoints).await;

        match result {
            Err(SinkError::Status { status, body }) => {
                assert_eq!(status.as_u16(), 401);
                assert_eq!(body, "Unauthorized");
            }
            other => panic!("expected status error, got {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_batch_with_zero_timeout_setting() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v2/datapoint")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let endpoint = crate::config::parse_datapoint_endpoint(&server.url())
            .expect("failed to create URL");
        let timeout = crate::config::parse_send_timeout("0").expect("failed to parse timeout");
        let sink = HttpSink::new(endpoint, "mock-token".to_string(), timeout)
            .expect("failed to create sink");

        let result = sink.send_batch(&[Datapoint::counter("test", 1)]).await;
        assert!(result.is_ok(), "unexpected error: {result:?}");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_batch_reports_unreachable_endpoint() {
        let endpoint = Url::parse("http://127.0.0.1:1/v2/datapoint").expect("failed to create URL");
        let sink = HttpSink::new(endpoint, "mock-token".to_string(), Some(Duration::from_millis(200)))
            .expect("failed to create sink");

        let result = sink.send_batch(&[Datapoint::counter("test", 1)]).await;
        assert!(matches!(result, Err(SinkError::Request(_))));
    }
}
