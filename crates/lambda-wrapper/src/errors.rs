// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use reqwest::StatusCode;

/// Startup configuration errors. Any of these is fatal: the process must not serve
/// invocations without a usable sink.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No value for environment variable {0}")]
    MissingAuthToken(&'static str),

    #[error("Error parsing url value {value} of environment variable {var}: {reason}")]
    InvalidIngestEndpoint {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Error parsing timeout value {value} of environment variable {var}")]
    InvalidSendTimeout { var: &'static str, value: String },

    #[error("Invalid log level '{0}'. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Problems found while deriving dimensions from an invoked function ARN. They never
/// abort derivation; the affected dimension is left out.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DimensionDiagnostic {
    #[error("invoked function arn is blank")]
    BlankArn,

    #[error("no region segment in arn '{0}'")]
    MissingRegion(String),

    #[error("no account id segment in arn '{0}'")]
    MissingAccountId(String),

    #[error("invalid identifier shape: arn '{arn}' has {segments} segments, expected at least 6")]
    InvalidShape { arn: String, segments: usize },

    #[error("no function name segment in arn '{0}'")]
    MissingFunctionName(String),

    #[error("no event source mapping id segment in arn '{0}'")]
    MissingEventSourceMapping(String),
}

/// Failures shipping a batch. Only ever logged.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Failed to prepare payload: {0}")]
    Payload(String),

    #[error("Error sending request: {0}")]
    Request(String),

    #[error("{status}: Failed to push datapoints: {body}")]
    Status { status: StatusCode, body: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::MissingAuthToken("SIGNALFX_AUTH_TOKEN");
        assert_eq!(
            error.to_string(),
            "No value for environment variable SIGNALFX_AUTH_TOKEN"
        );
    }

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = DimensionDiagnostic::InvalidShape {
            arn: "arn:aws".to_string(),
            segments: 2,
        };
        assert_eq!(
            diagnostic.to_string(),
            "invalid identifier shape: arn 'arn:aws' has 2 segments, expected at least 6"
        );
    }

    #[test]
    fn test_sink_error_display() {
        let error = SinkError::Status {
            status: StatusCode::BAD_REQUEST,
            body: "bad datapoint".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "400 Bad Request: Failed to push datapoints: bad datapoint"
        );
    }
}
