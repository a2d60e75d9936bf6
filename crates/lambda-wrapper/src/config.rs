// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::constants::{
    AUTH_TOKEN_ENV_VAR, DATAPOINT_PATH, DEFAULT_INGEST_URL, DEFAULT_SEND_TIMEOUT_SECS,
    EXECUTION_ENV_ENV_VAR, INGEST_ENDPOINT_ENV_VAR, LOG_LEVEL_ENV_VAR,
    SEND_TIMEOUT_SECONDS_ENV_VAR,
};
use crate::errors::ConfigError;
use reqwest::Url;
use std::env;
use std::time::Duration;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Process-wide settings, read once at startup and shared read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Token sent with every datapoint batch
    pub auth_token: String,
    /// Full URL datapoint batches are posted to
    pub datapoint_endpoint: Url,
    /// Timeout for each batch request, `None` when requests may take as long as they need
    pub send_timeout: Option<Duration>,
    /// Value of `AWS_EXECUTION_ENV`, copied into every dimension set
    pub execution_env: Option<String>,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        let auth_token = env::var(AUTH_TOKEN_ENV_VAR)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::MissingAuthToken(AUTH_TOKEN_ENV_VAR))?;

        let datapoint_endpoint = match non_empty_var(INGEST_ENDPOINT_ENV_VAR) {
            Some(ingest_url) => parse_datapoint_endpoint(&ingest_url)?,
            None => parse_datapoint_endpoint(DEFAULT_INGEST_URL)?,
        };

        let send_timeout = match non_empty_var(SEND_TIMEOUT_SECONDS_ENV_VAR) {
            Some(timeout) => parse_send_timeout(&timeout)?,
            None => Some(Duration::from_secs(DEFAULT_SEND_TIMEOUT_SECS)),
        };

        let log_level = env::var(LOG_LEVEL_ENV_VAR)
            .map(|val| val.trim().to_lowercase())
            .unwrap_or_else(|_| "info".to_string());
        if !VALID_LOG_LEVELS.contains(&log_level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(log_level));
        }

        Ok(Config {
            auth_token,
            datapoint_endpoint,
            send_timeout,
            execution_env: non_empty_var(EXECUTION_ENV_ENV_VAR),
            log_level,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|val| !val.is_empty())
}

/// Resolves the datapoint path against the ingest base URL.
pub fn parse_datapoint_endpoint(ingest_url: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidIngestEndpoint {
        var: INGEST_ENDPOINT_ENV_VAR,
        value: ingest_url.to_string(),
        reason,
    };
    Url::parse(ingest_url.trim())
        .and_then(|base| base.join(DATAPOINT_PATH))
        .map_err(|e| invalid(e.to_string()))
}

/// Parses a timeout in seconds. Fractions are allowed, negative values are not. Zero
/// disables the timeout.
pub fn parse_send_timeout(seconds: &str) -> Result<Option<Duration>, ConfigError> {
    let timeout = seconds
        .trim()
        .parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| ConfigError::InvalidSendTimeout {
            var: SEND_TIMEOUT_SECONDS_ENV_VAR,
            value: seconds.to_string(),
        })?;
    Ok(Some(timeout).filter(|timeout| !timeout.is_zero()))
}
