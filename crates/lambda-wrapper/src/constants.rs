// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

// Metric names
pub const INVOCATIONS_METRIC: &str = "function.invocations";
pub const COLD_STARTS_METRIC: &str = "function.cold_starts";
pub const DURATION_METRIC: &str = "function.duration";
pub const ERRORS_METRIC: &str = "function.errors";

// Dimension names
pub const METRIC_SOURCE_DIMENSION: &str = "metric_source";
pub const FUNCTION_VERSION_DIMENSION: &str = "aws_function_version";
pub const FUNCTION_NAME_DIMENSION: &str = "aws_function_name";
pub const REGION_DIMENSION: &str = "aws_region";
pub const ACCOUNT_ID_DIMENSION: &str = "aws_account_id";
pub const FUNCTION_QUALIFIER_DIMENSION: &str = "aws_function_qualifier";
pub const LAMBDA_ARN_DIMENSION: &str = "lambda_arn";
pub const EVENT_SOURCE_MAPPINGS_DIMENSION: &str = "event_source_mappings";
pub const EXECUTION_ENV_DIMENSION: &str = "aws_execution_env";

pub const METRIC_SOURCE: &str = "lambda_wrapper";

// Environment variables
pub const AUTH_TOKEN_ENV_VAR: &str = "SIGNALFX_AUTH_TOKEN";
pub const INGEST_ENDPOINT_ENV_VAR: &str = "SIGNALFX_INGEST_ENDPOINT";
pub const SEND_TIMEOUT_SECONDS_ENV_VAR: &str = "SIGNALFX_SEND_TIMEOUT_SECONDS";
pub const LOG_LEVEL_ENV_VAR: &str = "SIGNALFX_LOG_LEVEL";
pub const EXECUTION_ENV_ENV_VAR: &str = "AWS_EXECUTION_ENV";

// Ingestion
pub const DEFAULT_INGEST_URL: &str = "https://ingest.signalfx.com/";
pub const DATAPOINT_PATH: &str = "v2/datapoint";
pub const AUTH_TOKEN_HEADER: &str = "X-SF-Token";
pub const DEFAULT_SEND_TIMEOUT_SECS: u64 = 5;
