// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Serverless handler wrapper that reports operational metrics.
//!
//! A wrapped handler reports, for every invocation:
//! - `function.invocations`: counter, always
//! - `function.cold_starts`: counter, first invocation of the process only
//! - `function.duration`: gauge, wall-clock seconds spent in the handler
//! - `function.errors`: counter, when the handler returns an error
//!
//! The pieces are layered as follows:
//! - [`dimensions`] derives default dimensions from the invoked function ARN
//! - [`interceptor`] times the handler and builds the datapoints
//! - [`dispatcher`] stamps, tags and hands datapoints to a background sender
//! - [`sink`] ships batches to the ingestion endpoint over HTTP
//!
//! Metrics are sent in the background. Datapoints still in flight when the host freezes or
//! recycles the process are lost.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod config;
pub mod constants;
pub mod context;
pub mod datapoint;
pub mod dimensions;
pub mod dispatcher;
pub mod errors;
pub mod interceptor;
pub mod sink;
