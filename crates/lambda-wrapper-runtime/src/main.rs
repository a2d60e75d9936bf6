// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

mod runtime;

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use lambda_runtime::{service_fn, Error, LambdaEvent};
use lambda_wrapper::{
    config::Config,
    dimensions::DimensionDeriver,
    dispatcher::DispatcherService,
    interceptor::{handler_fn, Interceptor},
    sink::HttpSink,
};
use serde_json::Value;

#[tokio::main]
pub async fn main() -> Result<(), Error> {
    let config = Config::from_env();
    let env_filter = log_filter(config.as_ref().ok());

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_new(env_filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    debug!("Logging subsystem enabled");

    let config = match config {
        Ok(c) => Arc::new(c),
        Err(e) => {
            error!("Error creating config on lambda wrapper startup: {e}");
            return Err(e.into());
        }
    };

    let sink = match HttpSink::from_config(&config) {
        Ok(sink) => Arc::new(sink),
        Err(e) => {
            error!("Error creating datapoint sink on lambda wrapper startup: {e}");
            return Err(e.into());
        }
    };
    info!(
        "Sending datapoints to {} with a {:?} timeout",
        sink.endpoint(),
        config.send_timeout
    );

    let cancel_token = CancellationToken::new();
    let (service, dispatcher) = DispatcherService::new(
        sink,
        DimensionDeriver::new(config.execution_env.clone()),
        cancel_token.clone(),
    );
    let service_task = tokio::spawn(service.run());

    let interceptor = Arc::new(Interceptor::new(handler_fn(runtime::echo), dispatcher));

    let result = lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let interceptor = Arc::clone(&interceptor);
        async move { runtime::handle(&*interceptor, event).await }
    }))
    .await;

    cancel_token.cancel();
    if let Err(e) = service_task.await {
        error!("Dispatcher service failed: {e}");
    }
    result
}

/// Builds the log filter directives from the configured level, falling back to `info` when the
/// configuration could not be loaded.
fn log_filter(config: Option<&Config>) -> String {
    let log_level = config.map_or("info", |c| c.log_level.as_str());
    format!("h2=off,hyper=off,rustls=off,{}", log_level)
}
