// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Handler instrumentation.
//!
//! An [`Interceptor`] wraps exactly one [`Handler`] and has the same shape, so the host
//! runtime can call it in place of the handler. Each call reports invocation, cold start,
//! duration and error datapoints through a [`DispatcherHandle`].

use crate::constants::{COLD_STARTS_METRIC, DURATION_METRIC, ERRORS_METRIC, INVOCATIONS_METRIC};
use crate::context::InvocationContext;
use crate::datapoint::Datapoint;
use crate::dispatcher::DispatcherHandle;
use async_trait::async_trait;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::debug;

/// Error returned by a handler. Passed back to the host untouched.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

#[async_trait]
pub trait Handler: Send + Sync {
    async fn invoke(
        &self,
        context: &InvocationContext,
        payload: Vec<u8>,
    ) -> Result<Vec<u8>, HandlerError>;
}

/// [`Handler`] backed by an async closure.
pub struct HandlerFn<F> {
    f: F,
}

pub fn handler_fn<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(InvocationContext, Vec<u8>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<u8>, HandlerError>> + Send + 'static,
{
    HandlerFn { f }
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(InvocationContext, Vec<u8>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<u8>, HandlerError>> + Send + 'static,
{
    async fn invoke(
        &self,
        context: &InvocationContext,
        payload: Vec<u8>,
    ) -> Result<Vec<u8>, HandlerError> {
        (self.f)(context.clone(), payload).await
    }
}

pub struct Interceptor<H> {
    handler: H,
    dispatcher: DispatcherHandle,
    // Set by the first invocation of the process and never cleared.
    cold_start_seen: AtomicBool,
}

impl<H: Handler> Interceptor<H> {
    /// Build one per process: the cold start datapoint is tied to this instance.
    pub fn new(handler: H, dispatcher: DispatcherHandle) -> Self {
        Interceptor {
            handler,
            dispatcher,
            cold_start_seen: AtomicBool::new(false),
        }
    }

    /// Calls the wrapped handler with `payload` and returns its result unchanged. The
    /// datapoints for this call are enqueued before returning; they are not sent yet.
    pub async fn invoke(
        &self,
        context: &InvocationContext,
        payload: Vec<u8>,
    ) -> Result<Vec<u8>, HandlerError> {
        let start = Instant::now();

        let mut datapoints = vec![Datapoint::counter(INVOCATIONS_METRIC, 1)];
        if !self.cold_start_seen.swap(true, Ordering::AcqRel) {
            debug!(request_id = %context.request_id, "Cold start");
            datapoints.push(Datapoint::counter(COLD_STARTS_METRIC, 1));
        }

        let result = self.handler.invoke(context, payload).await;

        datapoints.push(Datapoint::gauge(
            DURATION_METRIC,
            start.elapsed().as_secs_f64(),
        ));
        if result.is_err() {
            datapoints.push(Datapoint::counter(ERRORS_METRIC, 1));
        }

        self.dispatcher.dispatch(context, datapoints);
        result
    }

    /// Sends custom datapoints tagged with this invocation's default dimensions.
    pub fn send_datapoints(&self, context: &InvocationContext, datapoints: Vec<Datapoint>) {
        self.dispatcher.dispatch(context, datapoints);
    }

    pub fn dispatcher(&self) -> &DispatcherHandle {
        &self.dispatcher
    }
}

#[async_trait]
impl<H: Handler> Handler for Interceptor<H> {
    async fn invoke(
        &self,
        context: &InvocationContext,
        payload: Vec<u8>,
    ) -> Result<Vec<u8>, HandlerError> {
        Interceptor::invoke(self, context, payload).await
    }
}
