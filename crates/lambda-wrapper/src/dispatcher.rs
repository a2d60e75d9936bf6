// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Background dispatch of datapoint batches.
//!
//! [`DispatcherHandle::dispatch`] tags and timestamps a batch and enqueues it without
//! waiting. [`DispatcherService::run`] pulls batches off the queue and ships each one from
//! its own task. Sends are fire-and-forget: failures are logged, never returned to the
//! invocation path, and nothing is retried.
//!
//! There is no delivery guarantee on process exit. Batches that are queued or in flight
//! when the host freezes or terminates the process are lost.

use crate::context::InvocationContext;
use crate::datapoint::{now_millis, Datapoint};
use crate::dimensions::DimensionDeriver;
use crate::sink::DatapointSink;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

#[derive(Debug)]
pub enum DispatcherCommand {
    SendBatch(Vec<Datapoint>),
    Flush(oneshot::Sender<()>),
    Shutdown,
}

#[derive(Clone, Debug)]
pub struct DispatcherHandle {
    tx: mpsc::UnboundedSender<DispatcherCommand>,
    deriver: Arc<DimensionDeriver>,
}

impl DispatcherHandle {
    /// Merges the invocation's default dimensions into `datapoints`, stamps the ones
    /// without a timestamp with a single shared time, and enqueues the batch. Never waits
    /// on the network.
    pub fn dispatch(&self, context: &InvocationContext, datapoints: Vec<Datapoint>) {
        if datapoints.is_empty() {
            return;
        }

        let (defaults, diagnostics) = self.deriver.derive(
            &context.invoked_function_arn,
            &context.function_version,
            &context.function_name,
        );
        for diagnostic in &diagnostics {
            debug!(
                request_id = %context.request_id,
                "Partial default dimensions: {diagnostic}"
            );
        }

        let now = now_millis();
        let batch = datapoints
            .into_iter()
            .map(|dp| dp.stamped(now).with_defaults(&defaults))
            .collect();

        if let Err(e) = self.tx.send(DispatcherCommand::SendBatch(batch)) {
            error!("Failed to enqueue datapoints, dispatcher is not running: {e}");
        }
    }

    /// Waits until every batch enqueued before this call has been sent or has failed.
    pub async fn flush(&self) -> Result<(), String> {
        let (response_tx, response_rx) = oneshot::channel();
        self.tx
            .send(DispatcherCommand::Flush(response_tx))
            .map_err(|e| format!("Failed to send flush command: {}", e))?;

        response_rx
            .await
            .map_err(|e| format!("Failed to receive flush response: {}", e))
    }

    pub fn shutdown(&self) -> Result<(), mpsc::error::SendError<DispatcherCommand>> {
        self.tx.send(DispatcherCommand::Shutdown)
    }
}

enum Event {
    Command(Option<DispatcherCommand>),
    SendFinished(Result<(), JoinError>),
    Cancelled,
}

pub struct DispatcherService {
    sink: Arc<dyn DatapointSink>,
    rx: mpsc::UnboundedReceiver<DispatcherCommand>,
    in_flight: JoinSet<()>,
    cancel_token: CancellationToken,
}

impl DispatcherService {
    pub fn new(
        sink: Arc<dyn DatapointSink>,
        deriver: DimensionDeriver,
        cancel_token: CancellationToken,
    ) -> (Self, DispatcherHandle) {
        let (tx, rx) = mpsc::unbounded_channel();

        let service = Self {
            sink,
            rx,
            in_flight: JoinSet::new(),
            cancel_token,
        };

        let handle = DispatcherHandle {
            tx,
            deriver: Arc::new(deriver),
        };

        (service, handle)
    }

    pub async fn run(mut self) {
        debug!("Dispatcher service started");

        loop {
            let event = tokio::select! {
                () = self.cancel_token.cancelled() => Event::Cancelled,
                command = self.rx.recv() => Event::Command(command),
                Some(result) = self.in_flight.join_next() => Event::SendFinished(result),
            };

            match event {
                Event::Command(Some(DispatcherCommand::SendBatch(batch))) => {
                    let sink = Arc::clone(&self.sink);
                    self.in_flight.spawn(async move {
                        let n_datapoints = batch.len();
                        match sink.send_batch(&batch).await {
                            Ok(()) => debug!("Successfully sent {n_datapoints} datapoints"),
                            Err(e) => error!("Error sending datapoints: {e}"),
                        }
                    });
                }
                Event::Command(Some(DispatcherCommand::Flush(response_tx))) => {
                    self.drain().await;
                    if response_tx.send(()).is_err() {
                        error!("Failed to send flush response - receiver dropped");
                    }
                }
                Event::Command(Some(DispatcherCommand::Shutdown)) => {
                    debug!("Dispatcher service shutting down");
                    break;
                }
                Event::Command(None) => {
                    debug!("All dispatcher handles dropped");
                    break;
                }
                Event::SendFinished(result) => log_join_error(result),
                Event::Cancelled => {
                    debug!("Dispatcher service cancelled");
                    break;
                }
            }
        }

        self.drain().await;
        debug!("Dispatcher service stopped");
    }

    async fn drain(&mut self) {
        while let Some(result) = self.in_flight.join_next().await {
            log_join_error(result);
        }
    }
}

fn log_join_error(result: Result<(), JoinError>) {
    if let Err(e) = result {
        error!("Datapoint send task failed: {e}");
    }
}
