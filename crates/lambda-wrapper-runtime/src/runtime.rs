// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Adapts Lambda runtime events to the wrapper's byte-oriented handler contract.

use lambda_runtime::{Context, Error, LambdaEvent};
use lambda_wrapper::context::InvocationContext;
use lambda_wrapper::interceptor::{Handler, HandlerError, Interceptor};
use serde_json::Value;

pub fn invocation_context(context: &Context) -> InvocationContext {
    InvocationContext::new(
        context.request_id.clone(),
        context.invoked_function_arn.clone(),
        context.env_config.function_name.clone(),
        context.env_config.version.clone(),
    )
}

/// Runs one event through the interceptor. JSON (de)serialization failures belong to the
/// shim and are not counted as handler errors.
pub async fn handle<H: Handler>(
    interceptor: &Interceptor<H>,
    event: LambdaEvent<Value>,
) -> Result<Value, Error> {
    let (payload, context) = event.into_parts();
    let payload = serde_json::to_vec(&payload)?;

    let response = interceptor
        .invoke(&invocation_context(&context), payload)
        .await?;

    if response.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&response)?)
}

/// Returns the event unchanged.
pub async fn echo(_context: InvocationContext, payload: Vec<u8>) -> Result<Vec<u8>, HandlerError> {
    Ok(payload)
}
