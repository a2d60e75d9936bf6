// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Per-invocation data supplied by the host runtime. Read-only to the wrapper.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InvocationContext {
    pub request_id: String,
    pub invoked_function_arn: String,
    pub function_name: String,
    pub function_version: String,
}

impl InvocationContext {
    pub fn new(
        request_id: impl Into<String>,
        invoked_function_arn: impl Into<String>,
        function_name: impl Into<String>,
        function_version: impl Into<String>,
    ) -> Self {
        InvocationContext {
            request_id: request_id.into(),
            invoked_function_arn: invoked_function_arn.into(),
            function_name: function_name.into(),
            function_version: function_version.into(),
        }
    }
}
