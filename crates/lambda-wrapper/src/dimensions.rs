// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Default dimensions derived from the invoked function ARN.
//!
//! The expected ARN shape is
//! `arn:aws:lambda:<region>:<account-id>:<resource-type>:<resource-name>[:<qualifier>]`,
//! but any string is accepted. A missing or malformed segment only drops the dimension it
//! would have produced and is reported as a [`DimensionDiagnostic`].

use crate::constants::{
    ACCOUNT_ID_DIMENSION, EVENT_SOURCE_MAPPINGS_DIMENSION, EXECUTION_ENV_DIMENSION,
    FUNCTION_NAME_DIMENSION, FUNCTION_QUALIFIER_DIMENSION, FUNCTION_VERSION_DIMENSION,
    LAMBDA_ARN_DIMENSION, METRIC_SOURCE, METRIC_SOURCE_DIMENSION, REGION_DIMENSION,
};
use crate::errors::DimensionDiagnostic;
use std::collections::btree_map::{self, BTreeMap};

const REGION_INDEX: usize = 3;
const ACCOUNT_ID_INDEX: usize = 4;
const RESOURCE_TYPE_INDEX: usize = 5;
const RESOURCE_NAME_INDEX: usize = 6;
const MIN_SEGMENTS: usize = 6;
const UNQUALIFIED_FUNCTION_SEGMENTS: usize = 7;
const QUALIFIED_FUNCTION_SEGMENTS: usize = 8;

const FUNCTION_RESOURCE: &str = "function";
const EVENT_SOURCE_MAPPINGS_RESOURCE: &str = "event-source-mappings";

/// Dimension name to value, ordered by name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DimensionSet(BTreeMap<String, String>);

impl DimensionSet {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), value.into());
    }
}

impl<'a> IntoIterator for &'a DimensionSet {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Derives the default dimension set for an invocation.
#[derive(Clone, Debug, Default)]
pub struct DimensionDeriver {
    execution_env: Option<String>,
}

impl DimensionDeriver {
    /// `execution_env` is copied verbatim into every set when present.
    pub fn new(execution_env: Option<String>) -> Self {
        DimensionDeriver {
            execution_env: execution_env.filter(|env| !env.is_empty()),
        }
    }

    pub fn derive(
        &self,
        invoked_function_arn: &str,
        function_version: &str,
        function_name: &str,
    ) -> (DimensionSet, Vec<DimensionDiagnostic>) {
        let mut dimensions = DimensionSet::default();
        let mut diagnostics = Vec::new();

        dimensions.insert(METRIC_SOURCE_DIMENSION, METRIC_SOURCE);
        dimensions.insert(FUNCTION_VERSION_DIMENSION, function_version);
        dimensions.insert(FUNCTION_NAME_DIMENSION, function_name);
        if let Some(execution_env) = &self.execution_env {
            dimensions.insert(EXECUTION_ENV_DIMENSION, execution_env.as_str());
        }

        if invoked_function_arn.trim().is_empty() {
            diagnostics.push(DimensionDiagnostic::BlankArn);
        }

        let segments: Vec<&str> = invoked_function_arn.split(':').collect();

        match non_empty_segment(&segments, REGION_INDEX) {
            Some(region) => dimensions.insert(REGION_DIMENSION, region),
            None => diagnostics.push(DimensionDiagnostic::MissingRegion(
                invoked_function_arn.to_string(),
            )),
        }
        match non_empty_segment(&segments, ACCOUNT_ID_INDEX) {
            Some(account_id) => dimensions.insert(ACCOUNT_ID_DIMENSION, account_id),
            None => diagnostics.push(DimensionDiagnostic::MissingAccountId(
                invoked_function_arn.to_string(),
            )),
        }

        if segments.len() < MIN_SEGMENTS {
            diagnostics.push(DimensionDiagnostic::InvalidShape {
                arn: invoked_function_arn.to_string(),
                segments: segments.len(),
            });
            return (dimensions, diagnostics);
        }

        match segments[RESOURCE_TYPE_INDEX] {
            FUNCTION_RESOURCE => {
                if segments.len() < UNQUALIFIED_FUNCTION_SEGMENTS {
                    diagnostics.push(DimensionDiagnostic::MissingFunctionName(
                        invoked_function_arn.to_string(),
                    ));
                } else {
                    if segments.len() == QUALIFIED_FUNCTION_SEGMENTS {
                        dimensions.insert(
                            FUNCTION_QUALIFIER_DIMENSION,
                            segments[QUALIFIED_FUNCTION_SEGMENTS - 1],
                        );
                    }
                    // The qualifier in the invoked ARN may be an alias; report the resolved version instead.
                    let mut lambda_arn = segments[..UNQUALIFIED_FUNCTION_SEGMENTS].to_vec();
                    lambda_arn.push(function_version);
                    dimensions.insert(LAMBDA_ARN_DIMENSION, lambda_arn.join(":"));
                }
            }
            EVENT_SOURCE_MAPPINGS_RESOURCE => {
                dimensions.insert(LAMBDA_ARN_DIMENSION, invoked_function_arn);
                match non_empty_segment(&segments, RESOURCE_NAME_INDEX) {
                    Some(mapping_id) => dimensions.insert(EVENT_SOURCE_MAPPINGS_DIMENSION, mapping_id),
                    None => diagnostics.push(DimensionDiagnostic::MissingEventSourceMapping(
                        invoked_function_arn.to_string(),
                    )),
                }
            }
            _ => {}
        }

        (dimensions, diagnostics)
    }
}

fn non_empty_segment<'a>(segments: &[&'a str], index: usize) -> Option<&'a str> {
    segments.get(index).copied().filter(|segment| !segment.is_empty())
}
