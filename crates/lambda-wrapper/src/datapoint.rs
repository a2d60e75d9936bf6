// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Datapoint model and its ingestion payload.
//!
//! A [`Datapoint`] is immutable once built. Dispatch-time changes (stamping a timestamp,
//! merging default dimensions) consume the point and return a new one.

use serde::Serialize;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    Counter,
    Gauge,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Datapoint {
    metric: String,
    value: Value,
    metric_type: MetricType,
    dimensions: HashMap<String, String>,
    timestamp: Option<i64>,
}

impl Datapoint {
    pub fn new(metric: impl Into<String>, value: Value, metric_type: MetricType) -> Self {
        Datapoint {
            metric: metric.into(),
            value,
            metric_type,
            dimensions: HashMap::new(),
            timestamp: None,
        }
    }

    /// Counter increment.
    pub fn counter(metric: impl Into<String>, value: i64) -> Self {
        Self::new(metric, Value::Int(value), MetricType::Counter)
    }

    pub fn gauge(metric: impl Into<String>, value: f64) -> Self {
        Self::new(metric, Value::Float(value), MetricType::Gauge)
    }

    #[must_use]
    pub fn with_dimension(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.dimensions.insert(key.into(), value.into());
        self
    }

    /// Timestamp in milliseconds since the Unix epoch.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp_ms: i64) -> Self {
        self.timestamp = Some(timestamp_ms);
        self
    }

    pub fn metric(&self) -> &str {
        &self.metric
    }

    pub fn value(&self) -> Value {
        self.value
    }

    pub fn metric_type(&self) -> MetricType {
        self.metric_type
    }

    pub fn dimensions(&self) -> &HashMap<String, String> {
        &self.dimensions
    }

    pub fn timestamp(&self) -> Option<i64> {
        self.timestamp
    }

    /// Sets the timestamp only if the point doesn't carry one already.
    #[must_use]
    pub(crate) fn stamped(mut self, now_ms: i64) -> Self {
        self.timestamp.get_or_insert(now_ms);
        self
    }

    /// Adds the defaults underneath this point's own dimensions. On a key collision the
    /// point's value is kept.
    #[must_use]
    pub(crate) fn with_defaults<'a, I>(mut self, defaults: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (key, value) in defaults {
            self.dimensions
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        self
    }
}

/// Milliseconds since the Unix epoch. A clock before 1970 reads as 0.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[derive(Debug, Serialize, PartialEq)]
struct DatapointEntry<'a> {
    metric: &'a str,
    value: Value,
    dimensions: &'a HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<i64>,
}

/// JSON body accepted by the `v2/datapoint` ingestion API, points grouped by type.
#[derive(Debug, Default, Serialize, PartialEq)]
pub struct DatapointPayload<'a> {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    counter: Vec<DatapointEntry<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    gauge: Vec<DatapointEntry<'a>>,
}

impl<'a> DatapointPayload<'a> {
    pub fn from_datapoints(datapoints: &'a [Datapoint]) -> Self {
        let mut payload = DatapointPayload::default();
        for dp in datapoints {
            let entry = DatapointEntry {
                metric: &dp.metric,
                value: dp.value,
                dimensions: &dp.dimensions,
                timestamp: dp.timestamp,
            };
            match dp.metric_type {
                MetricType::Counter => payload.counter.push(entry),
                MetricType::Gauge => payload.gauge.push(entry),
            }
        }
        payload
    }

    pub(crate) fn len(&self) -> usize {
        self.counter.len() + self.gauge.len()
    }
}
