use super::{
    MetricError,
    MetricSink,
};
use std::{
    collections::BTreeMap,
    fmt,
    sync::Arc,
};

/// Prefix of every exported metric name.
pub const NAMESPACE: &str = "elasticsearch";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Gauge,
    Counter,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Gauge => f.write_str("gauge"),
            MetricKind::Counter => f.write_str("counter"),
        }
    }
}

/// Static identity of one labelled series: its name, kind, help text and label names.
///
/// Built once when a unit is created and shared through an [`Arc`] by every measurement of that
/// series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    fq_name: String,
    help: String,
    kind: MetricKind,
    label_names: Vec<String>,
    const_labels: BTreeMap<String, String>,
}

impl Descriptor {
    /// `subsystem` may be empty, in which case the name is `elasticsearch_{name}`.
    pub fn new(kind: MetricKind, subsystem: &str, name: &str, help: &str, label_names: &[&str]) -> Self {
        let fq_name = [NAMESPACE, subsystem, name]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("_");

        Self {
            fq_name,
            help: help.to_string(),
            kind,
            label_names: label_names.iter().map(|label| label.to_string()).collect(),
            const_labels: BTreeMap::new(),
        }
    }

    pub fn gauge(subsystem: &str, name: &str, help: &str, label_names: &[&str]) -> Self {
        Self::new(MetricKind::Gauge, subsystem, name, help, label_names)
    }

    pub fn counter(subsystem: &str, name: &str, help: &str, label_names: &[&str]) -> Self {
        Self::new(MetricKind::Counter, subsystem, name, help, label_names)
    }

    /// Adds a label whose value is the same for every measurement.
    pub fn const_label(mut self, name: &str, value: &str) -> Self {
        self.const_labels.insert(name.to_string(), value.to_string());
        self
    }

    pub fn fq_name(&self) -> &str {
        &self.fq_name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    pub fn const_labels(&self) -> &BTreeMap<String, String> {
        &self.const_labels
    }
}

/// A series whose value is read from one field of a decoded statistics row.
pub struct FieldMetric<T> {
    descriptor: Arc<Descriptor>,
    value: fn(&T) -> f64,
}

impl<T> FieldMetric<T> {
    pub fn new(descriptor: Descriptor, value: fn(&T) -> f64) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
            value,
        }
    }

    pub fn descriptor(&self) -> &Arc<Descriptor> {
        &self.descriptor
    }

    pub fn value(&self, row: &T) -> f64 {
        (self.value)(row)
    }

    pub fn emit(&self, sink: &MetricSink, row: &T, label_values: &[&str]) -> Result<(), MetricError> {
        sink.emit(&self.descriptor, self.value(row), label_values)
    }
}

/// Elasticsearch reports durations in milliseconds; the exported series are in seconds.
pub fn millis_to_seconds(millis: i64) -> f64 {
    millis as f64 / 1000.0
}
