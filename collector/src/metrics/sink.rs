use super::Descriptor;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum MetricError {
    #[error("{name} expects {expected} label values but got {actual}")]
    LabelCardinality {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("the measurement sink has been closed")]
    SinkClosed,
}

/// A descriptor bound to label values and a value for one collection cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    descriptor: Arc<Descriptor>,
    label_values: Vec<String>,
    value: f64,
}

impl Measurement {
    /// Fails when the number of label values does not match the descriptor's label names.
    pub fn new(descriptor: &Arc<Descriptor>, value: f64, label_values: &[&str]) -> Result<Self, MetricError> {
        let expected = descriptor.label_names().len();
        if label_values.len() != expected {
            return Err(MetricError::LabelCardinality {
                name: descriptor.fq_name().to_string(),
                expected,
                actual: label_values.len(),
            });
        }

        Ok(Self {
            descriptor: Arc::clone(descriptor),
            label_values: label_values.iter().map(|value| value.to_string()).collect(),
            value,
        })
    }

    pub fn descriptor(&self) -> &Arc<Descriptor> {
        &self.descriptor
    }

    pub fn label_values(&self) -> &[String] {
        &self.label_values
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Multi-writer output of a collection cycle. Writes never wait for the reader.
///
/// Units get a shared reference and can only write; the stream ends once every clone is dropped.
#[derive(Debug, Clone)]
pub struct MetricSink {
    tx: mpsc::UnboundedSender<Measurement>,
}

impl MetricSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Measurement>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, measurement: Measurement) -> Result<(), MetricError> {
        self.tx.send(measurement).map_err(|_| MetricError::SinkClosed)
    }

    pub fn emit(&self, descriptor: &Arc<Descriptor>, value: f64, label_values: &[&str]) -> Result<(), MetricError> {
        self.send(Measurement::new(descriptor, value, label_values)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn descriptor() -> Arc<Descriptor> {
        Arc::new(Descriptor::gauge("indices", "alias", "help", &["cluster", "index", "alias"]))
    }

    #[test]
    fn label_count_must_match() {
        let err = Measurement::new(&descriptor(), 1.0, &["prod", "logs"]).unwrap_err();

        assert_eq!(
            err,
            MetricError::LabelCardinality {
                name: "elasticsearch_indices_alias".to_string(),
                expected: 3,
                actual: 2,
            }
        );
    }

    #[test]
    fn emitted_measurements_reach_the_receiver_in_order() {
        let (sink, mut rx) = MetricSink::channel();
        let descriptor = descriptor();

        sink.emit(&descriptor, 1.0, &["prod", "logs-1", "logs"]).unwrap();
        sink.clone().emit(&descriptor, 2.0, &["prod", "logs-2", "logs"]).unwrap();
        drop(sink);

        let first = rx.try_recv().unwrap();
        assert_eq!(first.label_values(), ["prod", "logs-1", "logs"]);
        assert_eq!(first.value(), 1.0);
        assert!(Arc::ptr_eq(first.descriptor(), &descriptor));
        assert_eq!(rx.try_recv().unwrap().value(), 2.0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn closed_receiver_is_reported() {
        let (sink, rx) = MetricSink::channel();
        drop(rx);

        assert_eq!(
            sink.emit(&descriptor(), 1.0, &["prod", "logs", "logs"]),
            Err(MetricError::SinkClosed)
        );
    }
}
