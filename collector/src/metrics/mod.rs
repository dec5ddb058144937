mod descriptor;
mod sink;

pub use descriptor::{
    millis_to_seconds,
    Descriptor,
    FieldMetric,
    MetricKind,
    NAMESPACE,
};
pub use sink::{
    Measurement,
    MetricError,
    MetricSink,
};
