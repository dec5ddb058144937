//! # Collectors Module
//!
//! One unit collector per category of Elasticsearch statistics, plus the orchestrator that runs
//! them.
//!
//! ## Architecture
//!
//! - **`UnitCollector` trait**: static descriptors and one fetch-and-emit pass per cycle
//! - **`BuildInfoUnit`**: exporter version information
//! - **`ClusterHealthUnit`**: cluster and per-index health
//! - **`NodeStatsUnit`**: JVM, process, thread pool, filesystem and breaker statistics per node
//! - **`AliasUnit`**: index to alias mapping
//! - **`IndexStatsUnit`**: primaries and total statistics per index
//! - **`RecoveryUnit`**: active shard recoveries
//! - **`TaskUnit`**: longest running task per action and node
//! - **`Orchestrator`**: resolves the cluster name and fans out to every unit
//!
//! ## Failure handling
//!
//! A unit reports a failed fetch through its result. The orchestrator logs it with the unit's name
//! and keeps the measurements every other unit wrote.

pub mod aliases;
pub mod build_info;
pub mod cluster_health;
pub mod indices;
pub mod nodes;
pub mod orchestrator;
pub mod recovery;
pub mod tasks;

use crate::{
    elasticsearch::ElasticsearchApi,
    metrics::{
        Descriptor,
        MetricSink,
    },
};
use eyre::Result;
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
};

pub use aliases::AliasUnit;
pub use build_info::BuildInfoUnit;
pub use cluster_health::ClusterHealthUnit;
pub use indices::IndexStatsUnit;
pub use nodes::NodeStatsUnit;
pub use orchestrator::{
    CycleReport,
    Orchestrator,
};
pub use recovery::RecoveryUnit;
pub use tasks::TaskUnit;

pub type EmitFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Gathers one category of statistics.
pub trait UnitCollector: Send + Sync {
    /// Used to attribute failures in logs.
    fn name(&self) -> &'static str;

    /// Every descriptor this unit may ever emit, whether or not data is available.
    fn describe(&self) -> Vec<Arc<Descriptor>>;

    /// Fetches this unit's resource and writes its measurements, labelled with `cluster` where the
    /// series carries that label.
    ///
    /// An empty resource emits nothing and is not an error. The sink must not be closed.
    fn emit<'a>(&'a self, cluster: &'a str, sink: &'a MetricSink) -> EmitFuture<'a>;
}

/// Every unit, in registration order.
pub fn all_units(api: Arc<dyn ElasticsearchApi>, all_nodes: bool) -> Vec<Arc<dyn UnitCollector>> {
    vec![
        Arc::new(BuildInfoUnit::new()),
        Arc::new(ClusterHealthUnit::new(Arc::clone(&api))),
        Arc::new(NodeStatsUnit::new(Arc::clone(&api), all_nodes)),
        Arc::new(AliasUnit::new(Arc::clone(&api))),
        Arc::new(IndexStatsUnit::new(Arc::clone(&api))),
        Arc::new(RecoveryUnit::new(Arc::clone(&api))),
        Arc::new(TaskUnit::new(api)),
    ]
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::metrics::Measurement;
    use tokio::sync::mpsc::UnboundedReceiver;

    /// Drains everything written so far into `(name, labels, value)` triples.
    pub fn drain(rx: &mut UnboundedReceiver<Measurement>) -> Vec<(String, Vec<String>, f64)> {
        let mut out = Vec::new();
        while let Ok(measurement) = rx.try_recv() {
            out.push((
                measurement.descriptor().fq_name().to_string(),
                measurement.label_values().to_vec(),
                measurement.value(),
            ));
        }
        out
    }

    /// Value of the single measurement with this name and labels.
    pub fn value_of(measurements: &[(String, Vec<String>, f64)], name: &str, labels: &[&str]) -> Option<f64> {
        measurements
            .iter()
            .find(|(n, l, _)| n == name && l.iter().map(String::as_str).eq(labels.iter().copied()))
            .map(|(_, _, value)| *value)
    }
}
