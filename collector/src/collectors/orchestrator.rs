use super::{
    all_units,
    UnitCollector,
};
use crate::{
    elasticsearch::{
        ElasticsearchApi,
        HealthLevel,
    },
    metrics::{
        Descriptor,
        MetricSink,
    },
};
use std::{
    collections::HashMap,
    sync::Arc,
    time::{
        Duration,
        Instant,
    },
};
use tokio::task::{
    self,
    JoinSet,
};

/// Outcome of one collection cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// `None` when the cluster name could not be resolved and no unit ran.
    pub cluster: Option<String>,
    pub succeeded: Vec<&'static str>,
    pub failed: Vec<&'static str>,
    pub elapsed: Duration,
}

impl CycleReport {
    pub fn is_complete(&self) -> bool {
        self.cluster.is_some() && self.failed.is_empty()
    }
}

/// Runs every registered unit once per collection cycle.
pub struct Orchestrator {
    api: Arc<dyn ElasticsearchApi>,
    units: Vec<Arc<dyn UnitCollector>>,
}

impl Orchestrator {
    /// Registers every unit of the exporter.
    pub fn new(api: Arc<dyn ElasticsearchApi>, all_nodes: bool) -> Self {
        let units = all_units(Arc::clone(&api), all_nodes);
        Self::with_units(api, units)
    }

    pub fn with_units(api: Arc<dyn ElasticsearchApi>, units: Vec<Arc<dyn UnitCollector>>) -> Self {
        Self { api, units }
    }

    /// Static descriptors of every registered unit.
    pub fn describe(&self) -> Vec<Arc<Descriptor>> {
        self.units.iter().flat_map(|unit| unit.describe()).collect()
    }

    /// Resolves the cluster name, runs every unit concurrently and returns once all of them
    /// finished.
    ///
    /// Nothing is emitted when the cluster name cannot be resolved.
    pub async fn collect(&self, sink: &MetricSink) -> CycleReport {
        let started = Instant::now();
        let mut report = CycleReport {
            cluster: None,
            succeeded: Vec::new(),
            failed: Vec::new(),
            elapsed: Duration::ZERO,
        };

        let cluster: Arc<str> = match self.api.cluster_health(HealthLevel::Cluster).await {
            Ok(health) => health.cluster_name.into(),
            Err(err) => {
                error!(error = %err, "failed to resolve the cluster name, skipping collection");
                report.elapsed = started.elapsed();
                return report;
            }
        };

        let mut tasks = JoinSet::new();
        let mut names = HashMap::with_capacity(self.units.len());
        for unit in &self.units {
            let name = unit.name();
            let unit = Arc::clone(unit);
            let cluster = Arc::clone(&cluster);
            let sink = sink.clone();
            let handle = tasks.spawn(async move { unit.emit(&cluster, &sink).await });
            names.insert(handle.id(), name);
        }

        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((id, Ok(()))) => report.succeeded.push(unit_name(&names, id)),
                Ok((id, Err(err))) => {
                    let name = unit_name(&names, id);
                    error!(unit = name, error = ?err, "collection failed");
                    report.failed.push(name);
                }
                Err(err) => {
                    let name = unit_name(&names, err.id());
                    error!(unit = name, error = %err, "collection task did not finish");
                    report.failed.push(name);
                }
            }
        }

        report.cluster = Some(cluster.to_string());
        report.elapsed = started.elapsed();
        debug!(
            cluster = %cluster,
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            elapsed = ?report.elapsed,
            "collection cycle finished"
        );

        report
    }
}

fn unit_name(names: &HashMap<task::Id, &'static str>, id: task::Id) -> &'static str {
    names.get(&id).copied().unwrap_or("unknown")
}
