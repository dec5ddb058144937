use super::{
    EmitFuture,
    UnitCollector,
};
use crate::{
    elasticsearch::{
        model::{
            ClusterHealth,
            ClusterHealthIndex,
        },
        ElasticsearchApi,
        HealthLevel,
    },
    metrics::{
        millis_to_seconds,
        Descriptor,
        FieldMetric,
        MetricSink,
    },
};
use eyre::WrapErr;
use std::sync::Arc;

const SUBSYSTEM: &str = "cluster_health";

/// Maps the health color to `1` green, `2` yellow, `3` red and `0` for anything else.
pub fn status_value(status: &str) -> f64 {
    match status {
        "green" => 1.0,
        "yellow" => 2.0,
        "red" => 3.0,
        _ => 0.0,
    }
}

fn cluster(name: &str, help: &str, value: fn(&ClusterHealth) -> f64) -> FieldMetric<ClusterHealth> {
    FieldMetric::new(Descriptor::gauge(SUBSYSTEM, name, help, &["cluster"]), value)
}

fn index(name: &str, help: &str, value: fn(&ClusterHealthIndex) -> f64) -> FieldMetric<ClusterHealthIndex> {
    FieldMetric::new(
        Descriptor::gauge(SUBSYSTEM, &format!("index_{name}"), help, &["cluster", "index"]),
        value,
    )
}

pub struct ClusterHealthUnit {
    api: Arc<dyn ElasticsearchApi>,
    cluster: Vec<FieldMetric<ClusterHealth>>,
    index: Vec<FieldMetric<ClusterHealthIndex>>,
}

impl ClusterHealthUnit {
    pub fn new(api: Arc<dyn ElasticsearchApi>) -> Self {
        Self {
            api,
            cluster: vec![
                cluster("status", "Whether all primary and replica shards are allocated (1 green, 2 yellow, 3 red).", |h| {
                    status_value(&h.status)
                }),
                cluster("timed_out", "Whether the health request timed out.", |h| f64::from(u8::from(h.timed_out))),
                cluster("number_of_nodes", "Number of nodes in the cluster.", |h| h.number_of_nodes as f64),
                cluster("number_of_data_nodes", "Number of data nodes in the cluster.", |h| {
                    h.number_of_data_nodes as f64
                }),
                cluster("active_primary_shards", "The number of primary shards in your cluster.", |h| {
                    h.active_primary_shards as f64
                }),
                cluster("active_shards", "Aggregate total of all shards across all indices.", |h| {
                    h.active_shards as f64
                }),
                cluster("relocating_shards", "The number of shards that are currently moving.", |h| {
                    h.relocating_shards as f64
                }),
                cluster("initializing_shards", "Count of shards that are being freshly created.", |h| {
                    h.initializing_shards as f64
                }),
                cluster("unassigned_shards", "The number of shards that exist in the cluster state but cannot be found.", |h| {
                    h.unassigned_shards as f64
                }),
                cluster("delayed_unassigned_shards", "Shards delayed to reduce reallocation overhead.", |h| {
                    h.delayed_unassigned_shards as f64
                }),
                cluster("number_of_pending_tasks", "Cluster level changes which have not yet been executed.", |h| {
                    h.number_of_pending_tasks as f64
                }),
                cluster("number_of_in_flight_fetch", "The number of ongoing shard info requests.", |h| {
                    h.number_of_in_flight_fetch as f64
                }),
                cluster(
                    "task_max_waiting_in_queue_seconds",
                    "Time the longest pending task has been waiting, in seconds.",
                    |h| millis_to_seconds(h.task_max_waiting_in_queue_millis),
                ),
                cluster("active_shards_percent", "Percentage of active shards.", |h| {
                    h.active_shards_percent_as_number
                }),
            ],
            index: vec![
                index("status", "Health of the index (1 green, 2 yellow, 3 red).", |i| status_value(&i.status)),
                index("number_of_shards", "Number of primary shards of the index.", |i| i.number_of_shards as f64),
                index("number_of_replicas", "Number of replicas per primary shard.", |i| i.number_of_replicas as f64),
                index("active_primary_shards", "Active primary shards of the index.", |i| {
                    i.active_primary_shards as f64
                }),
                index("active_shards", "Active shards of the index.", |i| i.active_shards as f64),
                index("relocating_shards", "Relocating shards of the index.", |i| i.relocating_shards as f64),
                index("initializing_shards", "Initializing shards of the index.", |i| i.initializing_shards as f64),
                index("unassigned_shards", "Unassigned shards of the index.", |i| i.unassigned_shards as f64),
            ],
        }
    }
}

impl UnitCollector for ClusterHealthUnit {
    fn name(&self) -> &'static str {
        "cluster_health"
    }

    fn describe(&self) -> Vec<Arc<Descriptor>> {
        self.cluster
            .iter()
            .map(|metric| Arc::clone(metric.descriptor()))
            .chain(self.index.iter().map(|metric| Arc::clone(metric.descriptor())))
            .collect()
    }

    fn emit<'a>(&'a self, cluster: &'a str, sink: &'a MetricSink) -> EmitFuture<'a> {
        Box::pin(async move {
            let health = self
                .api
                .cluster_health(HealthLevel::Indices)
                .await
                .wrap_err("failed to fetch cluster health")?;

            for metric in &self.cluster {
                metric.emit(sink, &health, &[cluster])?;
            }
            for (name, index) in &health.indices {
                for metric in &self.index {
                    metric.emit(sink, index, &[cluster, name.as_str()])?;
                }
            }

            Ok(())
        })
    }
}
