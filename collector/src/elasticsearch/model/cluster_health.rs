use serde::Deserialize;
use std::collections::BTreeMap;

/// `/_cluster/health`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClusterHealth {
    pub cluster_name: String,
    pub status: String,
    pub timed_out: bool,
    pub number_of_nodes: i64,
    pub number_of_data_nodes: i64,
    pub active_primary_shards: i64,
    pub active_shards: i64,
    pub relocating_shards: i64,
    pub initializing_shards: i64,
    pub unassigned_shards: i64,
    pub delayed_unassigned_shards: i64,
    pub number_of_pending_tasks: i64,
    pub number_of_in_flight_fetch: i64,
    pub task_max_waiting_in_queue_millis: i64,
    pub active_shards_percent_as_number: f64,
    /// Only present for the `indices` and `shards` levels.
    pub indices: BTreeMap<String, ClusterHealthIndex>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClusterHealthIndex {
    pub status: String,
    pub number_of_shards: i64,
    pub number_of_replicas: i64,
    pub active_primary_shards: i64,
    pub active_shards: i64,
    pub relocating_shards: i64,
    pub initializing_shards: i64,
    pub unassigned_shards: i64,
}
