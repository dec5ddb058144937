use super::indices::{
    Cache,
    Docs,
    Flush,
    Get,
    Indexing,
    Merges,
    Refresh,
    Search,
    Segments,
    Store,
    Translog,
};
use serde::Deserialize;
use std::collections::BTreeMap;

/// `/_nodes/stats` and `/_nodes/_local/stats`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Nodes {
    pub cluster_name: String,
    /// Node id to its statistics.
    pub nodes: BTreeMap<String, Node>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Node {
    pub name: String,
    pub host: String,
    pub timestamp: i64,
    pub transport_address: String,
    pub indices: NodeIndices,
    pub process: Process,
    pub jvm: Jvm,
    pub thread_pool: BTreeMap<String, ThreadPool>,
    pub fs: Fs,
    pub transport: Transport,
    pub breakers: BTreeMap<String, Breaker>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NodeIndices {
    pub docs: Docs,
    pub store: Store,
    pub indexing: Indexing,
    pub get: Get,
    pub search: Search,
    pub merges: Merges,
    pub refresh: Refresh,
    pub flush: Flush,
    pub fielddata: Cache,
    /// Reported by old server versions only.
    pub filter_cache: Cache,
    pub query_cache: Cache,
    pub request_cache: Cache,
    pub segments: Segments,
    pub translog: Translog,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Process {
    pub timestamp: i64,
    pub open_file_descriptors: i64,
    pub max_file_descriptors: i64,
    pub cpu: ProcessCpu,
    pub mem: ProcessMem,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProcessCpu {
    pub percent: i64,
    pub sys_in_millis: i64,
    pub user_in_millis: i64,
    pub total_in_millis: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProcessMem {
    pub resident_in_bytes: i64,
    pub share_in_bytes: i64,
    pub total_virtual_in_bytes: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Jvm {
    pub mem: JvmMem,
    pub gc: JvmGc,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct JvmMem {
    pub heap_used_in_bytes: i64,
    pub heap_committed_in_bytes: i64,
    pub heap_max_in_bytes: i64,
    pub non_heap_used_in_bytes: i64,
    pub non_heap_committed_in_bytes: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct JvmGc {
    /// Collector name (`young`, `old`) to its statistics.
    pub collectors: BTreeMap<String, GcCollector>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GcCollector {
    pub collection_count: i64,
    pub collection_time_in_millis: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ThreadPool {
    pub threads: i64,
    pub queue: i64,
    pub active: i64,
    pub rejected: i64,
    pub largest: i64,
    pub completed: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Fs {
    pub timestamp: i64,
    pub data: Vec<FsData>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FsData {
    pub path: String,
    pub mount: String,
    pub total_in_bytes: i64,
    pub free_in_bytes: i64,
    pub available_in_bytes: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Transport {
    pub server_open: i64,
    pub rx_count: i64,
    pub rx_size_in_bytes: i64,
    pub tx_count: i64,
    pub tx_size_in_bytes: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Breaker {
    pub limit_size_in_bytes: i64,
    pub estimated_size_in_bytes: i64,
    pub overhead: f64,
    pub tripped: i64,
}
