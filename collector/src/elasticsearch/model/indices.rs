use serde::Deserialize;
use std::collections::BTreeMap;

/// `/_stats`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Indices {
    #[serde(rename = "_shards")]
    pub shards: ShardsSummary,
    #[serde(rename = "_all")]
    pub all: IndexStats,
    pub indices: BTreeMap<String, IndexStats>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShardsSummary {
    pub total: i64,
    pub successful: i64,
    pub failed: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct IndexStats {
    pub primaries: IndexSummary,
    pub total: IndexSummary,
}

/// Statistics of either the primary shards or all shards of an index.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct IndexSummary {
    pub docs: Docs,
    pub store: Store,
    pub indexing: Indexing,
    pub get: Get,
    pub search: Search,
    pub merges: Merges,
    pub refresh: Refresh,
    pub flush: Flush,
    pub query_cache: Cache,
    pub fielddata: Cache,
    pub request_cache: Cache,
    pub segments: Segments,
    pub translog: Translog,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Docs {
    pub count: i64,
    pub deleted: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Store {
    pub size_in_bytes: i64,
    pub throttle_time_in_millis: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Indexing {
    pub index_total: i64,
    pub index_time_in_millis: i64,
    pub index_current: i64,
    pub index_failed: i64,
    pub delete_total: i64,
    pub delete_time_in_millis: i64,
    pub delete_current: i64,
    pub is_throttled: bool,
    pub throttle_time_in_millis: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Get {
    pub total: i64,
    pub time_in_millis: i64,
    pub exists_total: i64,
    pub exists_time_in_millis: i64,
    pub missing_total: i64,
    pub missing_time_in_millis: i64,
    pub current: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Search {
    pub open_contexts: i64,
    pub query_total: i64,
    pub query_time_in_millis: i64,
    pub query_current: i64,
    pub fetch_total: i64,
    pub fetch_time_in_millis: i64,
    pub fetch_current: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Merges {
    pub current: i64,
    pub current_docs: i64,
    pub current_size_in_bytes: i64,
    pub total: i64,
    pub total_time_in_millis: i64,
    pub total_docs: i64,
    pub total_size_in_bytes: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Refresh {
    pub total: i64,
    pub total_time_in_millis: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Flush {
    pub total: i64,
    pub total_time_in_millis: i64,
}

/// Shared shape of the query, request, filter and fielddata caches.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Cache {
    pub memory_size_in_bytes: i64,
    pub evictions: i64,
    pub hit_count: i64,
    pub miss_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Segments {
    pub count: i64,
    pub memory_in_bytes: i64,
    pub index_writer_memory_in_bytes: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Translog {
    pub operations: i64,
    pub size_in_bytes: i64,
}
