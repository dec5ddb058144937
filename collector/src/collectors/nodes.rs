use super::{
    EmitFuture,
    UnitCollector,
};
use crate::{
    elasticsearch::{
        model::{
            Breaker,
            FsData,
            GcCollector,
            Node,
            ThreadPool,
        },
        ElasticsearchApi,
    },
    metrics::{
        millis_to_seconds,
        Descriptor,
        FieldMetric,
        MetricKind,
        MetricSink,
    },
};
use eyre::WrapErr;
use std::sync::Arc;

const NODE_LABELS: [&str; 3] = ["cluster", "host", "node"];

fn with_extra(extra: &[&'static str]) -> Vec<&'static str> {
    NODE_LABELS.iter().chain(extra).copied().collect()
}

fn metric<T>(
    kind: MetricKind,
    subsystem: &str,
    name: &str,
    help: &str,
    labels: &[&str],
    value: fn(&T) -> f64,
) -> FieldMetric<T> {
    FieldMetric::new(Descriptor::new(kind, subsystem, name, help, labels), value)
}

fn node_metrics() -> Vec<FieldMetric<Node>> {
    use MetricKind::{
        Counter,
        Gauge,
    };

    fn node(kind: MetricKind, subsystem: &str, name: &str, help: &str, value: fn(&Node) -> f64) -> FieldMetric<Node> {
        metric(kind, subsystem, name, help, &NODE_LABELS, value)
    }

    vec![
        node(Gauge, "node_indices", "docs", "Count of documents on this node.", |n| {
            n.indices.docs.count as f64
        }),
        node(Gauge, "node_indices", "docs_deleted", "Count of deleted documents on this node.", |n| {
            n.indices.docs.deleted as f64
        }),
        node(Gauge, "node_indices", "store_size_bytes", "Current size of stored index data in bytes.", |n| {
            n.indices.store.size_in_bytes as f64
        }),
        node(Counter, "node_indices", "store_throttle_time_seconds_total", "Throttle time for index store in seconds.", |n| {
            millis_to_seconds(n.indices.store.throttle_time_in_millis)
        }),
        node(Counter, "node_indices", "indexing_index_total", "Total index calls.", |n| {
            n.indices.indexing.index_total as f64
        }),
        node(Counter, "node_indices", "indexing_index_time_seconds_total", "Cumulative index time in seconds.", |n| {
            millis_to_seconds(n.indices.indexing.index_time_in_millis)
        }),
        node(Counter, "node_indices", "indexing_delete_total", "Total indexing deletes.", |n| {
            n.indices.indexing.delete_total as f64
        }),
        node(Counter, "node_indices", "indexing_delete_time_seconds_total", "Total time indexing delete in seconds.", |n| {
            millis_to_seconds(n.indices.indexing.delete_time_in_millis)
        }),
        node(Counter, "node_indices", "get_total", "Total get operations.", |n| n.indices.get.total as f64),
        node(Counter, "node_indices", "get_time_seconds", "Total get time in seconds.", |n| {
            millis_to_seconds(n.indices.get.time_in_millis)
        }),
        node(Counter, "node_indices", "get_missing_total", "Total get missing.", |n| {
            n.indices.get.missing_total as f64
        }),
        node(Counter, "node_indices", "get_missing_time_seconds", "Total time of get missing in seconds.", |n| {
            millis_to_seconds(n.indices.get.missing_time_in_millis)
        }),
        node(Counter, "node_indices", "get_exists_total", "Total get exists operations.", |n| {
            n.indices.get.exists_total as f64
        }),
        node(Counter, "node_indices", "get_exists_time_seconds", "Total time get exists in seconds.", |n| {
            millis_to_seconds(n.indices.get.exists_time_in_millis)
        }),
        node(Counter, "node_indices", "search_query_total", "Total number of queries.", |n| {
            n.indices.search.query_total as f64
        }),
        node(Counter, "node_indices", "search_query_time_seconds", "Total search query time in seconds.", |n| {
            millis_to_seconds(n.indices.search.query_time_in_millis)
        }),
        node(Counter, "node_indices", "search_fetch_total", "Total number of fetches.", |n| {
            n.indices.search.fetch_total as f64
        }),
        node(Counter, "node_indices", "search_fetch_time_seconds", "Total search fetch time in seconds.", |n| {
            millis_to_seconds(n.indices.search.fetch_time_in_millis)
        }),
        node(Counter, "node_indices", "merges_total", "Total merges.", |n| n.indices.merges.total as f64),
        node(Counter, "node_indices", "merges_docs_total", "Cumulative docs merged.", |n| {
            n.indices.merges.total_docs as f64
        }),
        node(Counter, "node_indices", "merges_total_size_bytes_total", "Total merge size in bytes.", |n| {
            n.indices.merges.total_size_in_bytes as f64
        }),
        node(Counter, "node_indices", "merges_total_time_seconds_total", "Total time spent merging in seconds.", |n| {
            millis_to_seconds(n.indices.merges.total_time_in_millis)
        }),
        node(Counter, "node_indices", "refresh_total", "Total refreshes.", |n| n.indices.refresh.total as f64),
        node(Counter, "node_indices", "refresh_time_seconds_total", "Total time spent refreshing in seconds.", |n| {
            millis_to_seconds(n.indices.refresh.total_time_in_millis)
        }),
        node(Counter, "node_indices", "flush_total", "Total flushes.", |n| n.indices.flush.total as f64),
        node(Counter, "node_indices", "flush_time_seconds", "Cumulative flush time in seconds.", |n| {
            millis_to_seconds(n.indices.flush.total_time_in_millis)
        }),
        node(Gauge, "node_indices", "fielddata_memory_size_bytes", "Field data cache memory usage in bytes.", |n| {
            n.indices.fielddata.memory_size_in_bytes as f64
        }),
        node(Counter, "node_indices", "fielddata_evictions", "Evictions from field data.", |n| {
            n.indices.fielddata.evictions as f64
        }),
        node(Gauge, "node_indices", "filter_cache_memory_size_bytes", "Filter cache memory usage in bytes.", |n| {
            n.indices.filter_cache.memory_size_in_bytes as f64
        }),
        node(Counter, "node_indices", "filter_cache_evictions", "Evictions from filter cache.", |n| {
            n.indices.filter_cache.evictions as f64
        }),
        node(Gauge, "node_indices", "query_cache_memory_size_bytes", "Query cache memory usage in bytes.", |n| {
            n.indices.query_cache.memory_size_in_bytes as f64
        }),
        node(Counter, "node_indices", "query_cache_evictions", "Evictions from query cache.", |n| {
            n.indices.query_cache.evictions as f64
        }),
        node(Gauge, "node_indices", "request_cache_memory_size_bytes", "Request cache memory usage in bytes.", |n| {
            n.indices.request_cache.memory_size_in_bytes as f64
        }),
        node(Counter, "node_indices", "request_cache_evictions", "Evictions from request cache.", |n| {
            n.indices.request_cache.evictions as f64
        }),
        node(Gauge, "node_indices", "segments_count", "Count of index segments on this node.", |n| {
            n.indices.segments.count as f64
        }),
        node(Gauge, "node_indices", "segments_memory_bytes", "Current memory size of segments in bytes.", |n| {
            n.indices.segments.memory_in_bytes as f64
        }),
        node(Counter, "node_indices", "translog_operations", "Total translog operations.", |n| {
            n.indices.translog.operations as f64
        }),
        node(Counter, "node_indices", "translog_size_in_bytes", "Total translog size in bytes.", |n| {
            n.indices.translog.size_in_bytes as f64
        }),
        node(Gauge, "jvm_memory", "heap_used_bytes", "JVM memory currently used by heap.", |n| {
            n.jvm.mem.heap_used_in_bytes as f64
        }),
        node(Gauge, "jvm_memory", "non_heap_used_bytes", "JVM memory currently used by area.", |n| {
            n.jvm.mem.non_heap_used_in_bytes as f64
        }),
        node(Gauge, "jvm_memory", "heap_max_bytes", "JVM memory max.", |n| n.jvm.mem.heap_max_in_bytes as f64),
        node(Gauge, "jvm_memory", "heap_committed_bytes", "JVM memory currently committed by heap.", |n| {
            n.jvm.mem.heap_committed_in_bytes as f64
        }),
        node(Gauge, "jvm_memory", "non_heap_committed_bytes", "JVM memory currently committed by area.", |n| {
            n.jvm.mem.non_heap_committed_in_bytes as f64
        }),
        node(Gauge, "process", "cpu_percent", "Percent CPU used by process.", |n| n.process.cpu.percent as f64),
        node(Counter, "process", "cpu_time_total_seconds_sum", "Total process CPU time in seconds.", |n| {
            millis_to_seconds(n.process.cpu.total_in_millis)
        }),
        node(Counter, "process", "cpu_time_system_seconds_sum", "Process system CPU time in seconds.", |n| {
            millis_to_seconds(n.process.cpu.sys_in_millis)
        }),
        node(Counter, "process", "cpu_time_user_seconds_sum", "Process user CPU time in seconds.", |n| {
            millis_to_seconds(n.process.cpu.user_in_millis)
        }),
        node(Gauge, "process", "mem_resident_size_bytes", "Resident memory in use by process in bytes.", |n| {
            n.process.mem.resident_in_bytes as f64
        }),
        node(Gauge, "process", "mem_share_size_bytes", "Shared memory in use by process in bytes.", |n| {
            n.process.mem.share_in_bytes as f64
        }),
        node(Gauge, "process", "mem_virtual_size_bytes", "Total virtual memory used in bytes.", |n| {
            n.process.mem.total_virtual_in_bytes as f64
        }),
        node(Gauge, "process", "open_files_count", "Open file descriptors.", |n| {
            n.process.open_file_descriptors as f64
        }),
        node(Gauge, "process", "max_files_descriptors", "Max file descriptors.", |n| {
            n.process.max_file_descriptors as f64
        }),
        node(Gauge, "transport", "server_open", "Current number of inbound TCP connections.", |n| {
            n.transport.server_open as f64
        }),
        node(Counter, "transport", "rx_packets_total", "Count of packets received.", |n| {
            n.transport.rx_count as f64
        }),
        node(Counter, "transport", "rx_size_bytes_total", "Total number of bytes received.", |n| {
            n.transport.rx_size_in_bytes as f64
        }),
        node(Counter, "transport", "tx_packets_total", "Count of packets sent.", |n| {
            n.transport.tx_count as f64
        }),
        node(Counter, "transport", "tx_size_bytes_total", "Total number of bytes sent.", |n| {
            n.transport.tx_size_in_bytes as f64
        }),
    ]
}

fn gc_metrics() -> Vec<FieldMetric<GcCollector>> {
    let l = with_extra(&["gc"]);
    vec![
        metric(MetricKind::Counter, "jvm_gc", "collection_seconds_count", "Count of JVM GC runs.", &l, |c: &GcCollector| {
            c.collection_count as f64
        }),
        metric(MetricKind::Counter, "jvm_gc", "collection_seconds_sum", "GC run time in seconds.", &l, |c: &GcCollector| {
            millis_to_seconds(c.collection_time_in_millis)
        }),
    ]
}

fn breaker_metrics() -> Vec<FieldMetric<Breaker>> {
    let l = with_extra(&["breaker"]);
    vec![
        metric(MetricKind::Gauge, "breakers", "estimated_size_in_bytes", "Estimated size in bytes of breaker.", &l, |b: &Breaker| {
            b.estimated_size_in_bytes as f64
        }),
        metric(MetricKind::Gauge, "breakers", "limit_size_in_bytes", "Limit size in bytes for breaker.", &l, |b: &Breaker| {
            b.limit_size_in_bytes as f64
        }),
        metric(MetricKind::Gauge, "breakers", "overhead", "Overhead of circuit breakers.", &l, |b: &Breaker| b.overhead),
        metric(MetricKind::Counter, "breakers", "tripped", "Tripped for breaker.", &l, |b: &Breaker| b.tripped as f64),
    ]
}

fn thread_pool_metrics() -> Vec<FieldMetric<ThreadPool>> {
    let l = with_extra(&["type"]);
    vec![
        metric(MetricKind::Counter, "thread_pool", "completed_count", "Thread pool operations completed.", &l, |p: &ThreadPool| {
            p.completed as f64
        }),
        metric(MetricKind::Counter, "thread_pool", "rejected_count", "Thread pool operations rejected.", &l, |p: &ThreadPool| {
            p.rejected as f64
        }),
        metric(MetricKind::Gauge, "thread_pool", "active_count", "Thread pool threads active.", &l, |p: &ThreadPool| {
            p.active as f64
        }),
        metric(MetricKind::Gauge, "thread_pool", "largest_count", "Thread pool largest threads count.", &l, |p: &ThreadPool| {
            p.largest as f64
        }),
        metric(MetricKind::Gauge, "thread_pool", "queue_count", "Thread pool operations queued.", &l, |p: &ThreadPool| {
            p.queue as f64
        }),
        metric(MetricKind::Gauge, "thread_pool", "threads_count", "Thread pool current threads count.", &l, |p: &ThreadPool| {
            p.threads as f64
        }),
    ]
}

fn filesystem_metrics() -> Vec<FieldMetric<FsData>> {
    let l = with_extra(&["mount", "path"]);
    vec![
        metric(MetricKind::Gauge, "filesystem_data", "available_bytes", "Available space on block device in bytes.", &l, |d: &FsData| {
            d.available_in_bytes as f64
        }),
        metric(MetricKind::Gauge, "filesystem_data", "free_bytes", "Free space on block device in bytes.", &l, |d: &FsData| {
            d.free_in_bytes as f64
        }),
        metric(MetricKind::Gauge, "filesystem_data", "size_bytes", "Size of block device in bytes.", &l, |d: &FsData| {
            d.total_in_bytes as f64
        }),
    ]
}

/// Node level statistics from `/_nodes/stats`.
pub struct NodeStatsUnit {
    api: Arc<dyn ElasticsearchApi>,
    all: bool,
    node: Vec<FieldMetric<Node>>,
    gc: Vec<FieldMetric<GcCollector>>,
    breakers: Vec<FieldMetric<Breaker>>,
    thread_pools: Vec<FieldMetric<ThreadPool>>,
    filesystem: Vec<FieldMetric<FsData>>,
}

impl NodeStatsUnit {
    /// Reports only the node that answers the request unless `all` is set.
    pub fn new(api: Arc<dyn ElasticsearchApi>, all: bool) -> Self {
        Self {
            api,
            all,
            node: node_metrics(),
            gc: gc_metrics(),
            breakers: breaker_metrics(),
            thread_pools: thread_pool_metrics(),
            filesystem: filesystem_metrics(),
        }
    }

    fn emit_node(&self, sink: &MetricSink, cluster: &str, node: &Node) -> eyre::Result<()> {
        let host = node.host.as_str();
        let node_name = node.name.as_str();
        let labels = [cluster, host, node_name];

        for metric in &self.node {
            metric.emit(sink, node, &labels)?;
        }
        for (name, collector) in &node.jvm.gc.collectors {
            for metric in &self.gc {
                metric.emit(sink, collector, &[cluster, host, node_name, name.as_str()])?;
            }
        }
        for (name, breaker) in &node.breakers {
            for metric in &self.breakers {
                metric.emit(sink, breaker, &[cluster, host, node_name, name.as_str()])?;
            }
        }
        for (name, pool) in &node.thread_pool {
            for metric in &self.thread_pools {
                metric.emit(sink, pool, &[cluster, host, node_name, name.as_str()])?;
            }
        }
        for data in &node.fs.data {
            for metric in &self.filesystem {
                metric.emit(sink, data, &[cluster, host, node_name, data.mount.as_str(), data.path.as_str()])?;
            }
        }

        Ok(())
    }
}

impl UnitCollector for NodeStatsUnit {
    fn name(&self) -> &'static str {
        "nodes"
    }

    fn describe(&self) -> Vec<Arc<Descriptor>> {
        let mut described: Vec<_> = self.node.iter().map(|m| Arc::clone(m.descriptor())).collect();
        described.extend(self.gc.iter().map(|m| Arc::clone(m.descriptor())));
        described.extend(self.breakers.iter().map(|m| Arc::clone(m.descriptor())));
        described.extend(self.thread_pools.iter().map(|m| Arc::clone(m.descriptor())));
        described.extend(self.filesystem.iter().map(|m| Arc::clone(m.descriptor())));
        described
    }

    fn emit<'a>(&'a self, cluster: &'a str, sink: &'a MetricSink) -> EmitFuture<'a> {
        Box::pin(async move {
            let nodes = self.api.nodes(self.all).await.wrap_err("failed to fetch node stats")?;

            for node in nodes.nodes.values() {
                self.emit_node(sink, cluster, node)?;
            }

            Ok(())
        })
    }
}
