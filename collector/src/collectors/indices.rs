use super::{
    EmitFuture,
    UnitCollector,
};
use crate::{
    elasticsearch::{
        model::IndexSummary,
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

const SUBSYSTEM: &str = "index";

struct Template {
    name: &'static str,
    help: &'static str,
    kind: MetricKind,
    value: fn(&IndexSummary) -> f64,
}

fn template(name: &'static str, help: &'static str, kind: MetricKind, value: fn(&IndexSummary) -> f64) -> Template {
    Template { name, help, kind, value }
}

/// Series exported once for the primary shards and once for all shards of every index.
fn templates() -> Vec<Template> {
    use MetricKind::{
        Counter,
        Gauge,
    };

    vec![
        template("docs_count", "Docs count.", Gauge, |s| s.docs.count as f64),
        template("docs_deleted", "Docs deleted.", Gauge, |s| s.docs.deleted as f64),
        template("store_size_bytes", "The size of the store for shards.", Gauge, |s| s.store.size_in_bytes as f64),
        template("search_query_time_seconds", "Total search query time in seconds.", Counter, |s| {
            millis_to_seconds(s.search.query_time_in_millis)
        }),
        template("search_query_total", "Total number of search queries.", Counter, |s| s.search.query_total as f64),
        template("search_fetch_time_seconds", "Total search fetch time in seconds.", Counter, |s| {
            millis_to_seconds(s.search.fetch_time_in_millis)
        }),
        template("search_fetch_total", "Total number of fetches.", Counter, |s| s.search.fetch_total as f64),
        template("indexing_index_total", "Total index calls.", Counter, |s| s.indexing.index_total as f64),
        template("indexing_index_seconds_total", "Cumulative indexing time in seconds.", Counter, |s| {
            millis_to_seconds(s.indexing.index_time_in_millis)
        }),
        template("indexing_throttle_seconds_total", "Cumulative throttle time in seconds.", Counter, |s| {
            millis_to_seconds(s.indexing.throttle_time_in_millis)
        }),
        template("segments_count", "Number of segments.", Gauge, |s| s.segments.count as f64),
        template("segments_memory_bytes", "Segments memory in bytes.", Gauge, |s| s.segments.memory_in_bytes as f64),
        template("query_cache_memory_size_bytes", "Query cache memory usage in bytes.", Gauge, |s| {
            s.query_cache.memory_size_in_bytes as f64
        }),
        template("query_cache_evictions", "Total evictions number from query cache.", Counter, |s| {
            s.query_cache.evictions as f64
        }),
        template("request_cache_memory_size_bytes", "Request cache memory usage in bytes.", Gauge, |s| {
            s.request_cache.memory_size_in_bytes as f64
        }),
        template("request_cache_evictions", "Total evictions number from request cache.", Counter, |s| {
            s.request_cache.evictions as f64
        }),
        template("fielddata_memory_size_bytes", "Fielddata memory usage in bytes.", Gauge, |s| {
            s.fielddata.memory_size_in_bytes as f64
        }),
        template("fielddata_evictions", "Total evictions number from fielddata.", Counter, |s| {
            s.fielddata.evictions as f64
        }),
        template("segments_index_writer_memory_size_bytes", "Index writer memory usage.", Gauge, |s| {
            s.segments.index_writer_memory_in_bytes as f64
        }),
        template("merges_size_bytes", "Merges total size in bytes.", Gauge, |s| s.merges.total_size_in_bytes as f64),
        template("refresh_total", "Total refresh calls.", Counter, |s| s.refresh.total as f64),
        template("refresh_time_seconds", "Total refresh time in seconds.", Counter, |s| {
            millis_to_seconds(s.refresh.total_time_in_millis)
        }),
        template("translog_operations", "Total translog operations.", Counter, |s| s.translog.operations as f64),
        template("translog_size_in_bytes", "Translog size in bytes.", Gauge, |s| s.translog.size_in_bytes as f64),
        template("store_throttle_time_seconds_total", "Time store operations were throttled.", Counter, |s| {
            millis_to_seconds(s.store.throttle_time_in_millis)
        }),
        template("indexing_delete_total", "Total indexing deletes.", Counter, |s| s.indexing.delete_total as f64),
        template("indexing_delete_time_seconds_total", "Total time spent on deletes.", Counter, |s| {
            millis_to_seconds(s.indexing.delete_time_in_millis)
        }),
        template("get_total", "Total get operations.", Counter, |s| s.get.total as f64),
        template("get_time_seconds_total", "Total time spent on get operations.", Counter, |s| {
            millis_to_seconds(s.get.time_in_millis)
        }),
        template("merges_total", "Total merges.", Counter, |s| s.merges.total as f64),
        template("merges_total_time_seconds_total", "Total time spent merging.", Counter, |s| {
            millis_to_seconds(s.merges.total_time_in_millis)
        }),
        template("flush_total", "Total flushes.", Counter, |s| s.flush.total as f64),
        template("flush_time_seconds_total", "Total time spent flushing.", Counter, |s| {
            millis_to_seconds(s.flush.total_time_in_millis)
        }),
    ]
}

fn instantiate(scope: &str, templates: &[Template]) -> Vec<FieldMetric<IndexSummary>> {
    templates
        .iter()
        .map(|template| {
            let descriptor = Descriptor::new(
                template.kind,
                SUBSYSTEM,
                &format!("{scope}_{}", template.name),
                template.help,
                &["cluster", "index"],
            );
            FieldMetric::new(descriptor, template.value)
        })
        .collect()
}

/// Per index statistics from `/_stats`.
pub struct IndexStatsUnit {
    api: Arc<dyn ElasticsearchApi>,
    primaries: Vec<FieldMetric<IndexSummary>>,
    total: Vec<FieldMetric<IndexSummary>>,
}

impl IndexStatsUnit {
    pub fn new(api: Arc<dyn ElasticsearchApi>) -> Self {
        let templates = templates();
        Self {
            api,
            primaries: instantiate("primaries", &templates),
            total: instantiate("total", &templates),
        }
    }
}

impl UnitCollector for IndexStatsUnit {
    fn name(&self) -> &'static str {
        "indices"
    }

    fn describe(&self) -> Vec<Arc<Descriptor>> {
        self.primaries
            .iter()
            .chain(&self.total)
            .map(|metric| Arc::clone(metric.descriptor()))
            .collect()
    }

    fn emit<'a>(&'a self, cluster: &'a str, sink: &'a MetricSink) -> EmitFuture<'a> {
        Box::pin(async move {
            let response = self.api.indices().await.wrap_err("failed to fetch index stats")?;

            for (index, stats) in &response.indices {
                let labels = [cluster, index.as_str()];
                for metric in &self.primaries {
                    metric.emit(sink, &stats.primaries, &labels)?;
                }
                for metric in &self.total {
                    metric.emit(sink, &stats.total, &labels)?;
                }
            }

            Ok(())
        })
    }
}
