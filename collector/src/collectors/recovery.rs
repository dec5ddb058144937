use super::{
    EmitFuture,
    UnitCollector,
};
use crate::{
    elasticsearch::{
        model::ShardRecovery,
        ElasticsearchApi,
    },
    metrics::{
        Descriptor,
        FieldMetric,
        MetricSink,
    },
};
use eyre::WrapErr;
use std::sync::Arc;

const SUBSYSTEM: &str = "index_recovery";

/// Position of a recovery stage, `0` when unknown.
pub fn stage_value(stage: &str) -> f64 {
    match stage {
        "INIT" => 1.0,
        "INDEX" => 2.0,
        "START" => 3.0,
        "TRANSLOG" => 4.0,
        "FINALIZE" => 5.0,
        "DONE" => 6.0,
        _ => 0.0,
    }
}

fn shard(name: &str, help: &str, value: fn(&ShardRecovery) -> f64) -> FieldMetric<ShardRecovery> {
    FieldMetric::new(
        Descriptor::gauge(
            SUBSYSTEM,
            name,
            help,
            &["cluster", "index", "shard_id", "src_name", "target_name"],
        ),
        value,
    )
}

/// Progress of the shard recoveries currently running.
pub struct RecoveryUnit {
    api: Arc<dyn ElasticsearchApi>,
    info: Arc<Descriptor>,
    metrics: Vec<FieldMetric<ShardRecovery>>,
}

impl RecoveryUnit {
    pub fn new(api: Arc<dyn ElasticsearchApi>) -> Self {
        Self {
            api,
            info: Arc::new(Descriptor::gauge(
                SUBSYSTEM,
                "info",
                "Index recovery info",
                &[
                    "cluster",
                    "index",
                    "shard_id",
                    "type",
                    "is_primary",
                    "src_name",
                    "src_ip",
                    "target_name",
                    "target_ip",
                ],
            )),
            metrics: vec![
                shard("bytes_total", "Total size of index shard in bytes", |s| {
                    s.index.size.total_in_bytes as f64
                }),
                shard("bytes_recovered", "Size of recovered data in bytes", |s| {
                    s.index.size.recovered_in_bytes as f64
                }),
                shard("files_total", "Number of files in index shard", |s| s.index.files.total as f64),
                shard("files_recovered", "Number of recovered files in index shard", |s| {
                    s.index.files.recovered as f64
                }),
                shard("translog_total", "Total size of translog", |s| s.translog.total as f64),
                shard("translog_recovered", "Total size of recovered translog", |s| {
                    s.translog.recovered as f64
                }),
                shard(
                    "stage",
                    "Index shard recovery stage. 1 = INIT, 2 = INDEX, 3 = START, 4 = TRANSLOG, 5 = FINALIZE, 6 = DONE.",
                    |s| stage_value(&s.stage),
                ),
            ],
        }
    }
}

impl UnitCollector for RecoveryUnit {
    fn name(&self) -> &'static str {
        "recovery"
    }

    fn describe(&self) -> Vec<Arc<Descriptor>> {
        std::iter::once(Arc::clone(&self.info))
            .chain(self.metrics.iter().map(|metric| Arc::clone(metric.descriptor())))
            .collect()
    }

    fn emit<'a>(&'a self, cluster: &'a str, sink: &'a MetricSink) -> EmitFuture<'a> {
        Box::pin(async move {
            let recovery = self.api.recovery().await.wrap_err("failed to fetch recovery stats")?;

            for (index, recoveries) in &recovery {
                for shard in &recoveries.shards {
                    let shard_id = shard.id.to_string();
                    let is_primary = if shard.primary { "true" } else { "false" };

                    sink.emit(
                        &self.info,
                        1.0,
                        &[
                            cluster,
                            index.as_str(),
                            shard_id.as_str(),
                            shard.kind.as_str(),
                            is_primary,
                            shard.source.name.as_str(),
                            shard.source.ip.as_str(),
                            shard.target.name.as_str(),
                            shard.target.ip.as_str(),
                        ],
                    )?;

                    let labels = [
                        cluster,
                        index.as_str(),
                        shard_id.as_str(),
                        shard.source.name.as_str(),
                        shard.target.name.as_str(),
                    ];
                    for metric in &self.metrics {
                        metric.emit(sink, shard, &labels)?;
                    }
                }
            }

            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        collectors::testing::{
            drain,
            value_of,
        },
        elasticsearch::fixtures::{
            es_client,
            RECOVERY,
        },
    };
    use elasticsearch_exporter_httpclient::{
        mock::MockClient,
        StatusCode,
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn stages() {
        let stages = ["INIT", "INDEX", "START", "TRANSLOG", "FINALIZE", "DONE"];
        for (position, stage) in stages.iter().enumerate() {
            assert_eq!(stage_value(stage), (position + 1) as f64);
        }
        assert_eq!(stage_value("VERIFY_INDEX"), 0.0);
    }

    #[tokio::test]
    async fn info_and_progress_per_shard() {
        let mock = MockClient::new();
        mock.get("/_recovery?active_only=true").will_return(StatusCode::OK, RECOVERY);
        let (sink, mut rx) = MetricSink::channel();

        RecoveryUnit::new(Arc::new(es_client(&mock)))
            .emit("search-prod", &sink)
            .await
            .unwrap();
        let measurements = drain(&mut rx);
        let labels = ["search-prod", "orders-2024.06", "3", "es-data-1", "es-data-2"];

        assert_eq!(measurements.len(), 8);
        assert_eq!(
            value_of(
                &measurements,
                "elasticsearch_index_recovery_info",
                &[
                    "search-prod",
                    "orders-2024.06",
                    "3",
                    "PEER",
                    "true",
                    "es-data-1",
                    "10.0.0.11",
                    "es-data-2",
                    "10.0.0.12"
                ]
            ),
            Some(1.0)
        );
        assert_eq!(
            value_of(&measurements, "elasticsearch_index_recovery_bytes_recovered", &labels),
            Some(5242880.0)
        );
        assert_eq!(
            value_of(&measurements, "elasticsearch_index_recovery_stage", &labels),
            Some(4.0)
        );
    }

    #[tokio::test]
    async fn no_active_recovery() {
        let mock = MockClient::new();
        mock.get("/_recovery?active_only=true").will_return(StatusCode::OK, "{}");
        let unit = RecoveryUnit::new(Arc::new(es_client(&mock)));
        let (sink, mut rx) = MetricSink::channel();

        unit.emit("search-prod", &sink).await.unwrap();

        assert!(drain(&mut rx).is_empty());
        assert_eq!(unit.describe().len(), 8);
    }
}
