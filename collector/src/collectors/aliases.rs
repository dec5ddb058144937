use super::{
    EmitFuture,
    UnitCollector,
};
use crate::{
    elasticsearch::ElasticsearchApi,
    metrics::{
        Descriptor,
        MetricSink,
    },
};
use eyre::WrapErr;
use std::sync::Arc;

/// Constant `1` per index and alias pair.
pub struct AliasUnit {
    api: Arc<dyn ElasticsearchApi>,
    alias: Arc<Descriptor>,
}

impl AliasUnit {
    pub fn new(api: Arc<dyn ElasticsearchApi>) -> Self {
        Self {
            api,
            alias: Arc::new(Descriptor::gauge(
                "indices",
                "alias",
                "Index alias, always 1.",
                &["cluster", "index", "alias"],
            )),
        }
    }
}

impl UnitCollector for AliasUnit {
    fn name(&self) -> &'static str {
        "aliases"
    }

    fn describe(&self) -> Vec<Arc<Descriptor>> {
        vec![Arc::clone(&self.alias)]
    }

    fn emit<'a>(&'a self, cluster: &'a str, sink: &'a MetricSink) -> EmitFuture<'a> {
        Box::pin(async move {
            let aliases = self.api.aliases().await.wrap_err("failed to fetch aliases")?;

            for (index, info) in &aliases {
                for alias in info.aliases.keys() {
                    sink.emit(&self.alias, 1.0, &[cluster, index.as_str(), alias.as_str()])?;
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
        collectors::testing::drain,
        elasticsearch::fixtures::{
            es_client,
            ALIASES,
        },
    };
    use elasticsearch_exporter_httpclient::{
        mock::MockClient,
        StatusCode,
    };
    use pretty_assertions::assert_eq;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[tokio::test]
    async fn one_series_per_alias() {
        let mock = MockClient::new();
        mock.get("/_aliases").will_return(StatusCode::OK, ALIASES);
        let (sink, mut rx) = MetricSink::channel();

        AliasUnit::new(Arc::new(es_client(&mock)))
            .emit("search-prod", &sink)
            .await
            .unwrap();

        let name = "elasticsearch_indices_alias".to_string();
        assert_eq!(
            drain(&mut rx),
            vec![
                (name.clone(), labels(&["search-prod", "orders-2024.06", "orders"]), 1.0),
                (name, labels(&["search-prod", "orders-2024.06", "orders-write"]), 1.0),
            ]
        );
    }

    #[tokio::test]
    async fn no_aliases_is_not_an_error() {
        let mock = MockClient::new();
        mock.get("/_aliases").will_return(StatusCode::OK, "{}");
        let (sink, mut rx) = MetricSink::channel();

        AliasUnit::new(Arc::new(es_client(&mock)))
            .emit("search-prod", &sink)
            .await
            .unwrap();

        assert!(drain(&mut rx).is_empty());
    }
}
