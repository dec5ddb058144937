use super::{
    EmitFuture,
    UnitCollector,
};
use crate::metrics::{
    Descriptor,
    MetricSink,
};
use std::sync::Arc;

const UNKNOWN: &str = "n/a";

/// Constant `1` carrying the exporter's build information as labels.
pub struct BuildInfoUnit {
    info: Arc<Descriptor>,
}

impl BuildInfoUnit {
    pub fn new() -> Self {
        let info = Descriptor::gauge(
            "exporter",
            "build_info",
            "A metric with a constant '1' value labeled by version, rustversion and branch from which the exporter was built.",
            &[],
        )
        .const_label("version", env!("CARGO_PKG_VERSION"))
        .const_label("rustversion", option_env!("RUSTC_VERSION").unwrap_or(UNKNOWN))
        .const_label("branch", option_env!("GIT_BRANCH").unwrap_or(UNKNOWN));

        Self { info: Arc::new(info) }
    }
}

impl Default for BuildInfoUnit {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitCollector for BuildInfoUnit {
    fn name(&self) -> &'static str {
        "build_info"
    }

    fn describe(&self) -> Vec<Arc<Descriptor>> {
        vec![Arc::clone(&self.info)]
    }

    fn emit<'a>(&'a self, _cluster: &'a str, sink: &'a MetricSink) -> EmitFuture<'a> {
        Box::pin(async move {
            sink.emit(&self.info, 1.0, &[])?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::testing::drain;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn emits_a_constant_one() {
        let unit = BuildInfoUnit::new();
        let (sink, mut rx) = MetricSink::channel();

        unit.emit("search-prod", &sink).await.unwrap();

        assert_eq!(
            drain(&mut rx),
            vec![("elasticsearch_exporter_build_info".to_string(), vec![], 1.0)]
        );
    }

    #[test]
    fn build_details_are_const_labels() {
        let unit = BuildInfoUnit::new();
        let described = unit.describe();

        let labels = described[0].const_labels();
        assert_eq!(labels["version"], env!("CARGO_PKG_VERSION"));
        assert!(labels.contains_key("rustversion"));
        assert!(labels.contains_key("branch"));
        assert!(described[0].label_names().is_empty());
    }
}
