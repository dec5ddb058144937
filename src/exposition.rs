//! Renders one collection cycle in the Prometheus text format.
//!
//! Every descriptor is registered once at startup to reject invalid names early. Each scrape then
//! builds a fresh [`Registry`] from the same descriptors, so series that disappeared from the
//! cluster are not exported again.

use elasticsearch_exporter_collector::{
    CycleReport,
    Descriptor,
    Measurement,
    MetricKind,
    MetricSink,
    Orchestrator,
};
use prometheus::{
    CounterVec,
    GaugeVec,
    Opts,
    Registry,
    TextEncoder,
};
use std::{
    collections::HashMap,
    sync::Arc,
};

pub const CONTENT_TYPE: &str = prometheus::TEXT_FORMAT;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("cannot register {name}")]
    Register {
        name: String,
        #[source]
        source: prometheus::Error,
    },
    #[error("cannot encode the collected metrics")]
    Encode(#[source] prometheus::Error),
}

enum Series {
    Gauge(GaugeVec),
    Counter(CounterVec),
}

impl Series {
    fn new(descriptor: &Descriptor) -> Result<Self, prometheus::Error> {
        let opts = Opts::new(descriptor.fq_name(), descriptor.help()).const_labels(
            descriptor
                .const_labels()
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        );
        let labels: Vec<&str> = descriptor.label_names().iter().map(String::as_str).collect();

        Ok(match descriptor.kind() {
            MetricKind::Gauge => Series::Gauge(GaugeVec::new(opts, &labels)?),
            MetricKind::Counter => Series::Counter(CounterVec::new(opts, &labels)?),
        })
    }

    fn register(&self, registry: &Registry) -> Result<(), prometheus::Error> {
        match self {
            Series::Gauge(gauge) => registry.register(Box::new(gauge.clone())),
            Series::Counter(counter) => registry.register(Box::new(counter.clone())),
        }
    }

    fn record(&self, measurement: &Measurement) -> Result<(), String> {
        let values: Vec<&str> = measurement.label_values().iter().map(String::as_str).collect();
        let value = measurement.value();

        match self {
            Series::Gauge(gauge) => {
                gauge
                    .get_metric_with_label_values(&values)
                    .map_err(|err| err.to_string())?
                    .set(value);
            }
            Series::Counter(counter) => {
                if value < 0.0 || value.is_nan() {
                    return Err(format!("counter value {value} is negative"));
                }
                counter
                    .get_metric_with_label_values(&values)
                    .map_err(|err| err.to_string())?
                    .inc_by(value);
            }
        }

        Ok(())
    }
}

/// The descriptors exported on every scrape.
pub struct Exposition {
    descriptors: Vec<Arc<Descriptor>>,
}

impl Exposition {
    /// Fails when a descriptor has an invalid name or label, or a name is used twice.
    pub fn new(descriptors: Vec<Arc<Descriptor>>) -> Result<Self, Error> {
        let exposition = Self { descriptors };
        exposition.registry()?;
        Ok(exposition)
    }

    pub fn descriptors(&self) -> &[Arc<Descriptor>] {
        &self.descriptors
    }

    fn registry(&self) -> Result<(Registry, HashMap<&str, Series>), Error> {
        let registry = Registry::new();
        let mut series = HashMap::with_capacity(self.descriptors.len());

        for descriptor in &self.descriptors {
            let register = |source| Error::Register {
                name: descriptor.fq_name().to_string(),
                source,
            };
            let entry = Series::new(descriptor).map_err(register)?;
            entry.register(&registry).map_err(register)?;
            series.insert(descriptor.fq_name(), entry);
        }

        Ok((registry, series))
    }

    /// Runs one collection cycle and encodes everything it emitted.
    pub async fn scrape(&self, orchestrator: &Orchestrator) -> Result<(String, CycleReport), Error> {
        let (registry, series) = self.registry()?;
        let (sink, mut rx) = MetricSink::channel();

        let collect = async move { orchestrator.collect(&sink).await };
        let record = async {
            let mut skipped = 0usize;
            while let Some(measurement) = rx.recv().await {
                let name = measurement.descriptor().fq_name();
                let Some(entry) = series.get(name) else {
                    warn!(metric = name, "dropping measurement of an unregistered metric");
                    skipped += 1;
                    continue;
                };
                if let Err(reason) = entry.record(&measurement) {
                    warn!(metric = name, labels = ?measurement.label_values(), %reason, "dropping measurement");
                    skipped += 1;
                }
            }
            skipped
        };

        let (report, skipped) = tokio::join!(collect, record);
        if skipped > 0 {
            debug!(skipped, "measurements could not be recorded");
        }

        let body = TextEncoder::new()
            .encode_to_string(&registry.gather())
            .map_err(Error::Encode)?;

        Ok((body, report))
    }
}
