//! # Elasticsearch statistics collection
//!
//! ## Architecture
//!
//! - **`metrics`**: measurement descriptors, measurements and the [`MetricSink`] they are written to
//! - **`elasticsearch`**: the data-access client for the statistics endpoints and their wire models
//! - **`collectors`**: one [`UnitCollector`] per category of statistics and the [`Orchestrator`]
//!   running all of them for one collection cycle
//!
//! ## Collection cycle
//!
//! The orchestrator resolves the cluster name once, then runs every unit concurrently. Each unit
//! fetches its own resource through the shared dispatch pipeline and writes its measurements to the
//! sink. A failing unit is logged and skipped; the others are unaffected.

#[macro_use]
extern crate tracing;

pub mod collectors;
pub mod elasticsearch;
pub mod metrics;

pub use collectors::{
    CycleReport,
    Orchestrator,
    UnitCollector,
};
pub use elasticsearch::{
    ElasticsearchApi,
    EsClient,
};
pub use metrics::{
    Descriptor,
    Measurement,
    MetricError,
    MetricKind,
    MetricSink,
};
