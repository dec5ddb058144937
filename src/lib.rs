//! # Elasticsearch Exporter
//!
//! Serves Elasticsearch cluster, node and index statistics to Prometheus.
//!
//! ## Architecture
//!
//! - **`app`**: builds the dispatch pipeline, the collection units and the HTTP server from the
//!   configuration
//! - **`exposition`**: turns one collection cycle into the Prometheus text format
//! - **`server`**: the scrape, index and liveness routes
//!
//! Every scrape runs exactly one collection cycle. Nothing is cached between scrapes.

#[macro_use]
extern crate tracing;

mod app;
pub mod error;
pub mod exposition;
mod logging;
pub mod server;

pub use app::App;
pub use elasticsearch_exporter_config::Args;
pub use logging::{
    init_errors,
    init_logging,
};
