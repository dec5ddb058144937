//! Read access to the Elasticsearch statistics endpoints.

mod client;
pub mod model;

pub use client::EsClient;
#[cfg(test)]
pub(crate) use client::tests as fixtures;
use model::{
    Aliases,
    ClusterHealth,
    Indices,
    Nodes,
    Recovery,
    Tasks,
};
use std::{
    fmt,
    future::Future,
    pin::Pin,
};

pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, Error>> + Send + 'a>>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] elasticsearch_exporter_httpclient::Error),
    #[error("cannot build the request url for {path}")]
    Url {
        path: String,
        #[source]
        source: url::ParseError,
    },
    #[error("{path} answered with status {status}")]
    Status {
        path: String,
        status: elasticsearch_exporter_httpclient::StatusCode,
    },
    #[error("failed to read the response of {path}")]
    Body {
        path: String,
        #[source]
        source: elasticsearch_exporter_httpclient::Error,
    },
    #[error("failed to decode the response of {path}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Detail level of `/_cluster/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthLevel {
    Cluster,
    Indices,
    Shards,
}

impl HealthLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthLevel::Cluster => "cluster",
            HealthLevel::Indices => "indices",
            HealthLevel::Shards => "shards",
        }
    }
}

impl fmt::Display for HealthLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded statistics resource per call.
pub trait ElasticsearchApi: Send + Sync {
    fn cluster_health(&self, level: HealthLevel) -> ApiFuture<'_, ClusterHealth>;

    fn aliases(&self) -> ApiFuture<'_, Aliases>;

    fn indices(&self) -> ApiFuture<'_, Indices>;

    /// Statistics of the answering node only, or of every node when `all` is set.
    fn nodes(&self, all: bool) -> ApiFuture<'_, Nodes>;

    /// Shard recoveries currently in progress.
    fn recovery(&self) -> ApiFuture<'_, Recovery>;

    fn tasks(&self) -> ApiFuture<'_, Tasks>;
}
