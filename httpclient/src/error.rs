use reqwest::StatusCode;
use std::path::PathBuf;
use url::Url;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error("{url} answered with status {status}")]
    Status { status: StatusCode, url: Url },
    #[error("failed to fetch data from all {attempts} endpoints")]
    AllEndpointsFailed { attempts: usize },
    #[error("recovered panic: {0}")]
    Panicked(String),
    #[error("invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("at least one endpoint is required")]
    NoEndpoints,
    #[error("request body cannot be replayed against several endpoints")]
    UncloneableRequest,
    #[error("failed to read TLS material from {path:?}")]
    TlsMaterial {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no suitable response registered for {method} {uri}")]
    NoMatchingPromise { method: String, uri: String },
}

impl Error {
    /// True when every redundant endpoint failed, as opposed to a single request failing.
    pub fn is_all_endpoints_failed(&self) -> bool {
        matches!(self, Error::AllEndpointsFailed { .. })
    }
}
