use super::{
    model::{
        Aliases,
        ClusterHealth,
        Indices,
        Nodes,
        Recovery,
        Tasks,
    },
    ApiFuture,
    ElasticsearchApi,
    Error,
    HealthLevel,
};
use elasticsearch_exporter_httpclient::{
    Method,
    Request,
    SharedClient,
};
use serde::de::DeserializeOwned;
use url::Url;

/// Issues `GET` requests through the dispatch pipeline and decodes the JSON answers.
///
/// `base` only supplies the scheme and authority when no endpoint decorator rewrites them.
#[derive(Clone)]
pub struct EsClient {
    http: SharedClient,
    base: Url,
}

impl EsClient {
    pub fn new(http: SharedClient, base: Url) -> Self {
        Self { http, base }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.base.join(path).map_err(|source| Error::Url {
            path: path.to_string(),
            source,
        })?;

        trace!(%url, "requesting statistics");
        let response = self.http.execute(Request::new(Method::GET, url)).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                path: path.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(|source| Error::Body {
            path: path.to_string(),
            source: source.into(),
        })?;

        serde_json::from_slice(&body).map_err(|source| Error::Decode {
            path: path.to_string(),
            source,
        })
    }
}

impl ElasticsearchApi for EsClient {
    fn cluster_health(&self, level: HealthLevel) -> ApiFuture<'_, ClusterHealth> {
        Box::pin(async move { self.get(&format!("/_cluster/health?level={level}")).await })
    }

    fn aliases(&self) -> ApiFuture<'_, Aliases> {
        Box::pin(self.get("/_aliases"))
    }

    fn indices(&self) -> ApiFuture<'_, Indices> {
        Box::pin(self.get("/_stats"))
    }

    fn nodes(&self, all: bool) -> ApiFuture<'_, Nodes> {
        let path = if all { "/_nodes/stats" } else { "/_nodes/_local/stats" };
        Box::pin(self.get(path))
    }

    fn recovery(&self) -> ApiFuture<'_, Recovery> {
        Box::pin(self.get("/_recovery?active_only=true"))
    }

    fn tasks(&self) -> ApiFuture<'_, Tasks> {
        Box::pin(self.get("/_cat/tasks?format=json"))
    }
}
