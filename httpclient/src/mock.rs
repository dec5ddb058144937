//! An in-memory [`HttpClient`] answering with canned responses, for tests.
//!
//! ```
//! # use elasticsearch_exporter_httpclient::{mock::MockClient, StatusCode};
//! let client = MockClient::new();
//! client
//!     .get("/_cluster/health?level=cluster")
//!     .will_return(StatusCode::OK, r#"{"cluster_name":"prod"}"#);
//! ```

use crate::{
    Error,
    HttpClient,
};
use futures::future::{
    ready,
    BoxFuture,
};
use reqwest::{
    Method,
    Request,
    Response,
    StatusCode,
};
use std::sync::{
    Arc,
    Mutex,
    PoisonError,
};

type Checker = Arc<dyn Fn(&Request) -> bool + Send + Sync>;

struct Promise {
    checkers: Vec<Checker>,
    status: StatusCode,
    body: String,
}

impl Promise {
    fn matches(&self, request: &Request) -> bool {
        self.checkers.iter().all(|checker| checker(request))
    }

    fn respond(&self) -> Response {
        let mut response = http::Response::new(self.body.clone());
        *response.status_mut() = self.status;
        Response::from(response)
    }
}

/// Answers each request with the first registered promise whose checks all pass.
#[derive(Clone, Default)]
pub struct MockClient {
    promises: Arc<Mutex<Vec<Promise>>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a GET for `path`, which includes the query string.
    pub fn get(&self, path: &str) -> PromiseBuilder<'_> {
        self.request().get(path)
    }

    pub fn post(&self, path: &str) -> PromiseBuilder<'_> {
        self.request().post(path)
    }

    /// A promise without any checks, matching every request.
    pub fn request(&self) -> PromiseBuilder<'_> {
        PromiseBuilder {
            client: self,
            checkers: Vec::new(),
        }
    }

    fn register(&self, promise: Promise) {
        self.promises
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(promise);
    }
}

impl HttpClient for MockClient {
    fn execute(&self, request: Request) -> BoxFuture<'_, Result<Response, Error>> {
        let promises = self.promises.lock().unwrap_or_else(PoisonError::into_inner);
        let outcome = match promises.iter().find(|promise| promise.matches(&request)) {
            Some(promise) => Ok(promise.respond()),
            None => Err(Error::NoMatchingPromise {
                method: request.method().to_string(),
                uri: request.url().to_string(),
            }),
        };
        Box::pin(ready(outcome))
    }
}

/// Collects the checks for one canned response.
#[must_use = "the promise is only registered by `will_return`"]
pub struct PromiseBuilder<'a> {
    client: &'a MockClient,
    checkers: Vec<Checker>,
}

impl PromiseBuilder<'_> {
    pub fn get(self, path: &str) -> Self {
        self.with_method(Method::GET).with_path(path)
    }

    pub fn post(self, path: &str) -> Self {
        self.with_method(Method::POST).with_path(path)
    }

    pub fn with_method(self, method: Method) -> Self {
        self.with_checker(move |request| *request.method() == method)
    }

    /// Matches path and query exactly, e.g. `/_nodes/stats?level=shards`.
    pub fn with_path(self, path: &str) -> Self {
        let expected = path.to_string();
        self.with_checker(move |request| request_uri(request) == expected)
    }

    pub fn with_header(self, name: &str, value: &str) -> Self {
        let name = name.to_string();
        let value = value.to_string();
        self.with_checker(move |request| {
            request
                .headers()
                .get(name.as_str())
                .and_then(|header| header.to_str().ok())
                == Some(value.as_str())
        })
    }

    /// Matches `host` or `host:port`, as the request's authority is written.
    pub fn with_host(self, host: &str) -> Self {
        let expected = host.to_string();
        self.with_checker(move |request| {
            let url = request.url();
            let actual = match (url.host_str(), url.port()) {
                (Some(host), Some(port)) => format!("{host}:{port}"),
                (Some(host), None) => host.to_string(),
                (None, _) => String::new(),
            };
            actual == expected
        })
    }

    pub fn with_body(self, body: &str) -> Self {
        let expected = body.as_bytes().to_vec();
        self.with_checker(move |request| {
            let actual = request.body().and_then(|body| body.as_bytes()).unwrap_or_default();
            actual == expected.as_slice()
        })
    }

    pub fn with_checker(mut self, checker: impl Fn(&Request) -> bool + Send + Sync + 'static) -> Self {
        self.checkers.push(Arc::new(checker));
        self
    }

    /// Registers the promise; matching requests get `status` and `body`.
    pub fn will_return(self, status: StatusCode, body: impl Into<String>) {
        self.client.register(Promise {
            checkers: self.checkers,
            status,
            body: body.into(),
        });
    }
}

fn request_uri(request: &Request) -> String {
    let url = request.url();
    match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request(method: Method, url: &str) -> Request {
        Request::new(method, url.parse().unwrap())
    }

    async fn body_of(client: &MockClient, request: Request) -> Option<String> {
        match client.execute(request).await {
            Ok(response) => Some(response.text().await.unwrap()),
            Err(_) => None,
        }
    }

    #[tokio::test]
    async fn unmatched_request_is_an_error() {
        let client = MockClient::new();

        let err = client
            .execute(request(Method::GET, "http://localhost:9200/_cat/aliases"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NoMatchingPromise { .. }));
        assert_eq!(
            err.to_string(),
            "no suitable response registered for GET http://localhost:9200/_cat/aliases"
        );
    }

    #[tokio::test]
    async fn get_matches_method_path_and_query() {
        let client = MockClient::new();
        client.get("/_nodes/stats?level=shards").will_return(StatusCode::OK, "nodes");

        let hit = body_of(&client, request(Method::GET, "http://es:9200/_nodes/stats?level=shards")).await;
        assert_eq!(hit.as_deref(), Some("nodes"));

        for miss in [
            request(Method::POST, "http://es:9200/_nodes/stats?level=shards"),
            request(Method::GET, "http://es:9200/_nodes/stats"),
            request(Method::GET, "http://es:9200/_nodes/stats/?level=shards"),
        ] {
            assert_eq!(body_of(&client, miss).await, None);
        }
    }

    #[tokio::test]
    async fn first_registered_match_wins() {
        let client = MockClient::new();
        client.get("/").will_return(StatusCode::OK, "first");
        client.request().will_return(StatusCode::OK, "fallback");

        assert_eq!(
            body_of(&client, request(Method::GET, "http://es/")).await.as_deref(),
            Some("first")
        );
        assert_eq!(
            body_of(&client, request(Method::DELETE, "http://es/index")).await.as_deref(),
            Some("fallback")
        );
    }

    #[tokio::test]
    async fn header_host_and_body_checks() {
        let client = MockClient::new();
        client
            .post("/_search")
            .with_host("es-1:9200")
            .with_header("content-type", "application/json")
            .with_body(r#"{"size":0}"#)
            .will_return(StatusCode::CREATED, "searched");

        let mut matching = request(Method::POST, "http://es-1:9200/_search");
        matching
            .headers_mut()
            .insert("content-type", "application/json".parse().unwrap());
        *matching.body_mut() = Some(r#"{"size":0}"#.into());
        let response = client.execute(matching).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let mut other_host = request(Method::POST, "http://es-2:9200/_search");
        other_host
            .headers_mut()
            .insert("content-type", "application/json".parse().unwrap());
        *other_host.body_mut() = Some(r#"{"size":0}"#.into());
        assert!(client.execute(other_host).await.is_err());

        let no_body = request(Method::POST, "http://es-1:9200/_search");
        assert!(client.execute(no_body).await.is_err());
    }

    #[tokio::test]
    async fn canned_response_can_be_served_repeatedly() {
        let client = MockClient::new();
        client
            .request()
            .will_return(StatusCode::SERVICE_UNAVAILABLE, "down");

        for _ in 0..3 {
            let response = client.execute(request(Method::GET, "http://es/")).await.unwrap();
            assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
            assert_eq!(response.text().await.unwrap(), "down");
        }
    }

    #[tokio::test]
    async fn clones_share_promises() {
        let client = MockClient::new();
        let handle = client.clone();
        handle.get("/").will_return(StatusCode::OK, "shared");

        assert_eq!(
            body_of(&client, request(Method::GET, "http://es/")).await.as_deref(),
            Some("shared")
        );
    }
}
