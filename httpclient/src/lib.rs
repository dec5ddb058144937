//! # HTTP dispatch
//!
//! Everything the exporter sends to Elasticsearch goes through a [`HttpClient`]. The innermost
//! client is [`ReqwestClient`]; behaviour such as fanning a request out to several nodes or
//! turning panics into errors is layered on top with [`decorate`]:
//!
//! ```no_run
//! # use elasticsearch_exporter_httpclient::*;
//! # fn build(base: SharedClient) -> Result<SharedClient, Error> {
//! let client = decorate(
//!     base,
//!     [
//!         decorator::base_url(["http://es-1:9200", "http://es-2:9200"])?,
//!         // Outermost, so panics raised inside the other decorators are caught as well.
//!         decorator::recover(),
//!     ],
//! );
//! # Ok(client)
//! # }
//! ```

#[macro_use]
extern crate tracing;

mod base;
pub mod decorator;
mod error;
pub mod mock;

pub use base::ReqwestClient;
pub use error::Error;
use futures::future::BoxFuture;
pub use reqwest::{
    Method,
    Request,
    Response,
    StatusCode,
};
use std::{
    future::Future,
    sync::Arc,
};

/// Sends one [`Request`] and resolves to its [`Response`] or an [`Error`].
pub trait HttpClient: Send + Sync {
    fn execute(&self, request: Request) -> BoxFuture<'_, Result<Response, Error>>;
}

pub type SharedClient = Arc<dyn HttpClient>;

/// Wraps a client with extra behaviour.
pub type Decorator = Box<dyn FnOnce(SharedClient) -> SharedClient + Send>;

/// Applies `decorators` around `client` in order, so the last decorator ends up closest to the
/// caller.
pub fn decorate(client: SharedClient, decorators: impl IntoIterator<Item = Decorator>) -> SharedClient {
    decorators
        .into_iter()
        .fold(client, |client, decorator| decorator(client))
}

/// A client backed by a plain function or closure.
pub struct ClientFn<F>(F);

pub fn client_fn<F, Fut>(f: F) -> ClientFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
    ClientFn(f)
}

impl<F, Fut> HttpClient for ClientFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
    fn execute(&self, request: Request) -> BoxFuture<'_, Result<Response, Error>> {
        Box::pin((self.0)(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    fn get(url: &str) -> Request {
        Request::new(Method::GET, url.parse().unwrap())
    }

    fn tagging(tag: &'static str, trail: Arc<Mutex<Vec<&'static str>>>) -> Decorator {
        Box::new(move |inner: SharedClient| {
            Arc::new(client_fn(move |request| {
                trail.lock().unwrap().push(tag);
                let inner = Arc::clone(&inner);
                async move { inner.execute(request).await }
            })) as SharedClient
        })
    }

    #[tokio::test]
    async fn last_decorator_is_outermost() {
        let trail = Arc::new(Mutex::new(Vec::new()));
        let base: SharedClient = {
            let trail = Arc::clone(&trail);
            Arc::new(client_fn(move |_| {
                trail.lock().unwrap().push("base");
                async { Ok(Response::from(http::Response::new(String::new()))) }
            }))
        };

        let client = decorate(
            base,
            [tagging("inner", Arc::clone(&trail)), tagging("outer", Arc::clone(&trail))],
        );
        client.execute(get("http://localhost/")).await.unwrap();

        assert_eq!(*trail.lock().unwrap(), vec!["outer", "inner", "base"]);
    }

    #[tokio::test]
    async fn no_decorators_returns_the_client_itself() {
        let base: SharedClient = Arc::new(client_fn(|_| async {
            let mut response = http::Response::new(String::new());
            *response.status_mut() = StatusCode::ACCEPTED;
            Ok(Response::from(response))
        }));

        let client = decorate(base, std::iter::empty());

        let response = client.execute(get("http://localhost/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }
}
