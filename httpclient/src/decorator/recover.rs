use crate::{
    Decorator,
    Error,
    HttpClient,
    SharedClient,
};
use futures::{
    future::BoxFuture,
    FutureExt,
};
use reqwest::{
    Request,
    Response,
};
use std::{
    any::Any,
    panic::{
        catch_unwind,
        AssertUnwindSafe,
    },
    sync::Arc,
};

/// Returns a decorator that turns a panic anywhere below it into [`Error::Panicked`].
///
/// Meant to be the outermost decorator.
pub fn recover() -> Decorator {
    Box::new(|inner: SharedClient| Arc::new(RecoverClient { inner }) as SharedClient)
}

pub struct RecoverClient {
    inner: SharedClient,
}

impl HttpClient for RecoverClient {
    fn execute(&self, request: Request) -> BoxFuture<'_, Result<Response, Error>> {
        // A client may panic while building its future as well as while polling it.
        let pending = match catch_unwind(AssertUnwindSafe(|| self.inner.execute(request))) {
            Ok(pending) => pending,
            Err(payload) => return Box::pin(futures::future::ready(Err(recovered(payload)))),
        };

        Box::pin(async move {
            match AssertUnwindSafe(pending).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => Err(recovered(payload)),
            }
        })
    }
}

fn recovered(payload: Box<dyn Any + Send>) -> Error {
    let message = if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    };

    error!("recovered from panic in http client: {message}");
    Error::Panicked(message)
}
