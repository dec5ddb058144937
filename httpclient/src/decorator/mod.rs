//! Decorators layered around a [`HttpClient`](crate::HttpClient) with [`decorate`](crate::decorate).

mod base_url;
mod recover;

pub use base_url::{
    base_url,
    BaseUrlClient,
    Endpoint,
};
pub use recover::{
    recover,
    RecoverClient,
};
