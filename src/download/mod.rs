//! Asset fetching. `Fetcher` is the trait boundary the coordinator drives;
//! `HttpFetcher` is the real reqwest-backed adapter used by the CLI.

mod http;

pub use http::HttpFetcher;

use std::future::Future;
use url::Url;

/// The outcome of fetching one asset: body bytes plus whatever content type
/// the transport reported, or the error that ended the attempt.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub content: Vec<u8>,
    pub content_type: Option<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("fetching {url}: {message}")]
pub struct FetchError {
    pub url: Url,
    pub message: String,
}

pub trait Fetcher: Send + Sync {
    // A plain `async fn` here would return an opaque future with no `Send`
    // bound, which `Coordinator::run` can't box into a `Send` trait object
    // for an arbitrary `F`. Spelling the return type out pins that bound to
    // the trait itself.
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<Fetched, FetchError>> + Send;
}
