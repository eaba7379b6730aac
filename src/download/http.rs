//! `reqwest`-backed `Fetcher` used outside of tests.

use std::future::Future;

use url::Url;

use super::{FetchError, Fetched, Fetcher};

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
                .build()
                .expect("static client configuration is always valid"),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<Fetched, FetchError>> + Send {
        async move {
            let to_err = |message: String| FetchError {
                url: url.clone(),
                message,
            };

            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| to_err(e.to_string()))?;

            let response = response.error_for_status().map_err(|e| to_err(e.to_string()))?;

            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());

            let content = response.bytes().await.map_err(|e| to_err(e.to_string()))?.to_vec();

            Ok(Fetched { content, content_type })
        }
    }
}
