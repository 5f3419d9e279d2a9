//! HTTP client utilities and the reqwest-backed fetcher.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use crate::client::{FetchError, Fetcher};
use crate::options::HttpOptions;

/// Build a configured HTTP client from HTTP options.
pub fn build_http_client(options: &HttpOptions) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder();

    if let Some(t) = options.timeout {
        builder = builder.timeout(t);
    }
    if let Some(proxy_url) = &options.proxy {
        match reqwest::Proxy::all(proxy_url) {
            Ok(p) => builder = builder.proxy(p),
            Err(e) => tracing::warn!("Ignoring invalid proxy {}: {}", proxy_url, e),
        }
    }

    builder.build()
}

/// Add extra headers to a request if specified in the options.
pub fn add_extra_headers(mut request: RequestBuilder, options: &HttpOptions) -> RequestBuilder {
    if let Some(h) = &options.headers {
        for (key, value) in h {
            request = request.header(key, value);
        }
    }
    request
}

/// Extension trait for Response that logs the response body.
#[async_trait]
pub trait ResponseExt {
    /// Parse response as JSON and log it. Consumes the response.
    async fn json_logged(self) -> Result<Value, FetchError>;
}

#[async_trait]
impl ResponseExt for reqwest::Response {
    async fn json_logged(self) -> Result<Value, FetchError> {
        let bytes = self.bytes().await?;

        if let Ok(text) = std::str::from_utf8(&bytes) {
            tracing::debug!("Upstream response ({} bytes):\n{}", text.len(), text);
        }

        serde_json::from_slice(&bytes).map_err(FetchError::from)
    }
}

/// A [`Fetcher`] that issues real GET requests with reqwest.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: Client,
    options: HttpOptions,
}

impl HttpFetcher {
    /// Create a fetcher whose client is built from `options`.
    pub fn new(options: HttpOptions) -> Result<Self, reqwest::Error> {
        let http = build_http_client(&options)?;
        Ok(Self { http, options })
    }

    /// Get reference to the HTTP options.
    pub fn options(&self) -> &HttpOptions {
        &self.options
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        tracing::debug!("GET {}", url);

        let request = add_extra_headers(self.http.get(url), &self.options);
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        response.json_logged().await
    }
}
