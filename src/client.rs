//! Core fetcher trait and error types.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while fetching an upstream resource.
///
/// Tool handlers currently collapse every variant into the same fallback
/// message, but the variants are kept apart so callers can tell them apart.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("Unexpected status: {0}")]
    Status(StatusCode),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Network(err)
        }
    }
}

/// A single-shot JSON GET against an upstream API.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url` and return the decoded JSON body.
    ///
    /// Implementations make exactly one attempt. Any transport failure,
    /// non-success status or undecodable body is reported as a `FetchError`.
    async fn get_json(&self, url: &str) -> Result<Value, FetchError>;
}

/// Typed decoding on top of [`Fetcher`].
#[async_trait]
pub trait FetcherExt: Fetcher {
    /// Fetch `url` and decode the body into `T`.
    async fn fetch<T: DeserializeOwned + Send>(&self, url: &str) -> Result<T, FetchError> {
        let value = self.get_json(url).await?;
        serde_json::from_value(value).map_err(FetchError::from)
    }
}

impl<F: Fetcher + ?Sized> FetcherExt for F {}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Serves canned JSON per URL; unknown URLs answer 404.
    #[derive(Clone, Default)]
    pub(crate) struct MockFetcher {
        responses: Arc<Mutex<HashMap<String, Value>>>,
        pub(crate) requests: Arc<Mutex<Vec<String>>>,
    }

    impl MockFetcher {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn respond(self, url: &str, body: Value) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert(url.to_string(), body);
            self
        }

        pub(crate) fn requested(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for MockFetcher {
        async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            self.responses
                .lock()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or(FetchError::Status(StatusCode::NOT_FOUND))
        }
    }
}
