//! Product listing handler.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::client::{Fetcher, FetcherExt};

pub const PRODUCTS_UNAVAILABLE: &str = "Unable to fetch products";

/// Default number of records returned by `get_products`.
pub const DEFAULT_LIMIT: i64 = 50;

/// The two shapes the listing endpoint may answer with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductPayload {
    List(Vec<Value>),
    Single(Map<String, Value>),
}

impl ProductPayload {
    /// Keep at most `limit` records of a list. A single record is left untouched.
    pub fn truncate(self, limit: i64) -> Self {
        match self {
            ProductPayload::List(mut items) => {
                items.truncate(usize::try_from(limit).unwrap_or(0));
                ProductPayload::List(items)
            }
            single @ ProductPayload::Single(_) => single,
        }
    }

    /// Number of records; a single record counts as one.
    pub fn count(&self) -> usize {
        match self {
            ProductPayload::List(items) => items.len(),
            ProductPayload::Single(_) => 1,
        }
    }
}

/// Result of `get_products`, serialized as `{"items", "count"}` or `{"error"}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProductsResult {
    Listing { items: ProductPayload, count: usize },
    Unavailable { error: String },
}

/// Handler backed by the product listing API.
#[derive(Clone)]
pub struct ProductApi {
    fetcher: Arc<dyn Fetcher>,
    url: String,
}

impl ProductApi {
    pub fn new(fetcher: Arc<dyn Fetcher>, url: impl Into<String>) -> Self {
        Self {
            fetcher,
            url: url.into(),
        }
    }

    /// Fetch the listing and keep the first `limit` records in provider order.
    pub async fn get_products(&self, limit: i64) -> ProductsResult {
        info!("Fetching products (limit {})", limit);

        match self.fetcher.fetch::<ProductPayload>(&self.url).await {
            Ok(payload) => {
                let items = payload.truncate(limit);
                let count = items.count();
                ProductsResult::Listing { items, count }
            }
            Err(e) => {
                warn!("Failed to fetch products: {}", e);
                ProductsResult::Unavailable {
                    error: PRODUCTS_UNAVAILABLE.to_string(),
                }
            }
        }
    }
}
