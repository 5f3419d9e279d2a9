//! Server configuration.

use std::time::Duration;

use crate::options::HttpOptions;

/// National Weather Service API base URL.
pub const NWS_API_BASE: &str = "https://api.weather.gov";

/// Product listing endpoint.
pub const PRODUCT_API_URL: &str = "https://api.restful-api.dev/objects";

/// User agent sent to the NWS API, which rejects anonymous clients.
pub const USER_AGENT: &str = "weather-app/1.0";

/// Per-request timeout for every upstream call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Immutable configuration injected into the tool server at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Base URL of the weather API, without a trailing slash.
    pub weather_api_base: String,
    /// Fixed URL of the product listing.
    pub product_api_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// Optional proxy applied to both upstream clients.
    pub proxy: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            weather_api_base: NWS_API_BASE.to_string(),
            product_api_url: PRODUCT_API_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            proxy: None,
        }
    }
}

impl ServerConfig {
    /// HTTP options for the weather fetcher.
    pub fn weather_options(&self) -> HttpOptions {
        self.base_options()
            .with_header("User-Agent", self.user_agent.clone())
            .with_header("Accept", "application/geo+json")
    }

    /// HTTP options for the product fetcher. Only the client defaults are sent.
    pub fn product_options(&self) -> HttpOptions {
        self.base_options()
    }

    fn base_options(&self) -> HttpOptions {
        let options = HttpOptions::new().with_timeout(self.timeout);
        match &self.proxy {
            Some(proxy) => options.with_proxy(proxy.clone()),
            None => options,
        }
    }
}
