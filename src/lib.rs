//! # weather-mcp - Weather and product tools over MCP
//!
//! A small Model Context Protocol server exposing three tools that proxy two
//! public REST APIs:
//!
//! - `get_alerts(state)`: active alerts from the National Weather Service.
//! - `get_forecast(latitude, longitude)`: the next five forecast periods.
//! - `get_products(limit)`: the first `limit` records of a product listing.
//!
//! ## Architecture
//!
//! 1. **Fetchers** (`Fetcher`) perform one outbound GET and return JSON or a
//!    tagged `FetchError`. `HttpFetcher` is the reqwest implementation.
//! 2. **Handlers** (`WeatherApi`, `ProductApi`) reshape upstream JSON and
//!    collapse fetch failures into fixed fallback messages.
//! 3. **`ToolServer`** registers the handlers as rmcp tools.
//! 4. **Transports** serve it over stdio or streamable HTTP.
//!
//! ## Example
//! ```no_run
//! use weather_mcp::{config::ServerConfig, transport, ToolServer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = ToolServer::from_config(&ServerConfig::default())?;
//!     transport::serve_stdio(server).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod http;
pub mod mcp;
pub mod options;
pub mod transport;

pub use api::{ForecastError, ProductApi, ProductPayload, ProductsResult, WeatherApi};
pub use client::{FetchError, Fetcher, FetcherExt};
pub use config::ServerConfig;
pub use http::HttpFetcher;
pub use mcp::ToolServer;
pub use options::HttpOptions;
pub use transport::ServeError;

// Re-export rmcp for convenience
pub use rmcp;
