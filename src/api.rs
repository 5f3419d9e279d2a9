//! Upstream API handlers behind the MCP tools.

pub mod products;
pub mod weather;

pub use products::{ProductApi, ProductPayload, ProductsResult};
pub use weather::{ForecastError, WeatherApi};
