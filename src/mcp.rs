//! MCP tool registration for the weather and product handlers.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;

use crate::api::products::DEFAULT_LIMIT;
use crate::api::{ProductApi, WeatherApi};
use crate::config::ServerConfig;
use crate::http::HttpFetcher;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AlertsArgs {
    #[schemars(description = "Two-letter US state code (e.g. CA, NY)")]
    pub state: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ForecastArgs {
    #[schemars(description = "Latitude of the location")]
    pub latitude: f64,
    #[schemars(description = "Longitude of the location")]
    pub longitude: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ProductsArgs {
    #[schemars(description = "Max number of items to return (to control payload size)")]
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

/// The MCP server exposing `get_alerts`, `get_forecast` and `get_products`.
///
/// Holds no mutable state; every clone serves calls independently.
#[derive(Clone)]
pub struct ToolServer {
    weather: WeatherApi,
    products: ProductApi,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ToolServer {
    pub fn new(weather: WeatherApi, products: ProductApi) -> Self {
        Self {
            weather,
            products,
            tool_router: Self::tool_router(),
        }
    }

    /// Build a server talking to the real upstream APIs described by `config`.
    pub fn from_config(config: &ServerConfig) -> Result<Self, reqwest::Error> {
        let weather_fetcher = HttpFetcher::new(config.weather_options())?;
        let product_fetcher = HttpFetcher::new(config.product_options())?;

        Ok(Self::new(
            WeatherApi::new(Arc::new(weather_fetcher), config.weather_api_base.clone()),
            ProductApi::new(Arc::new(product_fetcher), config.product_api_url.clone()),
        ))
    }

    #[tool(description = "Get weather alerts for a US state.")]
    async fn get_alerts(
        &self,
        Parameters(AlertsArgs { state }): Parameters<AlertsArgs>,
    ) -> Result<CallToolResult, McpError> {
        let text = self.weather.get_alerts(&state).await;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "Get weather forecast for a location.")]
    async fn get_forecast(
        &self,
        Parameters(ForecastArgs {
            latitude,
            longitude,
        }): Parameters<ForecastArgs>,
    ) -> Result<CallToolResult, McpError> {
        match self.weather.get_forecast(latitude, longitude).await {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
        }
    }

    #[tool(description = "Return raw products JSON from restful-api.dev.")]
    async fn get_products(
        &self,
        Parameters(ProductsArgs { limit }): Parameters<ProductsArgs>,
    ) -> Result<CallToolResult, McpError> {
        let result = self.products.get_products(limit).await;
        let value = serde_json::to_value(&result)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::structured(value))
    }
}

#[tool_handler]
impl ServerHandler for ToolServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "weather".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Weather alerts and forecasts from api.weather.gov, and product listings from restful-api.dev."
                    .into(),
            ),
            ..Default::default()
        }
    }
}
