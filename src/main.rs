use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;
use weather_mcp::config::{ServerConfig, NWS_API_BASE, PRODUCT_API_URL, USER_AGENT};
use weather_mcp::transport::{self, DEFAULT_MCP_PATH};
use weather_mcp::ToolServer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    /// MCP over stdin/stdout
    Stdio,
    /// Streamable HTTP
    Http,
}

/// MCP server exposing NWS weather alerts/forecasts and a product listing.
#[derive(Debug, Parser)]
#[command(name = "weather-mcp", version, about)]
struct Cli {
    #[arg(long, value_enum, env = "WEATHER_MCP_TRANSPORT", default_value_t = Transport::Http)]
    transport: Transport,

    /// Address for the HTTP transport
    #[arg(long, env = "WEATHER_MCP_BIND", default_value = "127.0.0.1:8000")]
    bind: SocketAddr,

    /// Path the HTTP MCP endpoint is mounted at
    #[arg(long, env = "WEATHER_MCP_PATH", default_value = DEFAULT_MCP_PATH, value_parser = parse_mcp_path)]
    path: String,

    #[arg(long, env = "NWS_API_BASE", default_value = NWS_API_BASE)]
    weather_api_base: String,

    #[arg(long, env = "PRODUCT_API_URL", default_value = PRODUCT_API_URL)]
    product_api_url: String,

    #[arg(long, env = "WEATHER_MCP_USER_AGENT", default_value = USER_AGENT)]
    user_agent: String,

    /// Timeout for each upstream request, in seconds
    #[arg(long, env = "WEATHER_MCP_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    #[arg(long, env = "WEATHER_MCP_PROXY")]
    proxy: Option<String>,
}

fn parse_mcp_path(path: &str) -> Result<String, transport::ServeError> {
    transport::validate_mcp_path(path)?;
    Ok(path.to_string())
}

impl Cli {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            weather_api_base: self.weather_api_base.clone(),
            product_api_url: self.product_api_url.clone(),
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            proxy: self.proxy.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries the stdio transport, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.server_config();
    tracing::debug!("Configuration: {:?}", config);

    let server = ToolServer::from_config(&config)?;

    match cli.transport {
        Transport::Stdio => transport::serve_stdio(server).await?,
        Transport::Http => transport::serve_http(server, cli.bind, &cli.path).await?,
    }

    Ok(())
}
