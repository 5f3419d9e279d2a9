//! Serving the tool server over stdio or streamable HTTP.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::StreamableHttpService;
use rmcp::ServiceExt;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::mcp::ToolServer;

/// Default mount point of the streamable HTTP endpoint.
pub const DEFAULT_MCP_PATH: &str = "/mcp";

/// Errors that can occur while bringing up or running a transport.
#[derive(Error, Debug)]
pub enum ServeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("MCP initialization failed: {0}")]
    Initialize(String),

    #[error("Server task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Invalid MCP path {0:?}: must start with '/', not end with '/', and not be the root")]
    InvalidPath(String),
}

/// Check that `path` can be used as the mount point of the MCP endpoint.
pub fn validate_mcp_path(path: &str) -> Result<(), ServeError> {
    if !path.starts_with('/') || path.ends_with('/') {
        return Err(ServeError::InvalidPath(path.to_string()));
    }
    Ok(())
}

/// Serve over stdin/stdout until the client disconnects.
pub async fn serve_stdio(server: ToolServer) -> Result<(), ServeError> {
    tracing::info!("Serving MCP over stdio");

    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| ServeError::Initialize(e.to_string()))?;
    let reason = service.waiting().await?;

    tracing::info!("MCP stdio session ended: {:?}", reason);
    Ok(())
}

/// Build the HTTP router: the MCP endpoint under `path` and `GET /health`.
///
/// Each MCP session gets its own clone of `server`.
pub fn router(server: ToolServer, path: &str) -> Result<Router, ServeError> {
    validate_mcp_path(path)?;

    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        Arc::new(LocalSessionManager::default()),
        Default::default(),
    );

    Ok(Router::new()
        .nest_service(path, service)
        .route("/health", axum::routing::get(health_check)))
}

/// Serve streamable HTTP on an already bound listener until `shutdown` resolves.
pub async fn serve_http_on(
    listener: TcpListener,
    server: ToolServer,
    path: &str,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServeError> {
    let app = router(server, path)?;
    let addr = listener.local_addr()?;
    tracing::info!("MCP HTTP server listening on http://{}{}", addr, path);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("MCP HTTP server stopped");
    Ok(())
}

/// Bind `addr` and serve streamable HTTP until Ctrl-C.
pub async fn serve_http(server: ToolServer, addr: SocketAddr, path: &str) -> Result<(), ServeError> {
    validate_mcp_path(path)?;
    let listener = TcpListener::bind(addr).await?;
    serve_http_on(listener, server, path, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Health check handler for the /health endpoint.
async fn health_check() -> &'static str {
    "OK"
}
