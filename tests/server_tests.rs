use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rmcp::model::{CallToolRequestParam, CallToolResult, RawContent};
use rmcp::service::{RoleClient, RunningService};
use rmcp::transport::StreamableHttpClientTransport;
use rmcp::ServiceExt;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use weather_mcp::{FetchError, Fetcher, ProductApi, ToolServer, WeatherApi};

const NWS: &str = "https://nws.test";
const PRODUCTS: &str = "https://products.test/objects";

// Integration tests cannot reach the crate's `#[cfg(test)]` mock, so this one
// mirrors it: canned JSON per URL, 404 for anything else.
#[derive(Clone, Default)]
struct MockFetcher {
    responses: Arc<Mutex<HashMap<String, Value>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    fn new(responses: Vec<(&str, Value)>) -> Self {
        let responses = responses
            .into_iter()
            .map(|(url, body)| (url.to_string(), body))
            .collect();
        Self {
            responses: Arc::new(Mutex::new(responses)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
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
            .ok_or(FetchError::Status(reqwest::StatusCode::NOT_FOUND))
    }
}

fn tool_server(fetcher: MockFetcher) -> ToolServer {
    let fetcher = Arc::new(fetcher);
    ToolServer::new(
        WeatherApi::new(fetcher.clone(), NWS),
        ProductApi::new(fetcher, PRODUCTS),
    )
}

async fn connect(server: ToolServer) -> RunningService<RoleClient, ()> {
    let (client_transport, server_transport) = tokio::io::duplex(4096);

    tokio::spawn(async move {
        let service = server
            .serve(server_transport)
            .await
            .expect("Failed to start server");
        service.waiting().await.expect("Server error");
    });

    ().serve(client_transport).await.unwrap()
}

async fn call(client: &RunningService<RoleClient, ()>, name: &str, args: Value) -> CallToolResult {
    client
        .call_tool(CallToolRequestParam {
            name: name.to_string().into(),
            arguments: args.as_object().cloned(),
        })
        .await
        .unwrap()
}

fn text(result: &CallToolResult) -> String {
    match &result.content[0].raw {
        RawContent::Text(text_content) => text_content.text.clone(),
        other => panic!("Expected text content, got {:?}", other),
    }
}

#[tokio::test]
async fn test_lists_three_tools() {
    let client = connect(tool_server(MockFetcher::default())).await;

    let mut names: Vec<String> = client
        .list_tools(None)
        .await
        .unwrap()
        .tools
        .into_iter()
        .map(|t| t.name.to_string())
        .collect();
    names.sort();

    assert_eq!(names, vec!["get_alerts", "get_forecast", "get_products"]);
}

#[tokio::test]
async fn test_get_alerts_no_active_alerts() {
    let fetcher = MockFetcher::new(vec![(
        "https://nws.test/alerts/active/area/CA",
        json!({ "features": [] }),
    )]);
    let client = connect(tool_server(fetcher)).await;

    let result = call(&client, "get_alerts", json!({ "state": "CA" })).await;
    assert_eq!(text(&result), "No active alerts for this state.");
    assert_ne!(result.is_error, Some(true));
}

#[tokio::test]
async fn test_get_alerts_upstream_error() {
    let fetcher = MockFetcher::default();
    let requests = fetcher.requests.clone();
    let client = connect(tool_server(fetcher)).await;

    let result = call(&client, "get_alerts", json!({ "state": "ZZ" })).await;
    assert_eq!(text(&result), "Unable to fetch alerts or no alerts found.");
    assert_eq!(
        *requests.lock().unwrap(),
        vec!["https://nws.test/alerts/active/area/ZZ".to_string()]
    );
}

#[tokio::test]
async fn test_get_forecast_formats_periods() {
    let fetcher = MockFetcher::new(vec![
        (
            "https://nws.test/points/40.5,-105.25",
            json!({ "properties": { "forecast": "https://nws.test/gridpoints/BOU/1,2/forecast" } }),
        ),
        (
            "https://nws.test/gridpoints/BOU/1,2/forecast",
            json!({ "properties": { "periods": [{
                "name": "Today",
                "temperature": 71,
                "temperatureUnit": "F",
                "windSpeed": "5 mph",
                "windDirection": "S",
                "detailedForecast": "Sunny."
            }]}}),
        ),
    ]);
    let client = connect(tool_server(fetcher)).await;

    let result = call(
        &client,
        "get_forecast",
        json!({ "latitude": 40.5, "longitude": -105.25 }),
    )
    .await;
    assert_eq!(
        text(&result),
        "\nToday:\nTemperature: 71°F\nWind: 5 mph S\nForecast: Sunny.\n"
    );
}

#[tokio::test]
async fn test_get_forecast_malformed_points_is_tool_error() {
    let fetcher = MockFetcher::new(vec![(
        "https://nws.test/points/1,2",
        json!({ "type": "Feature" }),
    )]);
    let client = connect(tool_server(fetcher)).await;

    let result = call(
        &client,
        "get_forecast",
        json!({ "latitude": 1.0, "longitude": 2.0 }),
    )
    .await;
    assert_eq!(result.is_error, Some(true));
    assert!(text(&result).starts_with("Malformed points response"));
}

#[tokio::test]
async fn test_get_products_default_limit() {
    let listing: Vec<Value> = (0..60).map(|i| json!({ "id": i })).collect();
    let fetcher = MockFetcher::new(vec![(PRODUCTS, Value::Array(listing))]);
    let client = connect(tool_server(fetcher)).await;

    let result = call(&client, "get_products", json!({})).await;
    let structured = result.structured_content.unwrap();
    assert_eq!(structured["count"], 50);
    assert_eq!(structured["items"].as_array().unwrap().len(), 50);
    assert_eq!(structured["items"][49], json!({ "id": 49 }));
}

#[tokio::test]
async fn test_get_products_unavailable() {
    let client = connect(tool_server(MockFetcher::default())).await;

    let result = call(&client, "get_products", json!({ "limit": 2 })).await;
    assert_eq!(
        result.structured_content,
        Some(json!({ "error": "Unable to fetch products" }))
    );
}

#[tokio::test]
async fn test_streamable_http_transport() {
    let fetcher = MockFetcher::new(vec![(
        PRODUCTS,
        json!([{ "id": "1" }, { "id": "2" }, { "id": "3" }]),
    )]);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

    let server = tool_server(fetcher);
    let handle = tokio::spawn(async move {
        weather_mcp::transport::serve_http_on(listener, server, "/mcp", async move {
            stop_rx.await.ok();
        })
        .await
    });

    let health = reqwest::get(format!("http://{}/health", addr))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(health, "OK");

    let transport = StreamableHttpClientTransport::from_uri(format!("http://{}/mcp", addr));
    let client = ().serve(transport).await.unwrap();

    let result = call(&client, "get_products", json!({ "limit": 2 })).await;
    assert_eq!(
        result.structured_content,
        Some(json!({ "items": [{ "id": "1" }, { "id": "2" }], "count": 2 }))
    );

    client.cancel().await.unwrap();
    stop_tx.send(()).ok();
    drop(handle);
}
