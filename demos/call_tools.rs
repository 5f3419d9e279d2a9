use rmcp::model::{CallToolRequestParam, RawContent};
use rmcp::{transport::StreamableHttpClientTransport, ServiceExt};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ============================================================================================
    // Step 1: Connect to a running server
    // ============================================================================================
    // Start the server first with `cargo run` (streamable HTTP on 127.0.0.1:8000 by default).
    let url = std::env::var("WEATHER_MCP_URL").unwrap_or_else(|_| "http://127.0.0.1:8000/mcp".to_string());
    println!("Connecting to {}...", url);

    let transport = StreamableHttpClientTransport::from_uri(url);
    let client = ().serve(transport).await?;

    // ============================================================================================
    // Step 2: List the tools
    // ============================================================================================
    let tools = client.list_tools(None).await?;
    for tool in &tools.tools {
        println!("- {}: {}", tool.name, tool.description.as_deref().unwrap_or_default());
    }

    // ============================================================================================
    // Step 3: Call each tool
    // ============================================================================================
    let calls = [
        ("get_alerts", json!({ "state": "CA" })),
        ("get_forecast", json!({ "latitude": 39.7456, "longitude": -97.0892 })),
        ("get_products", json!({ "limit": 3 })),
    ];

    for (name, args) in calls {
        let result = client
            .call_tool(CallToolRequestParam {
                name: name.into(),
                arguments: args.as_object().cloned(),
            })
            .await?;

        println!("=== {} ===", name);
        if let Some(structured) = result.structured_content {
            println!("{}", serde_json::to_string_pretty(&structured)?);
            continue;
        }
        for content in result.content {
            if let RawContent::Text(text_content) = content.raw {
                println!("{}", text_content.text);
            }
        }
    }

    client.cancel().await?;
    Ok(())
}
