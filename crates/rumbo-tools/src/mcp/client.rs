//! MCP Client
//!
//! High-level client for one MCP server: handshake, tool discovery and
//! tool calls.

use super::protocol::{McpContent, McpError, McpInitResult, McpRequest, McpResult, McpTool, McpToolResult};
use super::transport::{McpConnection, McpServerConfig};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

/// Protocol revision announced during the handshake
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Connected MCP client
pub struct McpClient {
    connection: McpConnection,
    tools: Vec<McpTool>,
}

impl McpClient {
    /// Spawn the server, run the initialize handshake and cache its tools
    pub async fn connect(config: &McpServerConfig) -> McpResult<Self> {
        let connection = McpConnection::spawn(config)?;

        let init = async {
            Self::initialize(&connection).await?;
            Self::fetch_tools(&connection).await
        };

        match init.await {
            Ok(tools) => {
                let tool_names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
                info!(server = %connection.name, tools = ?tool_names, "MCP server initialized");
                Ok(Self { connection, tools })
            }
            Err(e) => {
                if let Err(stop_err) = connection.stop().await {
                    warn!(
                        server = %connection.name,
                        error = %stop_err,
                        "Failed to stop MCP server after a failed handshake"
                    );
                }
                Err(e)
            }
        }
    }

    async fn initialize(connection: &McpConnection) -> McpResult<()> {
        let request =
            McpRequest::new("initialize", connection.next_id()).with_params(serde_json::json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": {
                    "name": "rumbo",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }));

        let response = connection.send(request).await?;

        if let Some(result) = response.result {
            let init_result: McpInitResult = serde_json::from_value(result)
                .map_err(|e| McpError::Protocol(format!("Failed to parse init result: {}", e)))?;

            debug!(
                server = %connection.name,
                protocol = %init_result.protocol_version,
                server_info = ?init_result.server_info.map(|info| info.name),
                "MCP handshake complete"
            );
        }

        connection
            .notify(McpRequest::notification("notifications/initialized"))
            .await
    }

    async fn fetch_tools(connection: &McpConnection) -> McpResult<Vec<McpTool>> {
        let request = McpRequest::new("tools/list", connection.next_id());
        let response = connection.send(request).await?;

        match response.result {
            Some(result) => {
                #[derive(Deserialize)]
                struct ToolsResult {
                    tools: Vec<McpTool>,
                }

                let tools_result: ToolsResult = serde_json::from_value(result)
                    .map_err(|e| McpError::Protocol(format!("Failed to parse tools: {}", e)))?;
                Ok(tools_result.tools)
            }
            None => Ok(Vec::new()),
        }
    }

    /// Server name
    pub fn server_name(&self) -> &str {
        &self.connection.name
    }

    /// Tools advertised by the server
    pub fn tools(&self) -> &[McpTool] {
        &self.tools
    }

    /// Whether the server process is still running
    pub fn is_connected(&self) -> bool {
        self.connection.is_active()
    }

    /// Call a tool on the server.
    ///
    /// When the server advertised a tool list, unknown tool names are
    /// rejected without a round trip.
    #[instrument(skip(self, arguments), fields(server = %self.connection.name))]
    pub async fn call_tool(
        &self,
        tool_name: &str,
        arguments: serde_json::Value,
    ) -> McpResult<McpToolResult> {
        if !self.tools.is_empty() && !self.tools.iter().any(|t| t.name == tool_name) {
            return Err(McpError::ToolNotFound(
                tool_name.to_string(),
                self.connection.name.clone(),
            ));
        }

        let request = McpRequest::new("tools/call", self.connection.next_id()).with_params(
            serde_json::json!({
                "name": tool_name,
                "arguments": arguments
            }),
        );

        let response = self.connection.send(request).await?;

        match response.result {
            Some(result) => serde_json::from_value(result)
                .map_err(|e| McpError::Protocol(format!("Failed to parse tool result: {}", e))),
            None => Ok(McpToolResult {
                content: vec![McpContent::Text {
                    text: "No result returned".to_string(),
                }],
                is_error: true,
            }),
        }
    }

    /// Stop the server process
    pub async fn shutdown(&self) -> McpResult<()> {
        self.connection.stop().await
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    // `cat` echoes every request back, which reads as an empty response
    // with a matching id.
    fn echo_server() -> McpServerConfig {
        McpServerConfig::new("echo", "cat", Vec::new())
    }

    #[tokio::test]
    async fn test_connect_to_echo_server() {
        let client = McpClient::connect(&echo_server()).await.unwrap();
        assert_eq!(client.server_name(), "echo");
        assert!(client.tools().is_empty());
        assert!(client.is_connected());

        let result = client
            .call_tool("maps_search_places", serde_json::json!({"query": "Roma"}))
            .await
            .unwrap();
        assert!(result.is_error);

        client.shutdown().await.unwrap();
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn test_call_after_shutdown_fails() {
        let client = McpClient::connect(&echo_server()).await.unwrap();
        client.shutdown().await.unwrap();

        let result = client.call_tool("anything", serde_json::json!({})).await;
        assert!(matches!(result, Err(McpError::Transport(_))));
    }

    #[tokio::test]
    async fn test_failed_handshake_returns_handshake_error() {
        let config = McpServerConfig::new("exits", "false", Vec::new())
            .with_request_timeout(std::time::Duration::from_secs(1));

        let result = McpClient::connect(&config).await;
        assert!(
            matches!(result, Err(McpError::Transport(_)) | Err(McpError::Timeout(_))),
            "unexpected result: {:?}",
            result.as_ref().err()
        );
    }
}
