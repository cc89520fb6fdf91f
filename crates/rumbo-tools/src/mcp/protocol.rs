//! MCP Protocol Types
//!
//! JSON-RPC 2.0 based protocol types for MCP communication.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// MCP error type
#[derive(Debug, Error)]
pub enum McpError {
    /// Transport error (spawn, I/O, closed pipe)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Protocol error (invalid JSON-RPC, unexpected payload)
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Server returned an error
    #[error("Server error {code}: {message}")]
    Server {
        /// Error code
        code: i32,
        /// Error message
        message: String,
    },

    /// Timeout waiting for response
    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    /// The shared server has not been started or was already stopped
    #[error("MCP server not connected")]
    NotConnected,

    /// Tool not offered by the server
    #[error("Tool '{0}' not found on server '{1}'")]
    ToolNotFound(String, String),
}

/// MCP Result type
pub type McpResult<T> = std::result::Result<T, McpError>;

/// JSON-RPC request or notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpRequest {
    /// JSON-RPC version
    pub jsonrpc: String,
    /// Request method
    pub method: String,
    /// Request ID, absent for notifications
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Request parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl McpRequest {
    /// Create a new request
    pub fn new(method: impl Into<String>, id: u64) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.into(),
            id: Some(id),
            params: None,
        }
    }

    /// Create a notification (no response expected)
    pub fn notification(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.into(),
            id: None,
            params: None,
        }
    }

    /// Add parameters
    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = Some(params);
        self
    }
}

/// JSON-RPC response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpResponse {
    /// JSON-RPC version
    pub jsonrpc: String,
    /// Response ID (matches request ID); absent on server notifications
    #[serde(default)]
    pub id: Option<u64>,
    /// Result (on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Error (on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpRpcError>,
}

/// JSON-RPC error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpRpcError {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Additional data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// MCP tool definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpTool {
    /// Tool name
    pub name: String,
    /// Tool description
    #[serde(default)]
    pub description: String,
    /// Input schema (JSON Schema)
    #[serde(default = "default_schema", rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

fn default_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {}
    })
}

/// MCP tool call result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpToolResult {
    /// Content items
    #[serde(default)]
    pub content: Vec<McpContent>,
    /// Whether the tool call resulted in an error
    #[serde(default, rename = "isError")]
    pub is_error: bool,
}

impl McpToolResult {
    /// Concatenated text of all text-bearing content items
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(McpContent::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// MCP content item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum McpContent {
    /// Text content
    #[serde(rename = "text")]
    Text {
        /// Text content
        text: String,
    },
    /// Resource content
    #[serde(rename = "resource")]
    Resource {
        /// Resource URI
        uri: String,
        /// Resource text
        #[serde(default)]
        text: Option<String>,
    },
    /// Any other content type (images, audio)
    #[serde(other)]
    Other,
}

impl McpContent {
    /// Get text representation of content
    pub fn as_text(&self) -> Option<&str> {
        match self {
            McpContent::Text { text } => Some(text),
            McpContent::Resource { text: Some(t), .. } => Some(t),
            _ => None,
        }
    }
}

/// MCP initialization result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpInitResult {
    /// Protocol version
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    /// Server info
    #[serde(default, rename = "serverInfo")]
    pub server_info: Option<ServerInfo>,
}

/// Server information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Server name
    pub name: String,
    /// Server version
    #[serde(default)]
    pub version: Option<String>,
}
