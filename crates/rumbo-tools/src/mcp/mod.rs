//! MCP (Model Context Protocol) stdio client
//!
//! The maps specialist talks to a maps MCP server running as a child
//! process. Requests are JSON-RPC 2.0 messages, one per line, over the
//! child's stdin/stdout.
//!
//! [`SharedMcpServer`] owns the single process-wide connection: it is
//! started once at boot, cloned into every request, and torn down once
//! at shutdown.

mod client;
mod protocol;
mod shared;
mod transport;

pub use client::McpClient;
pub use protocol::{McpContent, McpError, McpRequest, McpResponse, McpResult, McpTool, McpToolResult};
pub use shared::SharedMcpServer;
pub use transport::{McpConnection, McpServerConfig};
