//! Process-wide handle to the maps MCP server

use super::client::McpClient;
use super::protocol::{McpError, McpResult};
use super::transport::McpServerConfig;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Shared, lazily connected MCP server.
///
/// Clones share one connection. `connect` starts the process at most once
/// even when called concurrently; `disconnect` stops it at most once.
#[derive(Clone)]
pub struct SharedMcpServer {
    config: Arc<McpServerConfig>,
    inner: Arc<Mutex<Option<Arc<McpClient>>>>,
}

impl SharedMcpServer {
    /// Create an unconnected handle
    pub fn new(config: McpServerConfig) -> Self {
        Self {
            config: Arc::new(config),
            inner: Arc::new(Mutex::new(None)),
        }
    }

    /// Server configuration
    pub fn config(&self) -> &McpServerConfig {
        &self.config
    }

    /// Start the server if needed and return the live client
    pub async fn connect(&self) -> McpResult<Arc<McpClient>> {
        let mut guard = self.inner.lock().await;
        if let Some(client) = guard.as_ref() {
            return Ok(Arc::clone(client));
        }

        let client = Arc::new(McpClient::connect(&self.config).await?);
        *guard = Some(Arc::clone(&client));
        Ok(client)
    }

    /// The live client, if connected
    pub async fn client(&self) -> McpResult<Arc<McpClient>> {
        self.inner
            .lock()
            .await
            .as_ref()
            .map(Arc::clone)
            .ok_or(McpError::NotConnected)
    }

    /// Whether a connection is established and its process still runs
    pub async fn is_connected(&self) -> bool {
        self.inner
            .lock()
            .await
            .as_ref()
            .is_some_and(|client| client.is_connected())
    }

    /// Stop the server. Subsequent calls are no-ops.
    pub async fn disconnect(&self) -> McpResult<()> {
        let client = self.inner.lock().await.take();
        match client {
            Some(client) => {
                if let Err(e) = client.shutdown().await {
                    warn!(server = %self.config.name, error = %e, "Error disconnecting MCP server");
                    return Err(e);
                }
                info!(server = %self.config.name, "MCP server disconnected");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_before_connect() {
        let shared = SharedMcpServer::new(McpServerConfig::new("maps", "cat", Vec::new()));
        assert!(matches!(shared.client().await, Err(McpError::NotConnected)));
        assert!(!shared.is_connected().await);
        shared.disconnect().await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_connect_once_and_disconnect_once() {
        let shared = SharedMcpServer::new(McpServerConfig::new("maps", "cat", Vec::new()));
        let other = shared.clone();

        let (a, b) = tokio::join!(shared.connect(), other.connect());
        let (a, b) = (a.unwrap(), b.unwrap());
        assert!(Arc::ptr_eq(&a, &b));
        assert!(shared.is_connected().await);

        shared.disconnect().await.unwrap();
        other.disconnect().await.unwrap();
        assert!(matches!(other.client().await, Err(McpError::NotConnected)));
    }

    #[tokio::test]
    async fn test_connect_failure_leaves_handle_empty() {
        let shared = SharedMcpServer::new(McpServerConfig::new(
            "maps",
            "rumbo-no-such-binary-xyz",
            Vec::new(),
        ));
        assert!(shared.connect().await.is_err());
        assert!(matches!(shared.client().await, Err(McpError::NotConnected)));
    }
}
