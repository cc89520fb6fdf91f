//! MCP stdio transport
//!
//! Spawns the server process and multiplexes JSON-RPC requests over its
//! stdin/stdout. Responses are matched to callers by request id.

use super::protocol::{McpError, McpRequest, McpResponse, McpResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<McpResponse>>>>;

/// MCP server process configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpServerConfig {
    /// Server name (used in logs)
    pub name: String,
    /// Command to run
    pub command: String,
    /// Command arguments
    #[serde(default)]
    pub args: Vec<String>,
    /// Extra environment variables for the child
    #[serde(default, skip_serializing)]
    pub env: HashMap<String, String>,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

impl McpServerConfig {
    /// Create a config for `command args...`
    pub fn new(name: impl Into<String>, command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args,
            env: HashMap::new(),
            request_timeout_secs: default_request_timeout(),
        }
    }

    /// Add an environment variable for the child process
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set the per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_secs = timeout.as_secs().max(1);
        self
    }
}

/// Active MCP server connection
pub struct McpConnection {
    /// Server name
    pub name: String,
    request_id: AtomicU64,
    pending: PendingMap,
    child: tokio::sync::Mutex<Option<Child>>,
    stdin: tokio::sync::Mutex<Option<ChildStdin>>,
    active: Arc<AtomicBool>,
    request_timeout: Duration,
}

impl McpConnection {
    /// Spawn the server process and start reading its output
    pub fn spawn(config: &McpServerConfig) -> McpResult<Self> {
        info!(server = %config.name, command = %config.command, args = ?config.args, "Starting MCP server process");

        let mut child = Command::new(&config.command)
            .args(&config.args)
            .envs(&config.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| McpError::Transport(format!("Failed to spawn MCP server: {}", e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| McpError::Transport("Failed to get stdin handle".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| McpError::Transport("Failed to get stdout handle".to_string()))?;

        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let active = Arc::new(AtomicBool::new(true));

        {
            let pending = pending.clone();
            let active = active.clone();
            let server_name = config.name.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stdout).lines();
                loop {
                    match lines.next_line().await {
                        Ok(Some(line)) if line.trim().is_empty() => {}
                        Ok(Some(line)) => dispatch_line(&server_name, &line, &pending),
                        Ok(None) => break,
                        Err(e) => {
                            warn!(server = %server_name, error = %e, "Read error");
                            break;
                        }
                    }
                }
                active.store(false, Ordering::SeqCst);
                // Dropping the senders wakes every waiting caller.
                pending.lock().unwrap_or_else(|e| e.into_inner()).clear();
                info!(server = %server_name, "MCP server output closed");
            });
        }

        if let Some(stderr) = child.stderr.take() {
            let server_name = config.name.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(server = %server_name, "stderr: {}", line);
                }
            });
        }

        Ok(Self {
            name: config.name.clone(),
            request_id: AtomicU64::new(1),
            pending,
            child: tokio::sync::Mutex::new(Some(child)),
            stdin: tokio::sync::Mutex::new(Some(stdin)),
            active,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }

    /// Send a request and wait for its response
    pub async fn send(&self, request: McpRequest) -> McpResult<McpResponse> {
        let id = request
            .id
            .ok_or_else(|| McpError::Protocol("request is missing an id".to_string()))?;

        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, tx);

        let json = serde_json::to_string(&request)
            .map_err(|e| McpError::Protocol(format!("Failed to serialize request: {}", e)))?;
        debug!(server = %self.name, method = %request.method, id, "Sending to MCP server");

        if let Err(e) = self.write_line(&json).await {
            self.forget(id);
            return Err(e);
        }

        let response = match tokio::time::timeout(self.request_timeout, rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => {
                return Err(McpError::Transport("Response channel closed".to_string()));
            }
            Err(_) => {
                self.forget(id);
                return Err(McpError::Timeout(self.request_timeout.as_millis() as u64));
            }
        };

        if let Some(error) = response.error {
            return Err(McpError::Server {
                code: error.code,
                message: error.message,
            });
        }

        Ok(response)
    }

    /// Send a notification without waiting for a response
    pub async fn notify(&self, notification: McpRequest) -> McpResult<()> {
        let json = serde_json::to_string(&notification)
            .map_err(|e| McpError::Protocol(format!("Failed to serialize notification: {}", e)))?;
        self.write_line(&json).await
    }

    async fn write_line(&self, json: &str) -> McpResult<()> {
        let mut guard = self.stdin.lock().await;
        let stdin = guard
            .as_mut()
            .ok_or_else(|| McpError::Transport("Connection not started".to_string()))?;

        stdin
            .write_all(json.as_bytes())
            .await
            .map_err(|e| McpError::Transport(format!("Failed to write to stdin: {}", e)))?;
        stdin
            .write_all(b"\n")
            .await
            .map_err(|e| McpError::Transport(format!("Failed to write to stdin: {}", e)))?;
        stdin
            .flush()
            .await
            .map_err(|e| McpError::Transport(format!("Failed to flush stdin: {}", e)))
    }

    fn forget(&self, id: u64) {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&id);
    }

    /// Get next request ID
    pub fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Stop the server process
    pub async fn stop(&self) -> McpResult<()> {
        self.stdin.lock().await.take();
        if let Some(mut child) = self.child.lock().await.take() {
            if let Err(e) = child.kill().await {
                warn!(server = %self.name, error = %e, "Failed to kill MCP server process");
            }
            info!(server = %self.name, "MCP server process stopped");
        }
        self.active.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Check if connection is active
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

fn dispatch_line(server_name: &str, line: &str, pending: &PendingMap) {
    match serde_json::from_str::<McpResponse>(line) {
        Ok(response) => {
            let Some(id) = response.id else {
                debug!(server = %server_name, "Ignoring server notification");
                return;
            };
            let sender = pending
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .remove(&id);
            match sender {
                Some(sender) => {
                    let _ = sender.send(response);
                }
                None => debug!(server = %server_name, id, "Response for unknown request"),
            }
        }
        Err(e) => {
            warn!(server = %server_name, error = %e, "Failed to parse response");
        }
    }
}
