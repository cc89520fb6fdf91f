//! Orchestrator configuration

use super::routing::RoutingTable;
use rumbo_tools::RunnerConfig;
use std::time::Duration;

/// Immutable orchestrator settings, shared by every request
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    /// Intent routing
    pub routing: RoutingTable,
    /// Specialist call timeouts
    pub runner_config: RunnerConfig,
}

impl OrchestratorConfig {
    /// Create a new configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the routing table
    #[must_use]
    pub fn with_routing(mut self, routing: RoutingTable) -> Self {
        self.routing = routing;
        self
    }

    /// Set the per-call timeout; the runner cap grows to match if needed
    #[must_use]
    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        let max_timeout = self.runner_config.max_timeout.max(timeout);
        self.runner_config = RunnerConfig::new(timeout).with_max_timeout(max_timeout);
        self
    }

    /// Set whether purchase requests also fetch destination info
    #[must_use]
    pub fn with_purchase_includes_info(mut self, enabled: bool) -> Self {
        self.routing.purchase_includes_info = enabled;
        self
    }
}
