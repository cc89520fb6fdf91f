//! Routing table: which specialists run for each intent, and in what order

use crate::intent::Intent;
use rumbo_tools::{DESTINATION_INFO_TOOL, TRAVEL_PRODUCTS_TOOL};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A specialist call the orchestrator can make
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStep {
    /// Places at a destination, or suggestions for vague requests
    DestinationInfo,
    /// Flight, hotel and package offers
    Commerce,
}

impl DispatchStep {
    /// Registry name of the tool behind this step
    #[must_use]
    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::DestinationInfo => DESTINATION_INFO_TOOL,
            Self::Commerce => TRAVEL_PRODUCTS_TOOL,
        }
    }
}

impl fmt::Display for DispatchStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DestinationInfo => f.write_str("destination_info"),
            Self::Commerce => f.write_str("commerce"),
        }
    }
}

/// Intent → ordered dispatch steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingTable {
    /// Whether purchase requests also get destination info after the offer
    pub purchase_includes_info: bool,
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self {
            purchase_includes_info: true,
        }
    }
}

impl RoutingTable {
    /// Steps run for each destination of a request with this intent.
    ///
    /// Vague requests run a single destination-info step in suggest mode,
    /// independent of any destination; unrelated requests run nothing.
    #[must_use]
    pub fn steps(&self, intent: Intent) -> Vec<DispatchStep> {
        match intent {
            Intent::Purchase if self.purchase_includes_info => {
                vec![DispatchStep::Commerce, DispatchStep::DestinationInfo]
            }
            Intent::Purchase => vec![DispatchStep::Commerce],
            Intent::Informational => vec![DispatchStep::DestinationInfo, DispatchStep::Commerce],
            Intent::Vague => vec![DispatchStep::DestinationInfo],
            Intent::Unrelated => Vec::new(),
        }
    }
}
