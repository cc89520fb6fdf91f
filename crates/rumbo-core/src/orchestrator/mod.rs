//! Orchestrator - intent routing and specialist dispatch
//!
//! # Module Structure
//!
//! - `config`: `OrchestratorConfig` (routing table + runner timeouts)
//! - `routing`: `RoutingTable` and `DispatchStep`
//! - `core`: `Orchestrator` struct and the request loop
//! - `dispatch`: one specialist call, recorded as a `ToolInvocation`

mod config;
mod core;
mod dispatch;
mod routing;


pub use config::OrchestratorConfig;
pub use core::Orchestrator;
pub use routing::{DispatchStep, RoutingTable};
