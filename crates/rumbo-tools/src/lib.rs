//! Rumbo Tools - Specialist registry and external providers
//!
//! This crate provides the tool system behind the travel assistant:
//! - Registry: Tool registration and discovery
//! - Runner: Tool execution with bounded timeouts
//! - MCP: stdio client for the maps server subprocess
//! - Maps: place search over the maps server
//! - Commerce: deterministic pricing and the Stripe provider
//! - Builtins: the destination-info and travel-products specialists

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod builtins;
pub mod commerce;
pub mod error;
pub mod maps;
pub mod mcp;
pub mod registry;
pub mod runner;

pub use builtins::{
    register_builtins, DestinationInfoTool, SpecialistOutput, TravelProductsTool,
    DESTINATION_INFO_TOOL, TRAVEL_PRODUCTS_TOOL,
};
pub use error::{Error, Result};
pub use registry::{Tool, ToolCategory, ToolDefinition, ToolRegistry, ToolResult};
pub use runner::{ExecutionOptions, ExecutionResult, RunnerConfig, ToolRunner};
